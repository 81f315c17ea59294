//! Recharge order model

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::query::ParseError;

// ============================================================================
// Order ID
// ============================================================================

/// Opaque order identifier.
///
/// The backend has emitted both numeric and string ids over time; both
/// are normalised to a string and sent back as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawOrderId", into = "String")]
pub struct OrderId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOrderId {
    Text(String),
    Number(i64),
}

impl From<RawOrderId> for OrderId {
    fn from(raw: RawOrderId) -> Self {
        match raw {
            RawOrderId::Text(s) => Self(s),
            RawOrderId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Status
// ============================================================================

/// Order processing status
///
/// `null` or an empty string reads as [`OrderStatus::Queued`]; any other
/// value the client does not know is kept verbatim so the row still loads
/// and is written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum OrderStatus {
    /// Recharge credited to the line
    Completed,
    /// An operator is working on it
    Processing,
    /// Waiting in the queue (backend default for new orders)
    #[default]
    Queued,
    Error,
    Other(String),
}

impl OrderStatus {
    /// Every known status, in dashboard chart order
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Completed,
        OrderStatus::Processing,
        OrderStatus::Queued,
        OrderStatus::Error,
    ];

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "recarga-efetuada",
            Self::Processing => "sendo-processada",
            Self::Queued => "na-fila",
            Self::Error => "erro",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label shown in the status selector
    pub fn label(&self) -> &str {
        match self {
            Self::Completed => "Recarga Efetuada",
            Self::Processing => "Sendo Processada",
            Self::Queued => "Na Fila",
            Self::Error => "Erro",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    fn known(raw: &str) -> Option<Self> {
        match raw.trim() {
            "recarga-efetuada" | "Concluída" => Some(Self::Completed),
            "sendo-processada" => Some(Self::Processing),
            "" | "na-fila" | "Na fila de espera" => Some(Self::Queued),
            "erro" | "Erro" => Some(Self::Error),
            _ => None,
        }
    }
}

impl From<Option<String>> for OrderStatus {
    fn from(raw: Option<String>) -> Self {
        match raw {
            None => Self::Queued,
            Some(raw) => Self::known(&raw).unwrap_or(Self::Other(raw)),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse for operator input: only the known statuses are accepted
impl FromStr for OrderStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::known(s) {
            Some(status) if !s.trim().is_empty() => Ok(status),
            _ => Err(ParseError::UnknownStatus(s.trim().to_string())),
        }
    }
}

// ============================================================================
// Carrier
// ============================================================================

/// Mobile carrier ("operadora")
///
/// Matching is case-insensitive; anything else is kept verbatim so a
/// record with an unexpected carrier still renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Carrier {
    Tim,
    Vivo,
    Claro,
    Unknown(String),
}

impl Carrier {
    /// Carriers with their own plan list and chart bar
    pub const KNOWN: [Carrier; 3] = [Carrier::Tim, Carrier::Vivo, Carrier::Claro];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Tim => "Tim",
            Self::Vivo => "Vivo",
            Self::Claro => "Claro",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for Carrier {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tim" => Self::Tim,
            "vivo" => Self::Vivo,
            "claro" => Self::Claro,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<Carrier> for String {
    fn from(carrier: Carrier) -> Self {
        match carrier {
            Carrier::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Carrier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Carrier::from(s.to_string()) {
            Carrier::Unknown(raw) => Err(ParseError::UnknownCarrier(raw)),
            known => Ok(known),
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Editable fields
// ============================================================================

/// Fields an operator may change on an existing order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditableField {
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "admin_comment")]
    AdminComment,
    #[serde(rename = "nome")]
    Name,
    #[serde(rename = "telefone")]
    Phone,
    #[serde(rename = "recarga_selecionada")]
    Plan,
    #[serde(rename = "senha_app")]
    AppPassword,
}

impl EditableField {
    pub const ALL: [EditableField; 6] = [
        EditableField::Name,
        EditableField::Phone,
        EditableField::Plan,
        EditableField::AppPassword,
        EditableField::Status,
        EditableField::AdminComment,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::AdminComment => "admin_comment",
            Self::Name => "nome",
            Self::Phone => "telefone",
            Self::Plan => "recarga_selecionada",
            Self::AppPassword => "senha_app",
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditableField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseError::UnknownField(s.to_string()))
    }
}

/// PUT body for `/api/admin/recargas/{id}`: a flat `field -> value` map
pub type FieldUpdate = BTreeMap<EditableField, String>;

// ============================================================================
// Order record
// ============================================================================

/// Recharge order as returned by `/api/admin/recargas`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recharge {
    pub id: OrderId,
    /// Submission time (current backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Submission time (older rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "operadora", default)]
    pub carrier: Option<Carrier>,
    #[serde(rename = "recarga_selecionada", default)]
    pub plan: Option<String>,
    #[serde(rename = "senha_app", default)]
    pub app_password: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub admin_comment: Option<String>,
}

impl Recharge {
    /// Parsed submission time, preferring `timestamp` over `created_at`.
    ///
    /// Accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC).
    pub fn submitted_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.timestamp.as_deref().or(self.created_at.as_deref())?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt);
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    }

    /// Current value of an editable field as form text
    pub fn field_value(&self, field: EditableField) -> String {
        match field {
            EditableField::Status => self.status.as_str().to_string(),
            EditableField::AdminComment => self.admin_comment.clone().unwrap_or_default(),
            EditableField::Name => self.name.clone().unwrap_or_default(),
            EditableField::Phone => self.phone.clone().unwrap_or_default(),
            EditableField::Plan => self.plan.clone().unwrap_or_default(),
            EditableField::AppPassword => self.app_password.clone().unwrap_or_default(),
        }
    }

    /// Every editable field with its current value
    pub fn editable_values(&self) -> FieldUpdate {
        EditableField::ALL
            .into_iter()
            .map(|f| (f, self.field_value(f)))
            .collect()
    }

    /// Apply an acknowledged update locally
    pub fn apply(&mut self, update: &FieldUpdate) {
        for (field, value) in update {
            match field {
                EditableField::Status => self.status = OrderStatus::from(Some(value.clone())),
                EditableField::AdminComment => self.admin_comment = Some(value.clone()),
                EditableField::Name => self.name = Some(value.clone()),
                EditableField::Phone => self.phone = Some(value.clone()),
                EditableField::Plan => self.plan = Some(value.clone()),
                EditableField::AppPassword => self.app_password = Some(value.clone()),
            }
        }
    }
}

/// Create order payload (admin "add" form)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRecharge {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "operadora")]
    pub carrier: Carrier,
    #[serde(rename = "recarga_selecionada")]
    pub plan: String,
    #[serde(rename = "senha_app")]
    pub app_password: String,
}
