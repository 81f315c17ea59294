//! Site configuration document
//!
//! Singleton served by `GET /api/config` and replaced wholesale by
//! `PUT /api/admin/config`. Keys this client does not edit (page title,
//! PIX city, copyright line, ...) are carried in `extra` so a save never
//! drops them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::Carrier;

/// Recharge plan strings offered per carrier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RechargeOptions {
    #[serde(rename = "Tim", default, deserialize_with = "null_as_default")]
    pub tim: Vec<String>,
    #[serde(rename = "Vivo", default, deserialize_with = "null_as_default")]
    pub vivo: Vec<String>,
    #[serde(rename = "Claro", default, deserialize_with = "null_as_default")]
    pub claro: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RechargeOptions {
    /// Plans for a carrier; unknown carriers have none
    pub fn plans(&self, carrier: &Carrier) -> &[String] {
        match carrier {
            Carrier::Tim => &self.tim,
            Carrier::Vivo => &self.vivo,
            Carrier::Claro => &self.claro,
            Carrier::Unknown(_) => &[],
        }
    }

    /// Replace the plans of a known carrier. Returns false for unknown ones.
    pub fn set_plans(&mut self, carrier: &Carrier, plans: Vec<String>) -> bool {
        let slot = match carrier {
            Carrier::Tim => &mut self.tim,
            Carrier::Vivo => &mut self.vivo,
            Carrier::Claro => &mut self.claro,
            Carrier::Unknown(_) => return false,
        };
        *slot = plans;
        true
    }
}

/// Storefront configuration.
///
/// Text keys the stored document lacks (or holds as `null`) stay `None`
/// and are not written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(rename = "headerTitle", default, skip_serializing_if = "Option::is_none")]
    pub header_title: Option<String>,
    #[serde(rename = "headerSubtitle", default, skip_serializing_if = "Option::is_none")]
    pub header_subtitle: Option<String>,
    #[serde(rename = "footerWarning", default, skip_serializing_if = "Option::is_none")]
    pub footer_warning: Option<String>,
    /// PIX payment key
    #[serde(rename = "pixKey", default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    /// PIX account holder name
    #[serde(rename = "pixName", default, skip_serializing_if = "Option::is_none")]
    pub pix_name: Option<String>,
    #[serde(rename = "rechargeOptions", default, deserialize_with = "null_as_default")]
    pub recharge_options: RechargeOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
