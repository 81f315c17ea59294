//! Row edit/save lifecycle
//!
//! ```text
//!   View --begin_edit--> Editing --begin_save--> Saving
//!    ^                      ^                       |
//!    |                      +------- failure -------+
//!    +------------------ success -------------------+
//! ```
//!
//! [`RowEditor`] is the pure state machine for one row. [`EditController`]
//! drives the remote update, notifications and the dashboard refresh
//! around it. Rows are independent: two rows may be saving at once, but a
//! single row rejects a second save while its first is in flight.

use std::sync::Arc;

use shared::{EditableField, FieldUpdate, OrderId, OrderStatus, Recharge};
use tokio::task::JoinHandle;

use crate::config::{AuthExpiry, SavePayload};
use crate::dashboard::DashboardService;
use crate::error::{ClientError, ClientResult};
use crate::http::AdminApi;
use crate::notify::{Notifier, ToastKind};
use crate::session::Session;

/// Presentation state of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    /// Read-only, "Edit" visible
    #[default]
    View,
    /// Fields editable, "Save" visible
    Editing,
    /// Request in flight, everything frozen
    Saving,
}

// ============================================================================
// RowEditor
// ============================================================================

/// Edit state machine for a single order row
#[derive(Debug, Clone)]
pub struct RowEditor {
    order: Recharge,
    draft: FieldUpdate,
    state: RowState,
    pending: Option<FieldUpdate>,
}

impl RowEditor {
    pub fn new(order: Recharge) -> Self {
        Self {
            order,
            draft: FieldUpdate::new(),
            state: RowState::View,
            pending: None,
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.order.id
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    /// Last persisted values
    pub fn order(&self) -> &Recharge {
        &self.order
    }

    /// Values currently in the edit fields
    pub fn draft(&self) -> &FieldUpdate {
        &self.draft
    }

    /// Value shown for a field: the draft while editing, else persisted
    pub fn value(&self, field: EditableField) -> String {
        match self.state {
            RowState::View => self.order.field_value(field),
            RowState::Editing | RowState::Saving => self
                .draft
                .get(&field)
                .cloned()
                .unwrap_or_else(|| self.order.field_value(field)),
        }
    }

    fn invalid(&self, action: &str) -> ClientError {
        ClientError::InvalidState(format!(
            "cannot {} row {} while {:?}",
            action, self.order.id, self.state
        ))
    }

    /// View -> Editing, seeding the draft from the persisted values
    pub fn begin_edit(&mut self) -> ClientResult<()> {
        if self.state != RowState::View {
            return Err(self.invalid("edit"));
        }
        self.draft = self.order.editable_values();
        self.state = RowState::Editing;
        Ok(())
    }

    /// Editing -> View, discarding the draft
    pub fn cancel_edit(&mut self) -> ClientResult<()> {
        if self.state != RowState::Editing {
            return Err(self.invalid("cancel"));
        }
        self.draft.clear();
        self.state = RowState::View;
        Ok(())
    }

    /// Change one draft value. Status must be one of the known values.
    pub fn set_field(&mut self, field: EditableField, value: impl Into<String>) -> ClientResult<()> {
        if self.state != RowState::Editing {
            return Err(self.invalid("change"));
        }
        let value = checked_value(field, value.into())?;
        self.draft.insert(field, value);
        Ok(())
    }

    /// Fields whose draft value differs from the persisted one
    pub fn changes(&self) -> FieldUpdate {
        self.draft
            .iter()
            .filter(|(field, value)| self.order.field_value(**field) != **value)
            .map(|(field, value)| (*field, value.clone()))
            .collect()
    }

    /// Editing -> Saving. Returns the PUT body for the chosen payload mode.
    pub fn begin_save(&mut self, mode: SavePayload) -> ClientResult<FieldUpdate> {
        if self.state != RowState::Editing {
            return Err(self.invalid("save"));
        }
        let payload = match mode {
            SavePayload::FullRow => self.draft.clone(),
            SavePayload::ChangedOnly => self.changes(),
        };
        self.pending = Some(payload.clone());
        self.state = RowState::Saving;
        Ok(payload)
    }

    /// Saving -> View, folding the acknowledged payload into the row
    pub fn complete_save(&mut self) -> ClientResult<FieldUpdate> {
        if self.state != RowState::Saving {
            return Err(self.invalid("complete save of"));
        }
        let sent = self.pending.take().unwrap_or_default();
        self.order.apply(&sent);
        self.draft.clear();
        self.state = RowState::View;
        Ok(sent)
    }

    /// Saving -> Editing, keeping the draft for another try
    pub fn fail_save(&mut self) -> ClientResult<()> {
        if self.state != RowState::Saving {
            return Err(self.invalid("fail save of"));
        }
        self.pending = None;
        self.state = RowState::Editing;
        Ok(())
    }
}

/// Reject status text outside the known set, normalising aliases
fn checked_value(field: EditableField, value: String) -> ClientResult<String> {
    match field {
        EditableField::Status => Ok(value.parse::<OrderStatus>()?.as_str().to_string()),
        _ => Ok(value),
    }
}

// ============================================================================
// EditController
// ============================================================================

/// Result of a row save
#[derive(Debug)]
pub enum SaveOutcome {
    /// Acknowledged; row back in `View`
    Saved {
        /// Detached dashboard refresh, when one was triggered
        dashboard_refresh: Option<JoinHandle<()>>,
    },
    /// Nothing changed; row back in `View` without a request
    Unchanged,
    /// Rejected or unreachable; row back in `Editing`
    Failed(ClientError),
    /// 401; credential dropped, row back in `Editing`
    AuthExpired {
        /// `true` under [`AuthExpiry::Reload`]: the session must restart.
        /// `false` when a fresh credential was obtained inline.
        reload_required: bool,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. } | Self::Unchanged)
    }
}

/// Drives row saves and single-field quick edits
#[derive(Clone)]
pub struct EditController {
    api: Arc<dyn AdminApi>,
    session: Arc<Session>,
    dashboard: DashboardService,
    notifier: Arc<dyn Notifier>,
    payload: SavePayload,
    auth_expiry: AuthExpiry,
}

impl EditController {
    pub fn new(
        api: Arc<dyn AdminApi>,
        session: Arc<Session>,
        dashboard: DashboardService,
        notifier: Arc<dyn Notifier>,
        payload: SavePayload,
        auth_expiry: AuthExpiry,
    ) -> Self {
        Self {
            api,
            session,
            dashboard,
            notifier,
            payload,
            auth_expiry,
        }
    }

    pub fn payload_mode(&self) -> SavePayload {
        self.payload
    }

    /// Save a row that is in `Editing`.
    ///
    /// Every failure is reported through the notifier and reflected in the
    /// returned outcome; nothing propagates.
    pub async fn save(&self, row: &mut RowEditor) -> SaveOutcome {
        if let Err(e) = self.session.require_ready() {
            return self.reject(e);
        }
        let credential = match self.session.authorize().await {
            Ok(c) => c,
            Err(e) => return self.reject(e),
        };

        let status_before = row.order().status.clone();
        let payload = match row.begin_save(self.payload) {
            Ok(p) => p,
            Err(e) => return self.reject(e),
        };

        if payload.is_empty() {
            // Only reachable in changed-only mode
            let _ = row.complete_save();
            return SaveOutcome::Unchanged;
        }

        let id = row.id().clone();
        tracing::debug!(order_id = %id, fields = payload.len(), "Saving row");
        let result = self.api.update_order(&credential, &id, &payload).await;

        match self.session.observe(result).await {
            Ok(()) => {
                let _ = row.complete_save();
                tracing::info!(order_id = %id, "Row saved");
                self.notifier.toast(ToastKind::Saved);

                let status_changed = row.order().status != status_before;
                let refresh = (status_changed || self.payload == SavePayload::FullRow)
                    .then(|| self.dashboard.spawn_refresh());
                SaveOutcome::Saved {
                    dashboard_refresh: refresh,
                }
            }
            Err(ClientError::Unauthorized) => {
                let _ = row.fail_save();
                SaveOutcome::AuthExpired {
                    reload_required: !self.handle_auth_expiry().await,
                }
            }
            Err(e) => {
                let _ = row.fail_save();
                tracing::warn!(order_id = %id, error = %e, "Row save failed");
                SaveOutcome::Failed(self.alert(e))
            }
        }
    }

    /// Quick edit of one field (status selector, comment box).
    ///
    /// Sends `{field: value}` only. Returns the dashboard refresh handle
    /// when the status changed.
    pub async fn update_field(
        &self,
        id: &OrderId,
        field: EditableField,
        value: impl Into<String>,
    ) -> ClientResult<Option<JoinHandle<()>>> {
        let outcome = self.try_update_field(id, field, value.into()).await;
        match outcome {
            Ok(handle) => Ok(handle),
            Err(ClientError::Unauthorized) => {
                self.handle_auth_expiry().await;
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(self.alert(e)),
        }
    }

    async fn try_update_field(
        &self,
        id: &OrderId,
        field: EditableField,
        value: String,
    ) -> ClientResult<Option<JoinHandle<()>>> {
        let value = checked_value(field, value)?;
        self.session.require_ready()?;
        let credential = self.session.authorize().await?;

        let mut update = FieldUpdate::new();
        update.insert(field, value);
        let result = self.api.update_order(&credential, id, &update).await;
        self.session.observe(result).await?;

        tracing::info!(order_id = %id, field = %field, "Field updated");
        self.notifier.toast(ToastKind::Saved);
        Ok((field == EditableField::Status).then(|| self.dashboard.spawn_refresh()))
    }

    fn alert(&self, err: ClientError) -> ClientError {
        self.notifier.alert(&err.user_message());
        err
    }

    fn reject(&self, err: ClientError) -> SaveOutcome {
        SaveOutcome::Failed(self.alert(err))
    }

    /// Apply the configured 401 policy. Returns true when a fresh
    /// credential is now held.
    async fn handle_auth_expiry(&self) -> bool {
        self.notifier
            .alert(&ClientError::Unauthorized.user_message());
        match self.auth_expiry {
            AuthExpiry::Reload => false,
            AuthExpiry::Reprompt => self
                .session
                .reprompt("Senha expirada. Insira a senha de administrador:")
                .await
                .is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockApi, order};
    use crate::notify::recording::RecordingNotifier;
    use crate::session::CredentialPrompt;
    use shared::OrderStatus;

    struct FixedPrompt(&'static str);

    impl CredentialPrompt for FixedPrompt {
        fn prompt(&self, _reason: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    struct Harness {
        api: Arc<MockApi>,
        session: Arc<Session>,
        notifier: Arc<RecordingNotifier>,
        controller: EditController,
    }

    fn harness(payload: SavePayload, auth_expiry: AuthExpiry, session: Session) -> Harness {
        let api = Arc::new(MockApi::new());
        let session = Arc::new(session);
        session.mark_ready();
        let notifier = Arc::new(RecordingNotifier::default());
        let dashboard = DashboardService::new(api.clone(), session.clone());
        let controller = EditController::new(
            api.clone(),
            session.clone(),
            dashboard,
            notifier.clone(),
            payload,
            auth_expiry,
        );
        Harness {
            api,
            session,
            notifier,
            controller,
        }
    }

    #[test]
    fn test_edit_requires_explicit_save() {
        let mut row = RowEditor::new(order("1"));
        assert_eq!(row.state(), RowState::View);
        assert!(row.set_field(EditableField::Status, "erro").is_err());
        assert!(row.begin_save(SavePayload::FullRow).is_err());

        row.begin_edit().unwrap();
        assert_eq!(row.state(), RowState::Editing);
        row.set_field(EditableField::Status, "erro").unwrap();
        assert_eq!(row.state(), RowState::Editing);
        assert!(row.begin_edit().is_err());
    }

    #[test]
    fn test_saving_row_rejects_second_save() {
        let mut row = RowEditor::new(order("1"));
        row.begin_edit().unwrap();
        row.begin_save(SavePayload::FullRow).unwrap();
        assert_eq!(row.state(), RowState::Saving);
        assert!(row.begin_save(SavePayload::FullRow).is_err());
        assert!(row.set_field(EditableField::Name, "x").is_err());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut row = RowEditor::new(order("1"));
        row.begin_edit().unwrap();
        row.set_field(EditableField::Name, "Outra").unwrap();
        row.cancel_edit().unwrap();
        assert_eq!(row.state(), RowState::View);
        assert_eq!(row.value(EditableField::Name), "Maria");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut row = RowEditor::new(order("1"));
        row.begin_edit().unwrap();

        let err = row.set_field(EditableField::Status, "foo").unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue(_)));
        assert_eq!(row.value(EditableField::Status), "na-fila");

        row.set_field(EditableField::Status, "Erro").unwrap();
        assert_eq!(row.value(EditableField::Status), "erro");
    }

    #[tokio::test]
    async fn test_changed_only_save_scenario() {
        let h = harness(
            SavePayload::ChangedOnly,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        let mut row = RowEditor::new(order("42"));
        row.begin_edit().unwrap();
        row.set_field(EditableField::Status, "erro").unwrap();

        let outcome = h.controller.save(&mut row).await;
        let SaveOutcome::Saved { dashboard_refresh } = outcome else {
            panic!("expected saved, got {outcome:?}");
        };
        dashboard_refresh.expect("status change refreshes").await.unwrap();

        let mut expected = FieldUpdate::new();
        expected.insert(EditableField::Status, "erro".into());
        assert_eq!(
            h.api.calls()[0],
            Call::Update {
                credential: "pw".into(),
                id: OrderId::new("42"),
                update: expected,
            }
        );
        assert_eq!(row.state(), RowState::View);
        assert_eq!(row.order().status, OrderStatus::Error);
        assert_eq!(h.notifier.toasts(), vec![ToastKind::Saved]);
        assert_eq!(h.api.dashboard_calls(), 1);
    }

    #[tokio::test]
    async fn test_full_row_save_sends_every_field() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        let mut row = RowEditor::new(order("42"));
        row.begin_edit().unwrap();
        row.set_field(EditableField::AdminComment, "ok").unwrap();

        let outcome = h.controller.save(&mut row).await;
        assert!(outcome.is_saved());
        let sent = &h.api.updates()[0];
        assert_eq!(sent.len(), EditableField::ALL.len());
        assert_eq!(sent[&EditableField::AdminComment], "ok");
        assert_eq!(sent[&EditableField::Status], "na-fila");
    }

    #[tokio::test]
    async fn test_failed_save_returns_to_editing() {
        let h = harness(
            SavePayload::ChangedOnly,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        h.api.push_update(Err(ClientError::RequestFailed {
            status: 400,
            message: Some("Telefone inválido.".into()),
        }));
        let mut row = RowEditor::new(order("7"));
        row.begin_edit().unwrap();
        row.set_field(EditableField::Phone, "abc").unwrap();

        let outcome = h.controller.save(&mut row).await;
        assert!(matches!(outcome, SaveOutcome::Failed(_)));
        assert_eq!(row.state(), RowState::Editing);
        assert_eq!(row.value(EditableField::Phone), "abc");
        assert_eq!(h.notifier.alerts(), vec!["Telefone inválido.".to_string()]);
        assert!(h.notifier.toasts().is_empty());

        // Row can be saved again once the server accepts it
        let outcome = h.controller.save(&mut row).await;
        assert!(outcome.is_saved());
        assert_eq!(row.state(), RowState::View);
    }

    #[tokio::test]
    async fn test_unchanged_save_skips_request() {
        let h = harness(
            SavePayload::ChangedOnly,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        let mut row = RowEditor::new(order("7"));
        row.begin_edit().unwrap();

        assert!(matches!(h.controller.save(&mut row).await, SaveOutcome::Unchanged));
        assert_eq!(row.state(), RowState::View);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_with_reload_policy() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        h.api.push_update(Err(ClientError::Unauthorized));
        let mut row = RowEditor::new(order("7"));
        row.begin_edit().unwrap();

        let outcome = h.controller.save(&mut row).await;
        assert!(matches!(
            outcome,
            SaveOutcome::AuthExpired {
                reload_required: true
            }
        ));
        assert_eq!(row.state(), RowState::Editing);
        assert!(!h.session.has_credential().await);
    }

    #[tokio::test]
    async fn test_unauthorized_with_reprompt_policy() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reprompt,
            Session::new()
                .with_credential("old")
                .with_prompt(Arc::new(FixedPrompt("new"))),
        );
        h.api.push_update(Err(ClientError::Unauthorized));
        let mut row = RowEditor::new(order("7"));
        row.begin_edit().unwrap();

        let outcome = h.controller.save(&mut row).await;
        assert!(matches!(
            outcome,
            SaveOutcome::AuthExpired {
                reload_required: false
            }
        ));
        assert_eq!(h.session.credential().await.as_deref(), Some("new"));

        assert!(h.controller.save(&mut row).await.is_saved());
        let calls = h.api.calls();
        let Call::Update { credential, .. } = &calls[1] else {
            panic!("expected update call");
        };
        assert_eq!(credential, "new");
    }

    #[tokio::test]
    async fn test_independent_rows_save_concurrently() {
        let h = harness(
            SavePayload::ChangedOnly,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        let mut a = RowEditor::new(order("1"));
        let mut b = RowEditor::new(order("2"));
        a.begin_edit().unwrap();
        b.begin_edit().unwrap();
        a.set_field(EditableField::Name, "A").unwrap();
        b.set_field(EditableField::Name, "B").unwrap();

        let (ra, rb) = tokio::join!(h.controller.save(&mut a), h.controller.save(&mut b));
        assert!(ra.is_saved() && rb.is_saved());
        assert_eq!(h.api.updates().len(), 2);
    }

    #[tokio::test]
    async fn test_update_field_refreshes_dashboard_only_for_status() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        let id = OrderId::new("5");

        let handle = h
            .controller
            .update_field(&id, EditableField::AdminComment, "ligar depois")
            .await
            .unwrap();
        assert!(handle.is_none());

        let handle = h
            .controller
            .update_field(&id, EditableField::Status, "recarga-efetuada")
            .await
            .unwrap();
        handle.unwrap().await.unwrap();
        assert_eq!(h.api.dashboard_calls(), 1);
        assert_eq!(h.notifier.toasts().len(), 2);
    }

    #[tokio::test]
    async fn test_update_field_when_not_ready() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );
        h.session.mark_not_ready();

        let err = h
            .controller
            .update_field(&OrderId::new("5"), EditableField::Status, "erro")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotReady));
        assert_eq!(h.notifier.alerts().len(), 1);
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_field_rejects_unknown_status() {
        let h = harness(
            SavePayload::FullRow,
            AuthExpiry::Reload,
            Session::new().with_credential("pw"),
        );

        let err = h
            .controller
            .update_field(&OrderId::new("42"), EditableField::Status, "foo")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue(_)));
        assert_eq!(h.notifier.alerts(), vec!["Valor inválido: unknown status: foo"]);
        assert!(h.api.calls().is_empty());
    }
}
