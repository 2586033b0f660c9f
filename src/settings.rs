/// file: src/settings.rs
/// description: settings form controller with local validation and optimistic mutations
use crate::{
    api::SettingsApi,
    bindings::{
        ButtonBinding, ButtonState, CheckboxBinding, InputBinding, ModalBinding, ModalState,
        SubmitEvent, TextBinding,
    },
    monitoring::{MUTATIONS_COUNTER, ROLLBACK_COUNTER, VALIDATION_FAILURE_COUNTER},
    notify::Notifier,
    types::{ChangePasswordForm, SettingsUpdate},
};
use std::cell::Cell;
use tracing::{debug, info, warn};

pub const CHANGE_PASSWORD_LABEL: &str = "Change Password";
pub const BUSY_LABEL: &str = "Busy...";

pub const OLD_PASSWORD_REQUIRED: &str = "Old password is required";
pub const NEW_PASSWORD_REQUIRED: &str = "New password is required";
pub const CONFIRM_PASSWORD_REQUIRED: &str = "Confirm password is required";
pub const CONFIRM_PASSWORD_MISMATCH: &str = "Confirm password doesn't match";

pub const PASSWORD_CHANGED: &str = "Password changed";
pub const CHANGES_SAVED: &str = "Changes saved successfully";
pub const SERVER_ERROR: &str = "A server error occurred";
pub const SETTINGS_FALLBACK_ERROR: &str = "Something went wrong, please try again later";

/// Elements of the settings page and its change-password modal.
#[derive(Debug, Clone)]
pub struct SettingsView {
    pub old_password: InputBinding,
    pub old_password_error: TextBinding,
    pub new_password: InputBinding,
    pub new_password_error: TextBinding,
    pub confirm_password: InputBinding,
    pub confirm_password_error: TextBinding,
    pub submit_button: ButtonBinding,
    pub change_password_modal: ModalBinding,
    pub spend_unconfirmed_funds: CheckboxBinding,
}

impl Default for SettingsView {
    fn default() -> Self {
        Self {
            old_password: InputBinding::default(),
            old_password_error: TextBinding::default(),
            new_password: InputBinding::default(),
            new_password_error: TextBinding::default(),
            confirm_password: InputBinding::default(),
            confirm_password_error: TextBinding::default(),
            submit_button: ButtonBinding::new(ButtonState::enabled(CHANGE_PASSWORD_LABEL)),
            change_password_modal: ModalBinding::new(ModalState::Open),
            spend_unconfirmed_funds: CheckboxBinding::default(),
        }
    }
}

impl SettingsView {
    fn credentials(&self) -> ChangePasswordForm {
        ChangePasswordForm {
            old_password: self.old_password.get(),
            new_password: self.new_password.get(),
            confirm_password: self.confirm_password.get(),
        }
    }
}

/// Per-field messages from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordFieldErrors {
    pub old_password: Option<&'static str>,
    pub new_password: Option<&'static str>,
    pub confirm_password: Option<&'static str>,
}

impl PasswordFieldErrors {
    pub fn is_clean(&self) -> bool {
        self.old_password.is_none() && self.new_password.is_none() && self.confirm_password.is_none()
    }
}

/// Runs every check in order. A field keeps the first message it receives,
/// so an empty confirmation never also reports a mismatch.
pub fn validate_change_password(form: &ChangePasswordForm) -> PasswordFieldErrors {
    let mut errors = PasswordFieldErrors::default();

    if form.old_password.is_empty() {
        errors.old_password = Some(OLD_PASSWORD_REQUIRED);
    }
    if form.new_password.is_empty() {
        errors.new_password = Some(NEW_PASSWORD_REQUIRED);
    }
    if form.confirm_password.is_empty() {
        errors.confirm_password = Some(CONFIRM_PASSWORD_REQUIRED);
    }
    if form.confirm_password != form.new_password {
        errors.confirm_password.get_or_insert(CONFIRM_PASSWORD_MISMATCH);
    }

    errors
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    Changed,
    Rejected(String),
    ServerError,
    /// The controller was detached before the response arrived. The submit
    /// button is left busy since the view it belongs to is gone.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagOutcome {
    Saved,
    RolledBack(String),
    Discarded,
}

pub struct SettingsController<A, N> {
    view: SettingsView,
    api: A,
    notifier: N,
    attached: Cell<bool>,
    password_phase: Cell<PasswordPhase>,
}

impl<A: SettingsApi, N: Notifier> SettingsController<A, N> {
    pub fn new(view: SettingsView, api: A, notifier: N) -> Self {
        Self {
            view,
            api,
            notifier,
            attached: Cell::new(true),
            password_phase: Cell::new(PasswordPhase::Idle),
        }
    }

    pub fn view(&self) -> &SettingsView {
        &self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn password_phase(&self) -> PasswordPhase {
        self.password_phase.get()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Marks the view as torn down. Responses that settle afterwards are
    /// dropped without touching the elements.
    pub fn detach(&self) {
        self.attached.set(false);
        debug!("Settings controller detached");
    }

    /// Clears the three error displays, then writes this pass's messages.
    /// Returns whether every check passed.
    pub fn validate_change_password_fields(&self) -> bool {
        self.clear_change_password_validation_errors();

        let errors = validate_change_password(&self.view.credentials());
        for (slot, message) in [
            (&self.view.old_password_error, errors.old_password),
            (&self.view.new_password_error, errors.new_password),
            (&self.view.confirm_password_error, errors.confirm_password),
        ] {
            if let Some(message) = message {
                slot.set(message.to_string());
            }
        }

        errors.is_clean()
    }

    fn clear_change_password_validation_errors(&self) {
        self.view.old_password_error.set(String::new());
        self.view.new_password_error.set(String::new());
        self.view.confirm_password_error.set(String::new());
    }

    /// Submit handler of the change-password form.
    pub async fn change_password(&self, event: &SubmitEvent) -> PasswordOutcome {
        event.prevent_default();

        self.password_phase.set(PasswordPhase::Validating);
        if !self.validate_change_password_fields() {
            VALIDATION_FAILURE_COUNTER.increment(1);
            debug!("Password change blocked by validation");
            self.password_phase.set(PasswordPhase::Idle);
            return PasswordOutcome::Invalid;
        }

        self.password_phase.set(PasswordPhase::Submitting);
        let original_label = self.view.submit_button.with(|button| button.label.clone());
        self.view.submit_button.update(|button| {
            button.label = BUSY_LABEL.to_string();
            button.disabled = true;
        });

        MUTATIONS_COUNTER.increment(1);
        let result = self.api.change_password(&self.view.credentials()).await;

        if !self.is_attached() {
            debug!("Discarding password change response for detached view");
            self.password_phase.set(PasswordPhase::Idle);
            return PasswordOutcome::Discarded;
        }

        let outcome = match result {
            Ok(response) => match response.error {
                Some(message) => {
                    self.notifier.show_error(&message);
                    PasswordOutcome::Rejected(message)
                }
                None => {
                    self.view.old_password.set(String::new());
                    self.view.new_password.set(String::new());
                    self.view.confirm_password.set(String::new());
                    self.notifier.show_success(PASSWORD_CHANGED);
                    PasswordOutcome::Changed
                }
            },
            Err(e) => {
                warn!("Password change request failed: {}", e);
                self.notifier.show_error(SERVER_ERROR);
                PasswordOutcome::ServerError
            }
        };
        self.password_phase.set(if outcome == PasswordOutcome::Changed {
            PasswordPhase::Succeeded
        } else {
            PasswordPhase::Failed
        });

        self.view.submit_button.set(ButtonState::enabled(original_label));
        self.view.change_password_modal.set(ModalState::Closed);

        info!(?outcome, "Password change settled");
        self.password_phase.set(PasswordPhase::Idle);
        outcome
    }

    /// Change handler of the spend-unconfirmed checkbox, which already shows
    /// the requested value. Anything short of a confirmed save flips it back.
    pub async fn update_spend_unconfirmed(&self) -> FlagOutcome {
        let update = SettingsUpdate {
            spend_unconfirmed: self.view.spend_unconfirmed_funds.get(),
        };

        MUTATIONS_COUNTER.increment(1);
        let result = self.api.update_settings(&update).await;

        if !self.is_attached() {
            debug!("Discarding settings response for detached view");
            return FlagOutcome::Discarded;
        }

        let message = match result {
            Ok(response) if response.success => {
                self.notifier.show_success(CHANGES_SAVED);
                info!(spend_unconfirmed = update.spend_unconfirmed, "Setting saved");
                return FlagOutcome::Saved;
            }
            Ok(response) => response
                .error
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| SETTINGS_FALLBACK_ERROR.to_string()),
            Err(e) => {
                warn!("Settings request failed: {}", e);
                SERVER_ERROR.to_string()
            }
        };

        self.view.spend_unconfirmed_funds.update(|checked| *checked = !*checked);
        ROLLBACK_COUNTER.increment(1);
        self.notifier.show_error(&message);
        info!(
            spend_unconfirmed = self.view.spend_unconfirmed_funds.get(),
            "Setting rolled back"
        );
        FlagOutcome::RolledBack(message)
    }
}
