//! Test doubles for the settings form.
//!
//! [`ScriptedSettingsApi`] answers each call with the next scripted result
//! and records what was sent, so flows can be exercised without a server.

use crate::{
    api::SettingsApi,
    bindings::{ButtonBinding, ButtonState},
    error::TransportError,
    types::{ChangePasswordForm, ChangePasswordResponse, SettingsResponse, SettingsUpdate},
};
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Default)]
pub struct ScriptedSettingsApi {
    password_results: RefCell<VecDeque<Result<ChangePasswordResponse, TransportError>>>,
    settings_results: RefCell<VecDeque<Result<SettingsResponse, TransportError>>>,
    password_calls: RefCell<Vec<ChangePasswordForm>>,
    settings_calls: RefCell<Vec<SettingsUpdate>>,
    button_probe: Option<ButtonBinding>,
    observed_buttons: RefCell<Vec<ButtonState>>,
}

impl ScriptedSettingsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the button's state at the moment each password request is sent.
    pub fn with_button_probe(mut self, button: ButtonBinding) -> Self {
        self.button_probe = Some(button);
        self
    }

    pub fn push_password_result(&self, result: Result<ChangePasswordResponse, TransportError>) {
        self.password_results.borrow_mut().push_back(result);
    }

    pub fn push_settings_result(&self, result: Result<SettingsResponse, TransportError>) {
        self.settings_results.borrow_mut().push_back(result);
    }

    pub fn password_calls(&self) -> Vec<ChangePasswordForm> {
        self.password_calls.borrow().clone()
    }

    pub fn settings_calls(&self) -> Vec<SettingsUpdate> {
        self.settings_calls.borrow().clone()
    }

    pub fn observed_buttons(&self) -> Vec<ButtonState> {
        self.observed_buttons.borrow().clone()
    }
}

/// Transport failure as produced by an unreachable server.
pub fn transport_failure() -> TransportError {
    TransportError::InvalidRequest("connection refused".to_string())
}

pub fn password_rejected(message: &str) -> ChangePasswordResponse {
    ChangePasswordResponse {
        error: Some(message.to_string()),
    }
}

pub fn settings_saved() -> SettingsResponse {
    SettingsResponse {
        success: true,
        error: None,
    }
}

pub fn settings_denied(message: Option<&str>) -> SettingsResponse {
    SettingsResponse {
        success: false,
        error: message.map(str::to_string),
    }
}

impl SettingsApi for ScriptedSettingsApi {
    async fn change_password(
        &self,
        form: &ChangePasswordForm,
    ) -> Result<ChangePasswordResponse, TransportError> {
        self.password_calls.borrow_mut().push(form.clone());
        if let Some(button) = &self.button_probe {
            self.observed_buttons.borrow_mut().push(button.get());
        }
        self.password_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport_failure()))
    }

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<SettingsResponse, TransportError> {
        self.settings_calls.borrow_mut().push(*update);
        self.settings_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(transport_failure()))
    }
}
