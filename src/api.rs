/// file: src/api.rs
/// description: request/response calls behind the settings form
use crate::{
    config::HttpConfig,
    error::TransportError,
    types::{ChangePasswordForm, ChangePasswordResponse, SettingsResponse, SettingsUpdate},
};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

pub const CHANGE_PASSWORD_PATH: &str = "/change-password";
pub const SETTINGS_PATH: &str = "/settings";

/// Account-settings mutations.
///
/// `Err` is reserved for transport failures. A response body that reports an
/// application error is still `Ok`.
#[allow(async_fn_in_trait)]
pub trait SettingsApi {
    async fn change_password(
        &self,
        form: &ChangePasswordForm,
    ) -> Result<ChangePasswordResponse, TransportError>;

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<SettingsResponse, TransportError>;
}

pub struct HttpSettingsApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpSettingsApi {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, len = body.len(), "Settings response received");

        serde_json::from_slice(&body).map_err(|e| {
            error!(%status, "Undecodable settings response: {}", e);
            TransportError::MalformedBody(e)
        })
    }
}

impl SettingsApi for HttpSettingsApi {
    async fn change_password(
        &self,
        form: &ChangePasswordForm,
    ) -> Result<ChangePasswordResponse, TransportError> {
        let url = self.endpoint(CHANGE_PASSWORD_PATH)?;
        debug!(%url, "Submitting password change");

        let response = self
            .client
            .post(url)
            .form(&[
                ("oldPassword", form.old_password.as_str()),
                ("newPassword", form.new_password.as_str()),
                ("confirmPassword", form.confirm_password.as_str()),
            ])
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<SettingsResponse, TransportError> {
        let url = self.endpoint(SETTINGS_PATH)?;
        debug!(%url, spend_unconfirmed = update.spend_unconfirmed, "Updating settings");

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(update.to_form_body())
            .send()
            .await?;

        Self::decode(response).await
    }
}
