//! Hosted backend HTTP client.

use crate::error::BackendError;
use crate::types::*;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Name of the signup edge function.
const SIGNUP_FUNCTION: &str = "register-user";

/// Client for the hosted backend's REST, RPC, auth-admin and function APIs.
///
/// The API key (anon key on the client side, service key inside the edge
/// function) is stored using `SecretString` so it never shows up in logs.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl BackendClient {
    /// Create a new backend client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
        })
    }

    /// Get the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the backend REST API is reachable.
    pub async fn health_check(&self) -> bool {
        self.authed(self.client.get(format!("{}/rest/v1/", self.base_url)))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Look up the admin role row for a user. Returns `None` when the user
    /// holds no admin role.
    #[instrument(skip(self))]
    pub async fn find_admin_role(&self, user_id: &str) -> Result<Option<RoleRow>, BackendError> {
        let url = format!(
            "{}/rest/v1/user_roles?user_id=eq.{}&role=eq.{}&select=user_id,role&limit=1",
            self.base_url,
            encode(user_id),
            ADMIN_ROLE
        );

        let response = self.authed(self.client.get(&url)).send().await?;
        let rows: Vec<RoleRow> = self.handle_response(response).await?;

        debug!(found = !rows.is_empty(), "Admin role lookup finished");
        Ok(rows.into_iter().next())
    }

    /// Find profiles whose username or phone number matches.
    #[instrument(skip(self))]
    pub async fn find_profiles(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<Vec<ProfileRow>, BackendError> {
        let filter = format!(
            "(username.eq.{},phone_number.eq.{})",
            quote_filter_value(username),
            quote_filter_value(phone_number)
        );
        let url = format!(
            "{}/rest/v1/profiles?or={}&select=id,username,phone_number",
            self.base_url,
            encode(&filter)
        );

        let response = self.authed(self.client.get(&url)).send().await?;
        self.handle_response(response).await
    }

    /// List a user's commission records, newest first.
    #[instrument(skip(self))]
    pub async fn list_commissions(&self, user_id: &str) -> Result<Vec<CommissionRow>, BackendError> {
        let url = format!(
            "{}/rest/v1/commissions?user_id=eq.{}&select=order_id,amount,created_at&order=created_at.desc",
            self.base_url,
            encode(user_id)
        );

        let response = self.authed(self.client.get(&url)).send().await?;
        let rows: Vec<CommissionRow> = self.handle_response(response).await?;

        debug!("Fetched {} commission records", rows.len());
        Ok(rows)
    }

    /// Ask the backend's generator for an unused internal email address.
    #[instrument(skip(self))]
    pub async fn generate_unique_email(&self, username: &str) -> Result<String, BackendError> {
        let response = self
            .authed(
                self.client
                    .post(format!("{}/rest/v1/rpc/generate_unique_email", self.base_url)),
            )
            .json(&serde_json::json!({ "p_username": username }))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create an auth user through the admin API.
    #[instrument(skip(self, user), fields(username = %user.user_metadata.username))]
    pub async fn create_user(&self, user: &NewAuthUser) -> Result<CreatedUser, BackendError> {
        let response = self
            .authed(self.client.post(format!("{}/auth/v1/admin/users", self.base_url)))
            .json(user)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Invoke the signup edge function.
    ///
    /// Non-success statuses come back as [`BackendError::Function`] carrying
    /// the function's `error` message.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn invoke_signup(
        &self,
        request: &SignupRequest,
    ) -> Result<SignupResponse, BackendError> {
        let response = self
            .authed(
                self.client
                    .post(format!("{}/functions/v1/{}", self.base_url, SIGNUP_FUNCTION)),
            )
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<FunctionErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.error),
            Err(_) => (None, body),
        };
        warn!(status = %status, message = %message, "Signup function failed");

        Err(BackendError::Function {
            status: status.as_u16(),
            code,
            message,
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        builder
            .header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!(bytes = body.len(), "Response received");
            serde_json::from_str(&body).map_err(BackendError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> BackendError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => {
                warn!("Backend rejected API key");
                BackendError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                warn!(status = %status, "Backend request failed");
                BackendError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Quote a value for use inside a REST `or=(...)` filter.
fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
