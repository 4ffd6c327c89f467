//! Twilio adapter using the Messages REST API.
//!
//! Messages are sent as a form-encoded `POST` to
//! `/2010-04-01/Accounts/{sid}/Messages.json` with `To`, `From` and `Body`
//! fields, authenticated with HTTP basic auth (account SID and auth token).
//!
//! ## Example
//!
//! ```rust,no_run
//! use airwatch_adapters::twilio::TwilioMessenger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let messenger = TwilioMessenger::builder()
//!         .credentials("ACXXXXXXXX", "auth-token")
//!         .from_number("+15005550006")
//!         .build()?;
//!
//!     let receipt = messenger.send("+15551234567", "Air quality alert").await?;
//!     println!("queued as {:?}", receipt.sid);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Request};
use serde::Deserialize;

use crate::AdapterError;

/// Default public API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.twilio.com";

/// Twilio messenger for outbound SMS.
#[derive(Debug, Clone)]
pub struct TwilioMessenger {
    client: Client,
    endpoint: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

/// What the API reports back for an accepted message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageReceipt {
    /// Message SID assigned by the provider.
    #[serde(default)]
    pub sid: Option<String>,
    /// Delivery status at acceptance time (usually "queued").
    #[serde(default)]
    pub status: Option<String>,
}

impl TwilioMessenger {
    /// Create a new builder for configuring the messenger.
    pub fn builder() -> TwilioMessengerBuilder {
        TwilioMessengerBuilder::default()
    }

    /// The sender number messages are sent from.
    pub fn from_number(&self) -> &str {
        &self.from
    }

    /// Send a text message to `to`.
    pub async fn send(&self, to: &str, body: &str) -> Result<MessageReceipt, AdapterError> {
        let request = self.message_request(to, body)?;
        let response = self.client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<MessageReceipt>()
                .await
                .map_err(|e| AdapterError::Parse(e.to_string()));
        }

        // Error bodies carry a human-readable reason; fall back to the status.
        let detail = response
            .json::<ApiError>()
            .await
            .ok()
            .and_then(ApiError::into_message)
            .unwrap_or_else(|| format!("API returned status {}", status));

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterError::Auth(detail));
        }

        Err(AdapterError::Http(detail))
    }

    pub(crate) fn message_request(&self, to: &str, body: &str) -> Result<Request, AdapterError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.endpoint, self.account_sid
        );

        Ok(self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from.as_str()), ("Body", body)])
            .build()?)
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

impl ApiError {
    fn into_message(self) -> Option<String> {
        self.message.or(self.error_message)
    }
}

/// Builder for TwilioMessenger.
#[derive(Debug, Default)]
pub struct TwilioMessengerBuilder {
    endpoint: Option<String>,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from: Option<String>,
    timeout: Option<Duration>,
}

impl TwilioMessengerBuilder {
    /// Set the API endpoint (default: "https://api.twilio.com").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the account SID and auth token.
    pub fn credentials(mut self, account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        self.account_sid = Some(account_sid.into());
        self.auth_token = Some(auth_token.into());
        self
    }

    /// Set the sender number.
    pub fn from_number(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the messenger.
    ///
    /// Credentials and a sender number are mandatory.
    pub fn build(self) -> Result<TwilioMessenger, AdapterError> {
        let account_sid = required(self.account_sid, "account sid")?;
        let auth_token = required(self.auth_token, "auth token")?;
        let from = required(self.from, "sender number")?;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        Ok(TwilioMessenger {
            client,
            endpoint: self
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            account_sid,
            auth_token,
            from,
        })
    }
}

fn required(value: Option<String>, what: &str) -> Result<String, AdapterError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AdapterError::Config(format!("{} is required", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messenger() -> TwilioMessenger {
        TwilioMessenger::builder()
            .credentials("AC123", "secret")
            .from_number("+15005550006")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_credentials() {
        let err = TwilioMessenger::builder().from_number("+1").build().unwrap_err();
        assert!(matches!(err, AdapterError::Config(ref m) if m.contains("account sid")));

        let err = TwilioMessenger::builder()
            .credentials("AC123", "secret")
            .build()
            .unwrap_err();
        assert!(matches!(err, AdapterError::Config(ref m) if m.contains("sender")));
    }

    #[test]
    fn test_message_request_shape() {
        let request = messenger()
            .message_request("+15551234567", "Air Quality Report:\nStatus: ok")
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );

        let headers = request.headers();
        assert_eq!(
            headers.get(reqwest::header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        let auth = headers.get(reqwest::header::AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with("Basic "));

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body = std::str::from_utf8(body).unwrap();
        assert_eq!(
            body,
            "To=%2B15551234567&From=%2B15005550006&Body=Air+Quality+Report%3A%0AStatus%3A+ok"
        );
    }

    #[test]
    fn test_api_error_message_fallbacks() {
        let err: ApiError = serde_json::from_str(r#"{"message": "Invalid 'To' number"}"#).unwrap();
        assert_eq!(err.into_message().as_deref(), Some("Invalid 'To' number"));

        let err: ApiError = serde_json::from_str(r#"{"error_message": "Queue full"}"#).unwrap();
        assert_eq!(err.into_message().as_deref(), Some("Queue full"));

        let err: ApiError = serde_json::from_str("{}").unwrap();
        assert_eq!(err.into_message(), None);
    }
}
