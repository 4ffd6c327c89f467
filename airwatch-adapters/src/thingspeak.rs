//! ThingSpeak adapter using the channel feeds REST API.
//!
//! ## Endpoints
//!
//! - **Latest entry**: `GET /channels/{id}/feeds/last.json?api_key={key}`
//! - **History**: `GET /channels/{id}/feeds.json?api_key={key}&results={n}`
//!
//! Both return entries shaped like [`SensorSnapshot`]; the history endpoint
//! wraps them in `{"feeds": [...]}`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use airwatch_adapters::thingspeak::ThingSpeakAdapter;
//! use airwatch_adapters::Parameter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = ThingSpeakAdapter::builder()
//!         .endpoint("https://api.thingspeak.com")
//!         .channel_id("2943472")
//!         .api_key("READ_API_KEY")
//!         .build()?;
//!
//!     let snapshot = adapter.latest().await?;
//!     if let Some(co2) = snapshot.get(Parameter::Co2) {
//!         println!("CO₂: {co2} ppm");
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, Request, Response};

use airwatch_types::{Feed, SensorSnapshot};

use crate::AdapterError;

/// Default public API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.thingspeak.com";

/// ThingSpeak adapter for reading a channel.
#[derive(Debug, Clone)]
pub struct ThingSpeakAdapter {
    client: Client,
    endpoint: String,
    channel_id: String,
    api_key: String,
}

impl ThingSpeakAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> ThingSpeakAdapterBuilder {
        ThingSpeakAdapterBuilder::default()
    }

    /// The channel this adapter reads from.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// The API endpoint this adapter talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the most recent entry of the channel.
    pub async fn latest(&self) -> Result<SensorSnapshot, AdapterError> {
        let request = self.latest_request()?;
        let response = check_status(self.client.execute(request).await?)?;

        response
            .json::<SensorSnapshot>()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))
    }

    /// Fetch up to `results` most recent entries, oldest first.
    pub async fn history(&self, results: usize) -> Result<Vec<SensorSnapshot>, AdapterError> {
        let request = self.history_request(results)?;
        let response = check_status(self.client.execute(request).await?)?;

        let feed: Feed = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(feed.feeds)
    }

    pub(crate) fn latest_request(&self) -> Result<Request, AdapterError> {
        let url = format!("{}/channels/{}/feeds/last.json", self.endpoint, self.channel_id);

        Ok(self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .build()?)
    }

    pub(crate) fn history_request(&self, results: usize) -> Result<Request, AdapterError> {
        let url = format!("{}/channels/{}/feeds.json", self.endpoint, self.channel_id);
        let results = results.to_string();

        Ok(self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("results", results.as_str())])
            .build()?)
    }
}

fn check_status(response: Response) -> Result<Response, AdapterError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(AdapterError::Auth("Channel rejected the API key".to_string()));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(AdapterError::Http("Channel not found".to_string()));
    }

    if !status.is_success() {
        return Err(AdapterError::Http(format!("API returned status {}", status)));
    }

    Ok(response)
}

/// Builder for ThingSpeakAdapter.
#[derive(Debug, Default)]
pub struct ThingSpeakAdapterBuilder {
    endpoint: Option<String>,
    channel_id: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl ThingSpeakAdapterBuilder {
    /// Set the API endpoint (default: "https://api.thingspeak.com").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the channel to read.
    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Set the read API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter.
    ///
    /// Fails if no channel id was given or the HTTP client cannot be created.
    pub fn build(self) -> Result<ThingSpeakAdapter, AdapterError> {
        let channel_id = self
            .channel_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AdapterError::Config("channel id is required".to_string()))?;

        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;

        Ok(ThingSpeakAdapter {
            client,
            endpoint: self
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            channel_id,
            api_key: self.api_key.unwrap_or_default(),
        })
    }
}
