use airwatch_adapters::thingspeak::ThingSpeakAdapter;
use airwatch_types::SensorSnapshot;
use anyhow::{Context, Result};
use async_trait::async_trait;

use super::TelemetrySource;

#[async_trait]
impl TelemetrySource for ThingSpeakAdapter {
    async fn latest(&self) -> Result<SensorSnapshot> {
        ThingSpeakAdapter::latest(self)
            .await
            .with_context(|| format!("Failed to fetch latest entry of channel {}", self.channel_id()))
    }

    async fn history(&self, results: usize) -> Result<Vec<SensorSnapshot>> {
        ThingSpeakAdapter::history(self, results)
            .await
            .with_context(|| format!("Failed to fetch history of channel {}", self.channel_id()))
    }

    fn description(&self) -> String {
        format!("thingspeak: {}/channels/{}", self.endpoint(), self.channel_id())
    }
}
