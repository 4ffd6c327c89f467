//! Feed - a batch of snapshots returned by a history query.

use alloc::vec::Vec;

use crate::SensorSnapshot;

/// The body of a channel history response: `{"feeds": [...]}`.
///
/// Any other top-level keys the provider includes (channel metadata) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feed {
    /// Entries in the order the provider returned them (oldest first).
    #[cfg_attr(feature = "serde", serde(default))]
    pub feeds: Vec<SensorSnapshot>,
}

impl Feed {
    /// Create a feed from a list of entries.
    pub fn new(feeds: Vec<SensorSnapshot>) -> Self {
        Self { feeds }
    }

    /// Check if the feed has no entries.
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// The most recent entry (highest `entry_id`).
    pub fn latest(&self) -> Option<&SensorSnapshot> {
        self.feeds.iter().max_by_key(|s| s.entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parameter;

    #[test]
    fn test_latest_picks_highest_entry() {
        let feed = Feed::new(alloc::vec![
            SensorSnapshot::builder().entry_id(3).build(),
            SensorSnapshot::builder().entry_id(9).reading(Parameter::Co2, 410.0).build(),
            SensorSnapshot::builder().entry_id(5).build(),
        ]);

        assert_eq!(feed.len(), 3);
        assert_eq!(feed.latest().map(|s| s.entry_id), Some(9));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_with_channel_metadata() {
        let json = r#"{
            "channel": {"id": 2943472, "name": "Air Quality"},
            "feeds": [
                {"created_at": "2025-03-01T12:00:00Z", "entry_id": 1, "field3": "390"},
                {"created_at": "2025-03-01T12:10:00Z", "entry_id": 2, "field3": "420"}
            ]
        }"#;

        let feed: Feed = serde_json::from_str(json).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.feeds[1].get(Parameter::Co2), Some(420.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_missing_feeds_key_is_empty() {
        let feed: Feed = serde_json::from_str("{}").unwrap();
        assert!(feed.is_empty());
    }
}
