use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::serde_helpers::{id_filter, id_string, platform_datetime};

/// An existing reservation on the platform.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Reservation {
    #[serde(deserialize_with = "id_string")]
    pub resource: String,
    #[serde(deserialize_with = "platform_datetime")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "platform_datetime")]
    pub end: NaiveDateTime,
}

/// A closure window (opening hours, holidays, maintenance).
///
/// An absent or empty filter applies to every resource / reservation type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlackoutBlock {
    #[serde(default, deserialize_with = "id_filter")]
    pub resource: Option<Vec<String>>,
    #[serde(default, rename = "type", deserialize_with = "id_filter")]
    pub types: Option<Vec<String>>,
    #[serde(deserialize_with = "platform_datetime")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "platform_datetime")]
    pub end: NaiveDateTime,
}

impl BlackoutBlock {
    pub fn applies_to_resource(&self, resource: &str) -> bool {
        filter_admits(self.resource.as_deref(), resource)
    }

    pub fn applies_to_type(&self, reservation_type: &str) -> bool {
        filter_admits(self.types.as_deref(), reservation_type)
    }
}

fn filter_admits(filter: Option<&[String]>, id: &str) -> bool {
    match filter {
        None => true,
        Some([]) => true,
        Some(ids) => ids.iter().any(|v| v == id),
    }
}

/// The platform's view of one date, as returned by the availability feed.
///
/// Always fetched fresh for an attempt; the platform changes between retries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AvailabilitySnapshot {
    pub reservations: Vec<Reservation>,

    /// `None` when the feed carries no blackout data at all.
    #[serde(default)]
    pub blocks: Option<Vec<BlackoutBlock>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_id_encodings() {
        let raw = r#"{
            "reservations": [
                {"resource": 565, "start": "2025-12-15T09:00:00", "end": "2025-12-15T12:00:00"}
            ],
            "blocks": [
                {"resource": ["565", 566], "type": 36, "start": "2025-12-15 17:00", "end": "2025-12-15 23:59"},
                {"resource": null, "start": "2025-12-25T00:00:00", "end": "2025-12-26T00:00:00"}
            ]
        }"#;

        let snap: AvailabilitySnapshot = serde_json::from_str(raw).unwrap();

        assert_eq!(snap.reservations[0].resource, "565");
        let blocks = snap.blocks.unwrap();
        assert_eq!(blocks[0].resource, Some(vec!["565".to_string(), "566".to_string()]));
        assert_eq!(blocks[0].types, Some(vec!["36".to_string()]));
        assert!(blocks[1].applies_to_resource("anything"));
        assert!(blocks[1].applies_to_type("36"));
    }

    #[test]
    fn feed_without_reservations_is_rejected() {
        let res: Result<AvailabilitySnapshot, _> = serde_json::from_str(r#"{"blocks": []}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_filter_applies_everywhere() {
        let block = BlackoutBlock {
            resource: Some(vec![]),
            types: Some(vec!["12".into()]),
            start: NaiveDateTime::default(),
            end: NaiveDateTime::default(),
        };
        assert!(block.applies_to_resource("565"));
        assert!(!block.applies_to_type("36"));
    }
}
