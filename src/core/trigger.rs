use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// External occurrence that starts the pipeline.
///
/// Both variants carry no payload consumed by later steps: an event only
/// causes execution, and step sequencing is identical for each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    ReleaseCreated,
    ManualDispatch,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerEvent::ReleaseCreated => "release_created",
            TriggerEvent::ManualDispatch => "manual_dispatch",
        }
    }

    /// Parse an event name as given on the CLI. Accepts dashed and
    /// underscored spellings ("release-created" and "release_created").
    pub fn from_name(name: &str) -> Result<Self> {
        match name.replace('-', "_").as_str() {
            "release_created" => Ok(TriggerEvent::ReleaseCreated),
            "manual_dispatch" => Ok(TriggerEvent::ManualDispatch),
            _ => Err(Error::validation_invalid_argument(
                "event",
                format!("Unknown trigger event '{}'", name),
                Some(name.to_string()),
                Some(vec![
                    "release-created".to_string(),
                    "manual-dispatch".to_string(),
                ]),
            )),
        }
    }

    /// Parse an event payload JSON of the form `{"event": "release_created"}`.
    /// Any other payload fields are ignored; the event carries no data the
    /// pipeline consumes.
    pub fn from_payload(payload: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Payload {
            event: String,
        }

        let parsed: Payload = serde_json::from_str(payload)
            .map_err(|e| Error::validation_invalid_json(e, Some("event payload".to_string())))?;
        Self::from_name(&parsed.event)
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashed_and_underscored_names() {
        assert_eq!(
            TriggerEvent::from_name("release-created").unwrap(),
            TriggerEvent::ReleaseCreated
        );
        assert_eq!(
            TriggerEvent::from_name("release_created").unwrap(),
            TriggerEvent::ReleaseCreated
        );
        assert_eq!(
            TriggerEvent::from_name("manual-dispatch").unwrap(),
            TriggerEvent::ManualDispatch
        );
    }

    #[test]
    fn unknown_event_is_a_validation_error() {
        let err = TriggerEvent::from_name("push").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidArgument);
    }

    #[test]
    fn parses_event_payload_and_ignores_extra_fields() {
        let event =
            TriggerEvent::from_payload(r#"{"event": "release_created", "tag": "v1.2.3"}"#).unwrap();
        assert_eq!(event, TriggerEvent::ReleaseCreated);
    }

    #[test]
    fn invalid_payload_json_is_rejected() {
        let err = TriggerEvent::from_payload("not json").unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::ValidationInvalidJson);
    }
}
