use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::parts::Direction;

/// A recognized request from the speech platform. Pure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    GetStatus,
    MovePart { direction: Direction, part: String },
    StartRoutine { name: String },
    StopRoutine { name: String },
    /// Anything we could not make sense of. Answered with a clarification.
    Unrecognized { reason: String },
}

#[derive(Debug, Deserialize)]
struct Payload {
    intent: Option<IntentName>,
    #[serde(default)]
    slots: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentName {
    intent_name: Option<String>,
}

impl Intent {
    fn unrecognized(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "Unrecognized intent");
        Intent::Unrecognized { reason }
    }

    /// Parse a hermes-style payload:
    /// `{"intent": {"intentName": "MovePart"}, "slots": [{"slotName": "name", "rawValue": "back"}]}`.
    /// Never fails; malformed input becomes `Unrecognized`.
    pub fn from_json_str(payload: &str) -> Self {
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Self::from_json(&value),
            Err(err) => Self::unrecognized(format!("invalid JSON: {}", err)),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        let payload: Payload = match serde_json::from_value(value.clone()) {
            Ok(payload) => payload,
            Err(err) => return Self::unrecognized(format!("invalid payload: {}", err)),
        };
        let Some(name) = payload.intent.and_then(|intent| intent.intent_name) else {
            return Self::unrecognized("missing intent name");
        };
        let slots = SlotReader::new(&payload.slots);

        match name.as_str() {
            "GetStatus" | "get_status" => {
                debug!("Recognized a get status intent");
                Intent::GetStatus
            }
            "MovePart" | "move_part" => {
                let Some(part) = slots.text("name") else {
                    return Self::unrecognized("move intent is missing the part name");
                };
                let direction = slots
                    .text("direction")
                    .and_then(|raw| raw.parse::<Direction>().ok());
                let Some(direction) = direction else {
                    return Self::unrecognized("move intent is missing a valid direction");
                };
                debug!(%part, %direction, "Recognized a move part intent");
                Intent::MovePart { direction, part }
            }
            "StartRoutine" | "start_routine" => match slots.text("name") {
                Some(name) => Intent::StartRoutine { name },
                None => Self::unrecognized("start routine intent is missing the routine name"),
            },
            "StopRoutine" | "stop_routine" => match slots.text("name") {
                Some(name) => Intent::StopRoutine { name },
                None => Self::unrecognized("stop routine intent is missing the routine name"),
            },
            other => Self::unrecognized(format!("unknown intent '{}'", other)),
        }
    }
}

/// Lenient slot lookup: malformed entries are skipped, not fatal.
struct SlotReader<'a> {
    slots: &'a [Value],
}

impl<'a> SlotReader<'a> {
    fn new(slots: &'a Value) -> Self {
        let slots = slots.as_array().map(Vec::as_slice).unwrap_or(&[]);
        Self { slots }
    }

    fn text(&self, slot_name: &str) -> Option<String> {
        self.slots
            .iter()
            .filter(|slot| slot.get("slotName").and_then(Value::as_str) == Some(slot_name))
            .find_map(|slot| slot.get("rawValue").and_then(Value::as_str))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
