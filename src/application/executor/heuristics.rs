//! Argument inference for tool calls.
//!
//! Tools in a plan are called with arguments guessed from the goal text:
//! the first standalone run of three or more digits is the patient
//! identifier, the first `YYYY-MM-DDTHH:MM` token is the slot. Each field
//! falls back to a fixed default and is inferred independently.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const IDENTIFIER_FIELD: &str = "patientId";
pub const SLOT_FIELD: &str = "slot";
pub const DEFAULT_IDENTIFIER: &str = "1234";
pub const DEFAULT_SLOT: &str = "2025-10-08T10:00";

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-9]{3,})\b").expect("identifier pattern compiles"));
static SLOT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2})\b")
        .expect("slot pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolArguments {
    #[serde(rename = "patientId")]
    pub patient_id: String,
    pub slot: String,
}

impl ToolArguments {
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            IDENTIFIER_FIELD: self.patient_id,
            SLOT_FIELD: self.slot,
        })
    }
}

pub fn infer_tool_arguments(goal: &str) -> ToolArguments {
    let first = |pattern: &Regex, fallback: &str| {
        pattern
            .captures(goal)
            .and_then(|captures| captures.get(1))
            .map_or_else(|| fallback.to_string(), |m| m.as_str().to_string())
    };
    ToolArguments {
        patient_id: first(&IDENTIFIER_PATTERN, DEFAULT_IDENTIFIER),
        slot: first(&SLOT_PATTERN, DEFAULT_SLOT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_identifier_and_slot() {
        let args = infer_tool_arguments("Reservar cita para paciente 5678 el 2025-10-09T11:30");
        assert_eq!(args.patient_id, "5678");
        assert_eq!(args.slot, "2025-10-09T11:30");
    }

    #[test]
    fn defaults_apply_per_field() {
        let args = infer_tool_arguments("Reservar cita");
        assert_eq!(args.patient_id, DEFAULT_IDENTIFIER);
        assert_eq!(args.slot, DEFAULT_SLOT);

        let args = infer_tool_arguments("paciente 42 a las 2025-01-02T09:15");
        assert_eq!(args.patient_id, "2025");
        assert_eq!(args.slot, "2025-01-02T09:15");
    }

    #[test]
    fn embedded_digits_are_not_identifiers() {
        let args = infer_tool_arguments("code abc1234 then 987");
        assert_eq!(args.patient_id, "987");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value = infer_tool_arguments("paciente 777").to_value();
        assert_eq!(value[IDENTIFIER_FIELD], "777");
        assert_eq!(value[SLOT_FIELD], DEFAULT_SLOT);
    }
}
