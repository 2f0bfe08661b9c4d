//! Normalises whatever a task runner answers into protocol content.
//!
//! Runners wrap their answer in many ways: `{type, json}` / `{type, text}`
//! blocks, `{content: [...]}` lists, `{data: ...}` or `{result: ...}`
//! envelopes, bare strings, single-element arrays. Everything funnels through
//! [`DelegatedPayload`] so the router only ever sees [`ContentBlock`]s.

use crate::application::protocol::{ContentBlock, PromptMessage};
use crate::config::{PromptVariable, ResponseType};
use serde_json::{Map, Value};

const MAX_UNWRAP_DEPTH: usize = 8;
static ENVELOPE_KEYS: [&str; 3] = ["result", "data", "json"];

#[derive(Debug, Clone, PartialEq)]
pub struct DelegatedPayload(Value);

impl DelegatedPayload {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Extracts a content block and coerces it to the declared response type.
    pub fn into_block(self, declared: ResponseType) -> Result<ContentBlock, String> {
        conform(extract(self.0, 0), declared)
    }

    /// Innermost object of the answer, looking through `result`/`data`/`json`
    /// envelopes and single-element arrays. Non-object answers yield an empty map.
    pub fn into_object(self) -> Map<String, Value> {
        let mut current = self.0;
        for _ in 0..MAX_UNWRAP_DEPTH {
            current = match current {
                Value::Array(mut items) if items.len() == 1 => items.remove(0),
                Value::Object(mut map) => {
                    let envelope = ENVELOPE_KEYS
                        .iter()
                        .find(|key| map.get(**key).is_some_and(Value::is_object) && map.len() == 1);
                    match envelope {
                        Some(key) => map.remove(*key).unwrap_or_default(),
                        None => return map,
                    }
                }
                _ => return Map::new(),
            };
        }
        match current {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

fn extract(value: Value, depth: usize) -> ContentBlock {
    if depth >= MAX_UNWRAP_DEPTH {
        return ContentBlock::json(value);
    }
    match value {
        Value::Null => ContentBlock::text(""),
        Value::String(text) => ContentBlock::text(text),
        Value::Array(mut items) if items.len() == 1 => extract(items.remove(0), depth + 1),
        Value::Object(mut map) => {
            let declared = map.get("type").and_then(Value::as_str).map(str::to_owned);
            match declared.as_deref() {
                Some("json") if map.contains_key("json") => {
                    return ContentBlock::json(map.remove("json").unwrap_or_default());
                }
                Some("text") => {
                    if let Some(Value::String(text)) = map.remove("text") {
                        return ContentBlock::text(text);
                    }
                }
                _ => {}
            }
            if let Some(json) = map.remove("json") {
                return ContentBlock::json(json);
            }
            if let Some(Value::String(text)) = map.get("text") {
                return ContentBlock::text(text.clone());
            }
            for key in ["content", "data", "result"] {
                if let Some(inner) = map.remove(key) {
                    return extract(inner, depth + 1);
                }
            }
            ContentBlock::json(Value::Object(map))
        }
        other => ContentBlock::json(other),
    }
}

fn conform(block: ContentBlock, declared: ResponseType) -> Result<ContentBlock, String> {
    match (declared, block) {
        (ResponseType::Text, block) => Ok(ContentBlock::text(block.to_text())),
        (ResponseType::Json, ContentBlock::Json { json }) => Ok(ContentBlock::json(json)),
        (ResponseType::Json, ContentBlock::Text { text }) => {
            let source = if text.trim().is_empty() { "{}" } else { text.as_str() };
            serde_json::from_str(source)
                .map(ContentBlock::json)
                .map_err(|err| format!("expected JSON content but the runner sent text: {err}"))
        }
    }
}

/// Overrides a delegated prompt generator may send back.
#[derive(Debug, Default)]
pub struct PromptOverrides {
    pub description: Option<String>,
    pub variables: Option<Vec<PromptVariable>>,
    pub messages: Option<Vec<PromptMessage>>,
}

impl PromptOverrides {
    pub fn from_payload(payload: DelegatedPayload) -> Result<Self, String> {
        let mut map = payload.into_object();
        if let Some(Value::Object(inner)) = map.remove("prompt") {
            map = inner;
        }

        let description = map
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let variables = match map.remove("variables").or_else(|| map.remove("arguments")) {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .map(parse_variable)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(Value::Null) | None => None,
            Some(other) => return Err(format!("variables must be a list, got {other}")),
        };

        let messages = match map.remove("messages") {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .map(|item| {
                        serde_json::from_value::<PromptMessage>(item)
                            .map_err(|err| format!("invalid prompt message: {err}"))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(Value::Null) | None => None,
            Some(other) => return Err(format!("messages must be a list, got {other}")),
        };

        Ok(Self {
            description,
            variables,
            messages,
        })
    }
}

fn parse_variable(value: Value) -> Result<PromptVariable, String> {
    match value {
        Value::String(name) => Ok(PromptVariable {
            name,
            description: None,
            required: false,
            default: None,
        }),
        other => serde_json::from_value(other).map_err(|err| format!("invalid variable: {err}")),
    }
}

/// Overrides a delegated resource loader may send back along with the content.
#[derive(Debug)]
pub struct ResourceOverrides {
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub response_type: Option<ResponseType>,
    pub block: ContentBlock,
}

impl ResourceOverrides {
    pub fn from_payload(payload: DelegatedPayload, declared: ResponseType) -> Result<Self, String> {
        let mut map = match payload.into_inner() {
            Value::Object(map) => map,
            other => {
                return Ok(Self {
                    mime_type: None,
                    description: None,
                    response_type: None,
                    block: DelegatedPayload::new(other).into_block(declared)?,
                });
            }
        };

        let take_str = |map: &mut Map<String, Value>, keys: &[&str]| -> Option<String> {
            keys.iter().find_map(|key| match map.remove(*key) {
                Some(Value::String(text)) => Some(text),
                _ => None,
            })
        };
        let mime_type = take_str(&mut map, &["mime_type", "mimeType"]);
        let description = take_str(&mut map, &["description"]);
        let response_type = match take_str(&mut map, &["response_type", "responseType"]) {
            Some(raw) => Some(match raw.to_ascii_lowercase().as_str() {
                "json" => ResponseType::Json,
                "text" => ResponseType::Text,
                other => return Err(format!("unknown response_type '{other}'")),
            }),
            None => None,
        };

        let effective = response_type.unwrap_or(declared);
        let block = DelegatedPayload::new(Value::Object(map)).into_block(effective)?;
        Ok(Self {
            mime_type,
            description,
            response_type,
            block,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageRole;
    use serde_json::json;

    fn block(raw: Value, declared: ResponseType) -> ContentBlock {
        DelegatedPayload::new(raw)
            .into_block(declared)
            .expect("payload adapts")
    }

    #[test]
    fn typed_blocks_pass_through() {
        assert_eq!(
            block(json!({"type": "json", "json": {"ok": true}}), ResponseType::Json),
            ContentBlock::json(json!({"ok": true}))
        );
        assert_eq!(
            block(json!({"type": "text", "text": "done"}), ResponseType::Text),
            ContentBlock::text("done")
        );
    }

    #[test]
    fn envelopes_are_unwrapped() {
        assert_eq!(
            block(json!({"result": {"data": {"appointmentId": "A-1"}}}), ResponseType::Json),
            ContentBlock::json(json!({"appointmentId": "A-1"}))
        );
        assert_eq!(
            block(
                json!({"content": [{"type": "text", "text": "hello"}]}),
                ResponseType::Text
            ),
            ContentBlock::text("hello")
        );
        assert_eq!(
            block(json!([{"json": {"n": 1}}]), ResponseType::Json),
            ContentBlock::json(json!({"n": 1}))
        );
    }

    #[test]
    fn text_is_parsed_when_json_is_declared() {
        assert_eq!(
            block(json!("{\"id\": 7}"), ResponseType::Json),
            ContentBlock::json(json!({"id": 7}))
        );
        assert_eq!(block(json!(""), ResponseType::Json), ContentBlock::json(json!({})));
        let err = DelegatedPayload::new(json!("not json"))
            .into_block(ResponseType::Json)
            .expect_err("unparsable text rejected");
        assert!(err.contains("expected JSON"));
    }

    #[test]
    fn json_is_stringified_when_text_is_declared() {
        assert_eq!(
            block(json!({"id": 7}), ResponseType::Text),
            ContentBlock::text(r#"{"id":7}"#)
        );
        assert_eq!(block(Value::Null, ResponseType::Text), ContentBlock::text(""));
    }

    #[test]
    fn prompt_overrides_accept_loose_shapes() {
        let overrides = PromptOverrides::from_payload(DelegatedPayload::new(json!({
            "result": {
                "description": "Generated",
                "variables": ["name", {"name": "date", "required": true}],
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": {"type": "text", "text": "Hi {{name}}"}},
                    {"role": "assistant", "content": [{"type": "text", "text": "Ok"}]}
                ]
            }
        })))
        .expect("overrides parse");
        assert_eq!(overrides.description.as_deref(), Some("Generated"));
        let variables = overrides.variables.expect("variables present");
        assert_eq!(variables[0].name, "name");
        assert!(variables[1].required);
        let messages = overrides.messages.expect("messages present");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].content.to_text(), "Hi {{name}}");
    }

    #[test]
    fn prompt_overrides_reject_unknown_roles() {
        let err = PromptOverrides::from_payload(DelegatedPayload::new(json!({
            "messages": [{"role": "narrator", "content": "x"}]
        })))
        .expect_err("role rejected");
        assert!(err.contains("invalid prompt message"));
    }

    #[test]
    fn resource_overrides_switch_response_type() {
        let overrides = ResourceOverrides::from_payload(
            DelegatedPayload::new(json!({
                "mimeType": "application/json",
                "response_type": "json",
                "content": "{\"rows\": 2}"
            })),
            ResponseType::Text,
        )
        .expect("overrides parse");
        assert_eq!(overrides.mime_type.as_deref(), Some("application/json"));
        assert_eq!(overrides.response_type, Some(ResponseType::Json));
        assert_eq!(overrides.block, ContentBlock::json(json!({"rows": 2})));
    }
}
