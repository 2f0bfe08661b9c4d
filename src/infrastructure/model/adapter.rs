//! Message adapters - convert a conversation into each provider's wire format

use crate::domain::{ChatMessage, MessageRole};
use serde_json::{Value, json};

pub struct MessageAdapter;

impl MessageAdapter {
    /// `[{"role": "...", "content": "..."}]`, also used by Mistral and Ollama.
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                })
            })
            .collect()
    }

    /// Anthropic takes system text separately from the user/assistant turns.
    pub fn to_anthropic_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let (system, turns) = split_system(messages);
        let turns = turns
            .into_iter()
            .map(|msg| json!({"role": msg.role.as_str(), "content": msg.content.clone()}))
            .collect();
        (system, turns)
    }

    /// Returns: (system_instruction_text, contents)
    pub fn to_gemini_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let (system, turns) = split_system(messages);
        let contents = turns
            .into_iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                json!({
                    "role": role,
                    "parts": [{"text": msg.content.clone()}]
                })
            })
            .collect();
        (system, contents)
    }

    /// Hugging Face text-generation input: one `ROLE: content` line per message.
    pub fn to_hf_inputs(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .map(|msg| format!("{}: {}", msg.role.as_str().to_uppercase(), msg.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<&ChatMessage>) {
    let mut system_parts = Vec::new();
    let mut turns = Vec::new();
    for message in messages {
        match message.role {
            MessageRole::System => system_parts.push(message.content.as_str()),
            _ => turns.push(message),
        }
    }
    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::System, "POLICY:\nNo PII."),
            ChatMessage::new(MessageRole::System, "Be brief."),
            ChatMessage::new(MessageRole::User, "Hola"),
            ChatMessage::new(MessageRole::Assistant, "¿Sí?"),
        ]
    }

    #[test]
    fn gemini_splits_system_and_renames_assistant() {
        let (system, contents) = MessageAdapter::to_gemini_format(&conversation());
        assert_eq!(system.as_deref(), Some("POLICY:\nNo PII.\n\nBe brief."));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[0]["parts"][0]["text"], "Hola");
    }

    #[test]
    fn anthropic_keeps_only_turns() {
        let (system, turns) = MessageAdapter::to_anthropic_format(&conversation());
        assert!(system.is_some());
        assert_eq!(turns, vec![
            json!({"role": "user", "content": "Hola"}),
            json!({"role": "assistant", "content": "¿Sí?"}),
        ]);
    }

    #[test]
    fn hf_inputs_prefix_roles() {
        let inputs = MessageAdapter::to_hf_inputs(&conversation()[2..]);
        assert_eq!(inputs, "USER: Hola\nASSISTANT: ¿Sí?");
    }
}
