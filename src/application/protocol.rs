//! Wire shapes of the protocol methods, shared by the router that produces
//! them and the clients that consume them.

use crate::application::registry::DescriptorFilter;
use crate::config::PromptVariable;
use crate::domain::{Descriptor, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const TOOLS_LIST: &str = "tools/list";
pub const TOOLS_CALL: &str = "tools/call";
pub const PROMPTS_LIST: &str = "prompts/list";
pub const PROMPTS_GET: &str = "prompts/get";
pub const RESOURCES_LIST: &str = "resources/list";
pub const RESOURCES_READ: &str = "resources/read";
pub const ARDF_LIST: &str = "ardf.list";

/// Params of `tools/call` and `prompts/get`. Arguments may be an object, a
/// JSON-encoded object string or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedCallParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Params of `resources/read`. Filter criteria and the cursor only apply to
/// the ARDF index uri.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceParams {
    #[serde(default)]
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(flatten)]
    pub filter: DescriptorFilter,
}

impl ReadResourceParams {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// A single piece of content: plain text or a JSON value.
///
/// Blocks are written with a `type` tag. Reading also accepts untagged
/// blocks such as `{"uri": .., "mimeType": .., "text": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", from = "WireBlock")]
pub enum ContentBlock {
    Text { text: String },
    Json { json: Value },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBlock {
    Tagged(TaggedBlock),
    Text { text: String },
    Json { json: Value },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedBlock {
    Text { text: String },
    Json { json: Value },
}

impl From<WireBlock> for ContentBlock {
    fn from(block: WireBlock) -> Self {
        match block {
            WireBlock::Tagged(TaggedBlock::Text { text }) | WireBlock::Text { text } => {
                ContentBlock::Text { text }
            }
            WireBlock::Tagged(TaggedBlock::Json { json }) | WireBlock::Json { json } => {
                ContentBlock::Json { json }
            }
        }
    }
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn json(json: Value) -> Self {
        ContentBlock::Json { json }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Json { .. } => None,
        }
    }

    /// Text form of the block; JSON is rendered compactly.
    pub fn to_text(&self) -> String {
        match self {
            ContentBlock::Text { text } => text.clone(),
            ContentBlock::Json { json } => json.to_string(),
        }
    }
}

/// Message content as other servers send it: a bare string, one block or a
/// list of blocks. This server always answers with a list of text blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Plain(String),
    Blocks(Vec<ContentBlock>),
    Block(ContentBlock),
}

impl MessageContent {
    pub fn text_block(text: impl Into<String>) -> Self {
        MessageContent::Blocks(vec![ContentBlock::text(text)])
    }

    pub fn to_text(&self) -> String {
        match self {
            MessageContent::Plain(text) => text.clone(),
            MessageContent::Block(block) => block.to_text(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .map(ContentBlock::to_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl PromptMessage {
    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::text_block(text),
        }
    }
}

pub fn default_input_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolListing {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_input_schema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<ToolListing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptListing {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<PromptVariable>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptsListResult {
    #[serde(default)]
    pub prompts: Vec<PromptListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub arguments: Vec<PromptVariable>,
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptResult {
    pub prompt: RenderedPrompt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceListing {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcesListResult {
    #[serde(default)]
    pub resources: Vec<ResourceListing>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReadResourceResult {
    /// First text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.contents.iter().find_map(ContentBlock::as_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArdfListing {
    pub index_uri: String,
    pub generated_at: String,
    pub version: String,
    pub total: usize,
    pub items: Vec<Descriptor>,
}
