use serde::{Deserialize, Deserializer, Serialize};

/// Reads an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Created,
    Queued,
    InProgress,
    Completed,
    Incomplete,
    Failed,
    Cancelled,
}

impl ResponseStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Incomplete | Self::Failed | Self::Cancelled
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Status of a single output item. Tools only use a subset: file and web
/// search report `searching`, code interpreter reports `interpreting`, image
/// generation reports `generating`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    InProgress,
    Searching,
    Interpreting,
    Generating,
    Completed,
    Incomplete,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ItemStatus {
    /// Maps the trailing segment of a `response.<tool>_call.<status>` event.
    #[must_use]
    pub fn from_event_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "in_progress" => Self::InProgress,
            "searching" => Self::Searching,
            "interpreting" => Self::Interpreting,
            "generating" => Self::Generating,
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "failed" => Self::Failed,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Searching => "searching",
            Self::Interpreting => "interpreting",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Incomplete | Self::Failed)
    }
}

/// One turn's answer as seen by the client. Every snapshot event carries a
/// complete copy; deltas and progress events patch it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ResponseStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    #[must_use]
    pub fn new(id: impl Into<String>, status: ResponseStatus) -> Self {
        Self {
            id: id.into(),
            status,
            model: String::new(),
            created_at: None,
            previous_response_id: None,
            output: Vec::new(),
            usage: None,
            error: None,
        }
    }

    /// Stand-in used when incremental events arrive before any snapshot.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(String::new(), ResponseStatus::InProgress)
    }

    #[must_use]
    pub fn with_output(mut self, output: Vec<OutputItem>) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        if item_id.is_empty() {
            return None;
        }
        self.output
            .iter()
            .position(|item| item.id() == Some(item_id))
    }

    /// Concatenated text of every assistant message, in output order.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) => Some(message.text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Installed citations, one per display number, in numbering order.
    #[must_use]
    pub fn citations(&self) -> Vec<&Citation> {
        let mut citations: Vec<&Citation> = self
            .output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) => Some(message),
                _ => None,
            })
            .flat_map(|message| message.content.iter())
            .filter_map(|part| match part {
                ContentPart::OutputText(text) => Some(text.annotations.iter()),
                _ => None,
            })
            .flatten()
            .filter_map(|annotation| annotation.citation.as_ref())
            .collect();
        citations.sort_by_key(|c| c.display_number);
        citations.dedup_by_key(|c| c.display_number);
        citations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens_details: Option<InputTokensDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens_details: Option<OutputTokensDetails>,
}

impl Usage {
    #[must_use]
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            input_tokens_details: None,
            output_tokens_details: None,
        }
    }

    #[must_use]
    pub fn cached_tokens(&self) -> u64 {
        self.input_tokens_details
            .as_ref()
            .map_or(0, |d| d.cached_tokens)
    }

    #[must_use]
    pub fn reasoning_tokens(&self) -> u64 {
        self.output_tokens_details
            .as_ref()
            .map_or(0, |d| d.reasoning_tokens)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTokensDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cached_tokens: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTokensDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message(MessageItem),
    Reasoning(ReasoningItem),
    FileSearchCall(FileSearchCall),
    WebSearchCall(WebSearchCall),
    FunctionCall(FunctionCall),
    CodeInterpreterCall(CodeInterpreterCall),
    ImageGenerationCall(ImageGenerationCall),
    McpCall(McpCall),
    #[serde(other)]
    Unsupported,
}

impl OutputItem {
    #[must_use]
    pub fn placeholder_message(id: impl Into<String>) -> Self {
        Self::Message(MessageItem::new(id))
    }

    #[must_use]
    pub fn placeholder_reasoning(id: impl Into<String>) -> Self {
        Self::Reasoning(ReasoningItem {
            id: id.into(),
            summary: Vec::new(),
            status: ItemStatus::InProgress,
        })
    }

    /// The message in this slot. Any other item is replaced by an empty
    /// message with `id` first.
    pub fn message_or_placeholder(&mut self, id: &str) -> &mut MessageItem {
        match self {
            Self::Message(message) => message,
            other => {
                *other = Self::placeholder_message(id);
                other.message_or_placeholder(id)
            }
        }
    }

    pub fn reasoning_or_placeholder(&mut self, id: &str) -> &mut ReasoningItem {
        match self {
            Self::Reasoning(reasoning) => reasoning,
            other => {
                *other = Self::placeholder_reasoning(id);
                other.reasoning_or_placeholder(id)
            }
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Message(item) => Some(&item.id),
            Self::Reasoning(item) => Some(&item.id),
            Self::FileSearchCall(item) => Some(&item.id),
            Self::WebSearchCall(item) => Some(&item.id),
            Self::FunctionCall(item) => Some(&item.id),
            Self::CodeInterpreterCall(item) => Some(&item.id),
            Self::ImageGenerationCall(item) => Some(&item.id),
            Self::McpCall(item) => Some(&item.id),
            Self::Unsupported => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<ItemStatus> {
        match self {
            Self::Message(item) => Some(item.status),
            Self::Reasoning(item) => Some(item.status),
            Self::FileSearchCall(item) => Some(item.status),
            Self::WebSearchCall(item) => Some(item.status),
            Self::FunctionCall(item) => Some(item.status),
            Self::CodeInterpreterCall(item) => Some(item.status),
            Self::ImageGenerationCall(item) => Some(item.status),
            Self::McpCall(item) => Some(item.status),
            Self::Unsupported => None,
        }
    }

    /// Overwrites only the status field. Returns `false` for items that
    /// carry no status.
    pub fn set_status(&mut self, status: ItemStatus) -> bool {
        let slot = match self {
            Self::Message(item) => &mut item.status,
            Self::Reasoning(item) => &mut item.status,
            Self::FileSearchCall(item) => &mut item.status,
            Self::WebSearchCall(item) => &mut item.status,
            Self::FunctionCall(item) => &mut item.status,
            Self::CodeInterpreterCall(item) => &mut item.status,
            Self::ImageGenerationCall(item) => &mut item.status,
            Self::McpCall(item) => &mut item.status,
            Self::Unsupported => return false,
        };
        *slot = status;
        true
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Reasoning(_) => "reasoning",
            Self::FileSearchCall(_) => "file_search_call",
            Self::WebSearchCall(_) => "web_search_call",
            Self::FunctionCall(_) => "function_call",
            Self::CodeInterpreterCall(_) => "code_interpreter_call",
            Self::ImageGenerationCall(_) => "image_generation_call",
            Self::McpCall(_) => "mcp_call",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageItem {
    pub id: String,
    #[serde(default = "default_role", deserialize_with = "role_or_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentPart>,
}

fn default_role() -> String {
    "assistant".to_string()
}

fn role_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_role))
}

impl MessageItem {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: default_role(),
            status: ItemStatus::InProgress,
            content: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPart) -> Self {
        self.content.push(ContentPart::OutputText(text));
        self
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::OutputText(text) => Some(text.text.as_str()),
                ContentPart::Refusal { refusal } => Some(refusal.as_str()),
                ContentPart::Unsupported => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText(TextPart),
    Refusal {
        refusal: String,
    },
    #[serde(other)]
    Unsupported,
}

impl ContentPart {
    /// The text in this part, replacing a refusal or unknown part with empty
    /// output text.
    pub fn output_text_or_default(&mut self) -> &mut TextPart {
        match self {
            Self::OutputText(text) => text,
            other => {
                *other = Self::OutputText(TextPart::default());
                other.output_text_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<Annotation>,
}

impl TextPart {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, source: AnnotationSource) -> Self {
        self.annotations.push(Annotation::new(source));
        self
    }
}

/// A reference from generated text to its source, plus the numbered
/// citation the client attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(flatten)]
    pub source: AnnotationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,
}

impl Annotation {
    #[must_use]
    pub const fn new(source: AnnotationSource) -> Self {
        Self {
            source,
            citation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationSource {
    FileCitation {
        file_id: String,
        #[serde(default, deserialize_with = "null_as_default")]
        index: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    UrlCitation {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        start_index: u32,
        #[serde(default, deserialize_with = "null_as_default")]
        end_index: u32,
    },
    ContainerFileCitation {
        container_id: String,
        file_id: String,
        #[serde(default, deserialize_with = "null_as_default")]
        start_index: u32,
        #[serde(default, deserialize_with = "null_as_default")]
        end_index: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    FilePath {
        file_id: String,
        #[serde(default, deserialize_with = "null_as_default")]
        index: u32,
    },
    #[serde(other)]
    Unsupported,
}

impl AnnotationSource {
    #[must_use]
    pub fn file_citation(file_id: impl Into<String>, index: u32) -> Self {
        Self::FileCitation {
            file_id: file_id.into(),
            index,
            filename: None,
        }
    }

    #[must_use]
    pub fn url_citation(url: impl Into<String>, title: Option<String>) -> Self {
        Self::UrlCitation {
            url: url.into(),
            title,
            start_index: 0,
            end_index: 0,
        }
    }

    #[must_use]
    pub fn source_key(&self) -> Option<SourceKey> {
        match self {
            Self::FileCitation { file_id, index, .. } | Self::FilePath { file_id, index } => {
                Some(SourceKey::File {
                    file_id: file_id.clone(),
                    index: *index,
                })
            }
            Self::ContainerFileCitation {
                file_id,
                start_index,
                ..
            } => Some(SourceKey::File {
                file_id: file_id.clone(),
                index: *start_index,
            }),
            Self::UrlCitation { url, .. } => Some(SourceKey::Url { url: url.clone() }),
            Self::Unsupported => None,
        }
    }

    /// Character offset in the text where the citation marker belongs.
    #[must_use]
    pub const fn position(&self) -> Option<u32> {
        match self {
            Self::FileCitation { index, .. } | Self::FilePath { index, .. } => Some(*index),
            Self::UrlCitation { end_index, .. } | Self::ContainerFileCitation { end_index, .. } => {
                Some(*end_index)
            }
            Self::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKey {
    File { file_id: String, index: u32 },
    Url { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub display_number: u32,
    pub source_key: SourceKey,
    pub label: String,
}

impl Citation {
    #[must_use]
    pub fn marker(&self) -> String {
        format!("[{}]", self.display_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningItem {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Vec<SummaryText>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
}

impl ReasoningItem {
    #[must_use]
    pub fn text(&self) -> String {
        self.summary
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryText {
    #[serde(rename = "type", default = "summary_text_kind")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

fn summary_text_kind() -> String {
    "summary_text".to_string()
}

impl SummaryText {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: summary_text_kind(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub queries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<FileSearchResult>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchResult {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<WebSearchAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchAction {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sources: Vec<WebSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub call_id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<CodeOutput>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodeOutput {
    Logs {
        logs: String,
    },
    Image {
        url: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpCall {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub server_label: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_nulls_read_as_defaults() {
        let json = r#"{
            "id": "resp_1",
            "status": null,
            "model": null,
            "output": [
                {"type": "web_search_call", "id": "ws_1", "status": "completed",
                 "action": {"type": "search", "query": "q", "sources": null}},
                {"type": "file_search_call", "id": "fs_1", "status": null, "queries": null},
                {"type": "reasoning", "id": "rs_1", "summary": null},
                {"type": "function_call", "id": "fc_1", "name": "lookup", "call_id": null, "arguments": null},
                {"type": "message", "id": "msg_1", "role": null, "content": [
                    {"type": "output_text", "text": "hi", "annotations": null}
                ]},
                {"type": "message", "id": "msg_2", "content": null}
            ]
        }"#;

        let response: Response = serde_json::from_str(json).expect("deserialize");

        assert_eq!(response.status, ResponseStatus::Created);
        assert!(response.model.is_empty());
        let OutputItem::WebSearchCall(search) = &response.output[0] else {
            panic!("Expected web search");
        };
        assert!(search.action.as_ref().is_some_and(|a| a.sources.is_empty()));
        assert_eq!(response.output[1].status(), Some(ItemStatus::InProgress));
        let OutputItem::Message(message) = &response.output[4] else {
            panic!("Expected message");
        };
        assert_eq!(message.role, "assistant");
        assert_eq!(response.output_text(), "hi\n\n");
    }

    #[test]
    fn placeholder_accessors_replace_other_items() {
        let mut item = OutputItem::Unsupported;
        item.message_or_placeholder("msg_1")
            .content
            .push(ContentPart::OutputText(TextPart::new("x")));
        assert_eq!(item.id(), Some("msg_1"));

        let mut item = OutputItem::placeholder_message("msg_1");
        item.reasoning_or_placeholder("rs_1")
            .summary
            .push(SummaryText::new("thinking"));
        assert!(matches!(&item, OutputItem::Reasoning(r) if r.text() == "thinking"));

        let mut part = ContentPart::Refusal {
            refusal: "no".into(),
        };
        part.output_text_or_default().text.push_str("yes");
        assert_eq!(part, ContentPart::OutputText(TextPart::new("yes")));
    }

    #[test]
    fn deserializes_message_with_annotations() {
        let json = r#"{
            "id": "resp_1",
            "status": "completed",
            "model": "gpt-4o",
            "output": [{
                "type": "message",
                "id": "msg_1",
                "role": "assistant",
                "status": "completed",
                "content": [{
                    "type": "output_text",
                    "text": "Refunds are allowed.",
                    "annotations": [
                        {"type": "file_citation", "file_id": "file-1", "index": 7, "filename": "policy.pdf"},
                        {"type": "url_citation", "url": "https://example.com", "title": "Example", "start_index": 0, "end_index": 7}
                    ]
                }]
            }],
            "usage": {"input_tokens": 10, "output_tokens": 5, "total_tokens": 15},
            "error": null
        }"#;

        let response: Response = serde_json::from_str(json).expect("deserialize");

        assert_eq!(response.status, ResponseStatus::Completed);
        assert_eq!(response.output_text(), "Refunds are allowed.");
        let OutputItem::Message(message) = &response.output[0] else {
            panic!("Expected message");
        };
        let ContentPart::OutputText(part) = &message.content[0] else {
            panic!("Expected output text");
        };
        assert_eq!(part.annotations.len(), 2);
        assert!(matches!(
            &part.annotations[0].source,
            AnnotationSource::FileCitation { index: 7, .. }
        ));
        assert!(response.error.is_none());
    }

    #[test]
    fn unknown_item_type_does_not_fail_snapshot() {
        let json = r#"{
            "id": "resp_1",
            "status": "in_progress",
            "output": [
                {"type": "computer_call", "id": "cu_1", "status": "in_progress"},
                {"type": "file_search_call", "id": "fs_1", "status": "searching", "queries": ["refund"]}
            ]
        }"#;

        let response: Response = serde_json::from_str(json).expect("deserialize");

        assert_eq!(response.output.len(), 2);
        assert_eq!(response.output[0], OutputItem::Unsupported);
        assert_eq!(response.output[1].status(), Some(ItemStatus::Searching));
    }

    #[test]
    fn unknown_item_status_maps_to_unknown() {
        let json = r#"{"type": "web_search_call", "id": "ws_1", "status": "teleporting"}"#;
        let item: OutputItem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(item.status(), Some(ItemStatus::Unknown));
    }

    #[test]
    fn set_status_leaves_other_fields() {
        let mut item = OutputItem::FileSearchCall(FileSearchCall {
            id: "fs_1".into(),
            status: ItemStatus::InProgress,
            queries: vec!["refund".into()],
            results: None,
        });

        assert!(item.set_status(ItemStatus::Completed));

        let OutputItem::FileSearchCall(call) = &item else {
            panic!("Expected file search call");
        };
        assert_eq!(call.status, ItemStatus::Completed);
        assert_eq!(call.queries, vec!["refund".to_string()]);
        assert!(!OutputItem::Unsupported.set_status(ItemStatus::Completed));
    }

    #[test]
    fn annotation_serializes_inline_with_citation() {
        let mut annotation = Annotation::new(AnnotationSource::file_citation("f1", 3));
        annotation.citation = Some(Citation {
            display_number: 1,
            source_key: SourceKey::File {
                file_id: "f1".into(),
                index: 3,
            },
            label: "[1] f1".into(),
        });

        let value = serde_json::to_value(&annotation).expect("serialize");

        assert_eq!(value["type"], "file_citation");
        assert_eq!(value["file_id"], "f1");
        assert_eq!(value["citation"]["display_number"], 1);
    }

    #[test]
    fn source_keys() {
        assert_eq!(
            AnnotationSource::file_citation("f1", 3).source_key(),
            Some(SourceKey::File {
                file_id: "f1".into(),
                index: 3
            })
        );
        assert_eq!(
            AnnotationSource::url_citation("https://a.example", None).source_key(),
            Some(SourceKey::Url {
                url: "https://a.example".into()
            })
        );
        assert_eq!(AnnotationSource::Unsupported.source_key(), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(ResponseStatus::Completed.is_terminal());
        assert!(ResponseStatus::Failed.is_terminal());
        assert!(ResponseStatus::Incomplete.is_terminal());
        assert!(!ResponseStatus::InProgress.is_terminal());
        assert!(!ResponseStatus::Created.is_terminal());
    }

    #[test]
    fn usage_details() {
        let json = r#"{"input_tokens": 100, "output_tokens": 40, "total_tokens": 140,
            "input_tokens_details": {"cached_tokens": 64},
            "output_tokens_details": {"reasoning_tokens": 12}}"#;
        let usage: Usage = serde_json::from_str(json).expect("deserialize");
        assert_eq!(usage.cached_tokens(), 64);
        assert_eq!(usage.reasoning_tokens(), 12);
        assert_eq!(Usage::new(3, 4).total_tokens, 7);
    }
}
