use serde::{Deserialize, Serialize};

const FILE_SEARCH_RESULTS: &str = "file_search_call.results";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    pub stream: bool,
}

impl ResponseRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            instructions: None,
            tools: Vec::new(),
            previous_response_id: None,
            include: Vec::new(),
            stream: true,
        }
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Adds a tool. File search also asks the service to include its
    /// results, which is where cited filenames come from.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        if matches!(tool, ToolSpec::FileSearch { .. })
            && !self.include.iter().any(|i| i == FILE_SEARCH_RESULTS)
        {
            self.include.push(FILE_SEARCH_RESULTS.to_string());
        }
        self.tools.push(tool);
        self
    }

    #[must_use]
    pub fn with_previous_response_id(mut self, id: Option<String>) -> Self {
        self.previous_response_id = id.filter(|id| !id.is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    FileSearch {
        vector_store_ids: Vec<String>,
    },
    #[serde(rename = "web_search_preview")]
    WebSearch,
    CodeInterpreter {
        container: ContainerSpec,
    },
}

impl ToolSpec {
    #[must_use]
    pub const fn file_search(vector_store_ids: Vec<String>) -> Self {
        Self::FileSearch { vector_store_ids }
    }

    #[must_use]
    pub fn code_interpreter() -> Self {
        Self::CodeInterpreter {
            container: ContainerSpec::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            kind: "auto".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_minimal_request() {
        let request = ResponseRequest::new("gpt-4o", "hello");
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(
            value,
            serde_json::json!({"model": "gpt-4o", "input": "hello", "stream": true})
        );
    }

    #[test]
    fn file_search_adds_include_once() {
        let request = ResponseRequest::new("gpt-4o", "q")
            .with_tool(ToolSpec::file_search(vec!["vs_1".into()]))
            .with_tool(ToolSpec::file_search(vec!["vs_2".into()]))
            .with_tool(ToolSpec::WebSearch);

        assert_eq!(request.include, vec![FILE_SEARCH_RESULTS.to_string()]);

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["tools"][0]["type"], "file_search");
        assert_eq!(value["tools"][0]["vector_store_ids"][0], "vs_1");
        assert_eq!(value["tools"][2]["type"], "web_search_preview");
    }

    #[test]
    fn code_interpreter_uses_auto_container() {
        let value = serde_json::to_value(ToolSpec::code_interpreter()).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"type": "code_interpreter", "container": {"type": "auto"}})
        );
    }

    #[test]
    fn empty_previous_response_id_is_dropped() {
        let request =
            ResponseRequest::new("gpt-4o", "q").with_previous_response_id(Some(String::new()));
        assert!(request.previous_response_id.is_none());
    }
}
