use std::collections::HashMap;

use crate::protocol::types::{
    AnnotationSource, Citation, ContentPart, ItemStatus, OutputItem, Response, SourceKey,
};

/// Turn-scoped numbering of citation sources. A source keeps the number it
/// was first given for as long as the registry lives.
#[derive(Debug, Default, Clone)]
pub struct CitationRegistry {
    numbers: HashMap<SourceKey, u32>,
    file_names: HashMap<String, String>,
}

impl CitationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    #[must_use]
    pub fn number_for(&self, key: &SourceKey) -> Option<u32> {
        self.numbers.get(key).copied()
    }

    #[must_use]
    pub fn filename(&self, file_id: &str) -> Option<&str> {
        self.file_names.get(file_id).map(String::as_str)
    }

    fn assign(&mut self, key: SourceKey) -> u32 {
        let next = self.numbers.len() as u32 + 1;
        *self.numbers.entry(key).or_insert(next)
    }

    fn learn_file_names(&mut self, response: &Response) {
        for item in &response.output {
            let OutputItem::FileSearchCall(call) = item else {
                continue;
            };
            if call.status != ItemStatus::Completed {
                continue;
            }
            for result in call.results.iter().flatten() {
                if let Some(name) = result.filename.as_deref().filter(|n| !n.is_empty()) {
                    self.file_names
                        .entry(result.file_id.clone())
                        .or_insert_with(|| name.to_string());
                }
            }
        }
    }

    fn title_for(&self, source: &AnnotationSource) -> String {
        match source {
            AnnotationSource::FileCitation {
                file_id, filename, ..
            }
            | AnnotationSource::ContainerFileCitation {
                file_id, filename, ..
            } => filename
                .as_deref()
                .filter(|n| !n.is_empty())
                .or_else(|| self.filename(file_id))
                .unwrap_or(file_id.as_str())
                .to_string(),
            AnnotationSource::FilePath { file_id, .. } => {
                self.filename(file_id).unwrap_or(file_id.as_str()).to_string()
            }
            AnnotationSource::UrlCitation { url, title, .. } => title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(url.as_str())
                .to_string(),
            AnnotationSource::Unsupported => String::new(),
        }
    }

    /// Numbers every annotation in `response` and writes its label.
    ///
    /// Sources are numbered in first-seen order (message order, then part
    /// order, then annotation order) starting at 1. Running this again on the
    /// same response leaves it unchanged.
    pub fn install(&mut self, response: &mut Response) {
        self.learn_file_names(response);

        for item in &mut response.output {
            let OutputItem::Message(message) = item else {
                continue;
            };
            for part in &mut message.content {
                let ContentPart::OutputText(text) = part else {
                    continue;
                };
                for annotation in &mut text.annotations {
                    let Some(key) = annotation.source.source_key() else {
                        annotation.citation = None;
                        continue;
                    };
                    let display_number = self.assign(key.clone());
                    let title = self.title_for(&annotation.source);
                    annotation.citation = Some(Citation {
                        display_number,
                        source_key: key,
                        label: format!("[{display_number}] {title}"),
                    });
                }
            }
        }
    }
}

/// Free-function form of [`CitationRegistry::install`].
pub fn install(response: &mut Response, registry: &mut CitationRegistry) {
    registry.install(response);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{
        FileSearchCall, FileSearchResult, MessageItem, ResponseStatus, TextPart,
    };

    fn message(id: &str, part: TextPart) -> OutputItem {
        OutputItem::Message(MessageItem::new(id).with_text(part))
    }

    fn labels(response: &Response) -> Vec<String> {
        response
            .citations()
            .into_iter()
            .map(|c| c.label.clone())
            .collect()
    }

    #[test]
    fn numbers_sources_in_first_seen_order() {
        let mut response = Response::new("resp_1", ResponseStatus::Completed).with_output(vec![
            message(
                "msg_1",
                TextPart::new("a b c")
                    .with_annotation(AnnotationSource::file_citation("f2", 1))
                    .with_annotation(AnnotationSource::url_citation(
                        "https://example.com",
                        Some("Example".into()),
                    ))
                    .with_annotation(AnnotationSource::file_citation("f2", 1)),
            ),
        ]);
        let mut registry = CitationRegistry::new();

        registry.install(&mut response);

        assert_eq!(registry.len(), 2);
        assert_eq!(labels(&response), vec!["[1] f2", "[2] Example"]);
    }

    #[test]
    fn same_file_different_position_is_a_different_source() {
        let mut response = Response::new("resp_1", ResponseStatus::Completed).with_output(vec![
            message(
                "msg_1",
                TextPart::new("x")
                    .with_annotation(AnnotationSource::file_citation("f1", 3))
                    .with_annotation(AnnotationSource::file_citation("f1", 9)),
            ),
        ]);
        let mut registry = CitationRegistry::new();

        install(&mut response, &mut registry);

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn install_is_idempotent() {
        let mut response = Response::new("resp_1", ResponseStatus::Completed).with_output(vec![
            message(
                "msg_1",
                TextPart::new("x").with_annotation(AnnotationSource::file_citation("f1", 3)),
            ),
        ]);
        let mut registry = CitationRegistry::new();

        registry.install(&mut response);
        let once = response.clone();
        registry.install(&mut response);

        assert_eq!(response, once);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn filenames_come_from_completed_file_search_results() {
        let search = |status| {
            OutputItem::FileSearchCall(FileSearchCall {
                id: "fs_1".into(),
                status,
                queries: vec!["refund".into()],
                results: Some(vec![FileSearchResult {
                    file_id: "f1".into(),
                    filename: Some("refund-policy.pdf".into()),
                    score: Some(0.9),
                    text: None,
                }]),
            })
        };
        let cited = message(
            "msg_1",
            TextPart::new("x").with_annotation(AnnotationSource::file_citation("f1", 3)),
        );

        let mut pending = Response::new("resp_1", ResponseStatus::InProgress)
            .with_output(vec![search(ItemStatus::Searching), cited.clone()]);
        let mut registry = CitationRegistry::new();
        registry.install(&mut pending);
        assert_eq!(labels(&pending), vec!["[1] f1"]);

        let mut done = Response::new("resp_1", ResponseStatus::Completed)
            .with_output(vec![search(ItemStatus::Completed), cited]);
        registry.install(&mut done);
        assert_eq!(labels(&done), vec!["[1] refund-policy.pdf"]);
        assert_eq!(registry.filename("f1"), Some("refund-policy.pdf"));
    }

    #[test]
    fn unsupported_annotations_get_no_citation() {
        let mut response = Response::new("resp_1", ResponseStatus::Completed).with_output(vec![
            message(
                "msg_1",
                TextPart::new("x").with_annotation(AnnotationSource::Unsupported),
            ),
        ]);
        let mut registry = CitationRegistry::new();

        registry.install(&mut response);

        assert!(registry.is_empty());
        assert!(response.citations().is_empty());
    }
}
