use std::io::Write;

use crate::protocol::Response;

use super::{RenderError, Renderer};

/// JSON output of the Response shape. By default the final Response is
/// written pretty-printed at `finalize`; with `json_lines` every update is
/// written as one compact line instead.
pub struct JsonRenderer<W: Write + Send> {
    out: W,
    json_lines: bool,
    latest: Option<Response>,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub const fn new(out: W, json_lines: bool) -> Self {
        Self {
            out,
            json_lines,
            latest: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&mut self, response: &Response) -> Result<(), RenderError> {
        if self.json_lines {
            serde_json::to_writer(&mut self.out, response)?;
            writeln!(self.out)?;
            self.out.flush()?;
        } else {
            self.latest = Some(response.clone());
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), RenderError> {
        if let Some(response) = self.latest.take() {
            serde_json::to_writer_pretty(&mut self.out, &response)?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{
        AnnotationSource, MessageItem, OutputItem, ResponseStatus, TextPart, Usage,
    };

    fn response(status: ResponseStatus) -> Response {
        let mut response = Response::new("resp_1", status).with_output(vec![OutputItem::Message(
            MessageItem::new("msg_1").with_text(
                TextPart::new("Refunds are allowed.")
                    .with_annotation(AnnotationSource::file_citation("f1", 3)),
            ),
        )]);
        response.usage = Some(Usage::new(10, 5));
        response
    }

    #[test]
    fn finalize_writes_pretty_final_response() {
        let mut renderer = JsonRenderer::new(Vec::new(), false);
        renderer.render(&response(ResponseStatus::InProgress)).expect("render");
        renderer.render(&response(ResponseStatus::Completed)).expect("render");
        renderer.finalize().expect("finalize");

        let out = renderer.into_inner();
        let value: serde_json::Value = serde_json::from_slice(&out).expect("json");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["output"][0]["type"], "message");
        assert_eq!(
            value["output"][0]["content"][0]["annotations"][0]["type"],
            "file_citation"
        );
        assert_eq!(value["usage"]["total_tokens"], 15);
    }

    #[test]
    fn json_lines_writes_every_update() {
        let mut renderer = JsonRenderer::new(Vec::new(), true);
        renderer.render(&response(ResponseStatus::InProgress)).expect("render");
        renderer.render(&response(ResponseStatus::Completed)).expect("render");
        renderer.finalize().expect("finalize");

        let out = String::from_utf8(renderer.into_inner()).expect("utf8");
        let statuses: Vec<String> = out
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).expect("json line");
                value["status"].as_str().unwrap_or_default().to_string()
            })
            .collect();
        assert_eq!(statuses, vec!["in_progress", "completed"]);
    }
}
