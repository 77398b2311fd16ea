pub mod events;
pub mod request;
pub mod types;

pub use events::{
    DecodeError, DecodedEvent, DeltaTarget, ItemProgress, TextDelta, TextDone, decode,
    decode_frame,
};
pub use request::{ResponseRequest, ToolSpec};
pub use types::{
    Annotation, AnnotationSource, Citation, ContentPart, ItemStatus, MessageItem, OutputItem,
    Response, ResponseError, ResponseStatus, SourceKey, TextPart, Usage,
};
