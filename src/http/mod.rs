//! Envelope types exchanged with remote functions.

mod request;
mod response;

pub use request::RequestEnvelope;
pub use response::{text_response, ReplyEnvelope, ReplyMeta, DEFAULT_CONTENT_TYPE};
