pub mod completion;
pub mod question;
pub mod sentinel;
pub mod style;

pub use completion::{
    ChatMessage, CompletionPayload, CompletionRequest, Role, WireChoice, WireMessage, WireResponse,
};
pub use question::{AnswerRecord, BatchResult, Question};
pub use style::AnswerStyle;
