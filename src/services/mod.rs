pub mod question_answerer;
pub mod question_extractor;
pub mod retry_policy;

pub use question_answerer::QuestionAnswerer;
pub use question_extractor::{AiExtractor, HeuristicExtractor, QuestionExtractor};
pub use retry_policy::RetryPolicy;
