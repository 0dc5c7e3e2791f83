pub mod completion_client;
pub mod json_payload;
pub mod llm_client;

pub use completion_client::CompletionClient;
pub use json_payload::extract_json_object;
pub use llm_client::LlmClient;
