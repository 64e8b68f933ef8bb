pub mod forwarder;
pub mod llm;

pub use forwarder::ForwarderClient;
pub use llm::{CompletionError, CompletionMessage, CompletionProvider, Role};
