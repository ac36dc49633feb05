//! Conversation history shared between the coordinator and its agents.

pub mod code_block;
pub mod history;
pub mod message;

pub use code_block::{CodeBlock, extract_code_blocks};
pub use history::ConversationHistory;
pub use message::{Message, MessageKind, since_last, transcript};
