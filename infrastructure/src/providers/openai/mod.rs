//! OpenAI-compatible chat completions provider

mod gateway;
mod session;
pub mod types;

pub use gateway::{OpenAiGateway, OpenAiSettings};
pub use session::OpenAiSession;
