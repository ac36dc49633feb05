//! LLM providers implementing the gateway port.

pub mod openai;

pub use openai::{OpenAiGateway, OpenAiSettings};
