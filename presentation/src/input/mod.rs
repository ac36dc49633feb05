//! Human input adapters.

mod stdin;

pub use stdin::StdinHumanInput;
