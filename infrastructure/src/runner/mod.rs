//! Code runners implementing the code runner port.

mod local_command;

pub use local_command::LocalCommandRunner;
