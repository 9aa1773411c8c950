pub mod command;
pub mod orchestrator;

pub use command::{Command, Invocation, USAGE, UsageError};
pub use orchestrator::{execute, run};
