//! External tool execution

mod subprocess;

pub use subprocess::{CommandResult, Invocation, SubprocessRunner, ToolRunner};
