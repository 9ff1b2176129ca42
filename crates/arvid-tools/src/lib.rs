mod context;
mod registry;
mod safety;
mod sandbox;
mod tool;

pub mod builtin;

pub use context::ExecutionContext;
pub use registry::{build_tools, find_tool};
pub use safety::is_blocked;
pub use sandbox::resolve;
pub use tool::{PendingApproval, ToolInvocation, ToolKind, ToolResult, ToolSpec};
