use std::path::PathBuf;

use arvid_config::Config;

/// Per-invocation execution context, owned by the caller and passed by
/// reference into every tool call.  Never persisted by the core.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Absolute sandbox boundary for all filesystem tools.  `None` means the
    /// file tools refuse to run (with a structured error, not a panic).
    pub workspace_root: Option<PathBuf>,
    /// Skip human approval: edits execute immediately, commands execute when
    /// they pass the static safety filter.
    pub autonomous: bool,
    /// Inject workspace listing + quick search hits into the system prompt.
    pub inject_search_context: bool,
    /// Gate for the external code-index tools.
    pub code_index_enabled: bool,
    /// Directory the code-index CLI runs in.  The tools are only registered
    /// when this points at an existing directory.
    pub code_index_workspace: Option<PathBuf>,
    /// Wall-clock budget for one approved terminal command.
    pub command_timeout_secs: u64,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            workspace_root: None,
            autonomous: false,
            inject_search_context: true,
            code_index_enabled: true,
            code_index_workspace: None,
            command_timeout_secs: 60,
        }
    }
}

impl ExecutionContext {
    /// Build a context from loaded configuration; CLI flags layer on top.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            workspace_root: None,
            autonomous: false,
            inject_search_context: cfg.agent.inject_search_context,
            code_index_enabled: cfg.tools.code_index_enabled,
            code_index_workspace: cfg.tools.code_index_workspace.as_ref().map(PathBuf::from),
            command_timeout_secs: cfg.tools.command_timeout_secs,
        }
    }

    pub fn with_workspace(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn autonomous(mut self, yes: bool) -> Self {
        self.autonomous = yes;
        self
    }
}
