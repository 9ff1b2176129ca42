// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use crate::builtin::code_index;
use crate::{ExecutionContext, ToolKind, ToolSpec};

/// Compose the tool set for one loop invocation.
///
/// A pure function of the context: the same context always yields the same
/// list, unaffected by loop state.  The optional code-index tools appear only
/// when their integration is enabled and its workspace exists.
pub fn build_tools(ctx: &ExecutionContext) -> Vec<ToolSpec> {
    let mut tools = vec![
        ToolSpec::new(ToolKind::SuggestQuestions),
        ToolSpec::new(ToolKind::GenerateApp),
        ToolSpec::new(ToolKind::ReadFile),
        ToolSpec::new(ToolKind::ListDir),
        ToolSpec::new(ToolKind::SearchFiles),
        ToolSpec::new(ToolKind::EditFile),
        ToolSpec::new(ToolKind::RunTerminal),
    ];
    if code_index::enabled(ctx) {
        tools.push(ToolSpec::new(ToolKind::SearchCode));
        tools.push(ToolSpec::new(ToolKind::AnalyzeCode));
    }
    tools
}

/// Look a tool up by the name the model used.
pub fn find_tool<'a>(tools: &'a [ToolSpec], name: &str) -> Option<&'a ToolSpec> {
    tools.iter().find(|t| t.name == name)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_registers_core_tools() {
        let tools = build_tools(&ExecutionContext::default());
        let names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        for expected in [
            "read_file",
            "list_dir",
            "search_files",
            "edit_file",
            "run_terminal",
            "suggest_questions",
            "generate_app",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn code_index_tools_absent_without_workspace() {
        let tools = build_tools(&ExecutionContext::default());
        let names: Vec<&str> = tools.iter().map(|t| t.name).collect();
        assert!(!names.contains(&"search_code"));
        assert!(!names.contains(&"analyze_code"));
    }

    #[test]
    fn code_index_tools_present_with_existing_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext {
            code_index_workspace: Some(dir.path().to_path_buf()),
            ..ExecutionContext::default()
        };
        let names: Vec<&str> = build_tools(&ctx).iter().map(|t| t.name).collect();
        assert!(names.contains(&"search_code"));
        assert!(names.contains(&"analyze_code"));
    }

    #[test]
    fn code_index_tools_absent_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext {
            code_index_enabled: false,
            code_index_workspace: Some(dir.path().to_path_buf()),
            ..ExecutionContext::default()
        };
        let names: Vec<&str> = build_tools(&ctx).iter().map(|t| t.name).collect();
        assert!(!names.contains(&"search_code"));
    }

    #[test]
    fn find_tool_matches_exact_name() {
        let tools = build_tools(&ExecutionContext::default());
        assert!(find_tool(&tools, "edit_file").is_some());
        assert!(find_tool(&tools, "no_such_tool").is_none());
    }

    #[test]
    fn descriptions_are_nonempty() {
        for t in build_tools(&ExecutionContext::default()) {
            assert!(!t.description.is_empty(), "{} has no description", t.name);
        }
    }
}
