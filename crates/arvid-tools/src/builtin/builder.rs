// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The two app-builder helper tools.
//!
//! The builder feature itself (conversation → spec → generated files) lives
//! outside the kernel; these handlers are its deterministic template path so
//! the registry can always offer them.  Both are pure functions of the
//! transcript.

use arvid_model::{Message, Role};
use serde::Serialize;
use serde_json::json;

use crate::ToolResult;

// ─── suggest_questions ───────────────────────────────────────────────────────

const MAX_QUESTIONS: usize = 2;

/// Question bank: the first group whose keywords match the conversation wins;
/// the last group is the default.
const QUESTION_TEMPLATES: &[(&[&str], &[&str])] = &[
    (
        &["dashboard", "tracker", "notes", "todo", "habit", "reading", "list"],
        &[
            "What's the core problem this solves for you?",
            "Who will use this—just you or others too?",
            "Should it remember things between sessions (persistent) or session-only?",
        ],
    ),
    (
        &[],
        &[
            "What's the one thing it must do well?",
            "Minimal and focused UI, or rich with more features?",
            "Light mode, dark mode, or follow system preference?",
        ],
    ),
];

pub fn suggest_questions(transcript: &[Message]) -> ToolResult {
    if transcript_user_text(transcript).is_empty() {
        return ToolResult::Text(
            json!({
                "questions": [
                    "What's the core problem this app solves for you?",
                    "Who will use it—just you or others too?",
                ]
            })
            .to_string(),
        );
    }

    let all_text = transcript_user_text(transcript).to_lowercase();
    let questions = QUESTION_TEMPLATES
        .iter()
        .find(|(keywords, _)| keywords.is_empty() || keywords.iter().any(|k| all_text.contains(k)))
        .map(|(_, qs)| *qs)
        .unwrap_or(QUESTION_TEMPLATES[QUESTION_TEMPLATES.len() - 1].1);

    ToolResult::Text(
        json!({ "questions": questions.iter().take(MAX_QUESTIONS).collect::<Vec<_>>() }).to_string(),
    )
}

// ─── generate_app ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AppSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub features: Vec<String>,
    pub persistence: String,
    pub theme: String,
    pub ui_complexity: String,
}

pub fn generate_app(transcript: &[Message]) -> ToolResult {
    let spec = derive_spec(transcript);
    let files = render_files(&spec);
    let summary = conversation_summary(transcript, 500);
    let message = format!("Generated app '{}' with {} files.", spec.name, files.len());
    ToolResult::Text(
        json!({
            "spec": spec,
            "files": files.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            "summary": summary,
            "message": message,
        })
        .to_string(),
    )
}

fn transcript_user_text(transcript: &[Message]) -> String {
    transcript
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyword-derived project spec (name, type, features, persistence, theme).
pub fn derive_spec(transcript: &[Message]) -> AppSpec {
    let all_text = transcript_user_text(transcript).to_lowercase();

    let name = transcript
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| {
            let words: Vec<&str> = m
                .content
                .split_whitespace()
                .filter(|w| w.len() > 2)
                .take(2)
                .collect();
            if words.is_empty() {
                "MyApp".to_string()
            } else {
                words
                    .iter()
                    .map(|w| {
                        let mut cs = w.chars();
                        match cs.next() {
                            Some(first) => first.to_uppercase().collect::<String>() + cs.as_str(),
                            None => String::new(),
                        }
                    })
                    .collect()
            }
        })
        .unwrap_or_else(|| "MyApp".into());

    let type_hints: &[(&[&str], &str)] = &[
        (&["dashboard", "overview", "summary"], "dashboard"),
        (&["tracker", "tracking", "log", "habit", "streak"], "tracker"),
        (&["note", "notes", "writing", "memo"], "notes"),
        (&["todo", "task", "checklist", "to-do"], "todo"),
        (&["reading", "book", "library"], "library"),
    ];
    let app_type = type_hints
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| all_text.contains(k)))
        .map(|(_, t)| t.to_string())
        .unwrap_or_else(|| "app".into());

    let feature_hints: &[(&[&str], &str)] = &[
        (&["track", "tracking", "monitor"], "tracking"),
        (&["list", "collection", "organize"], "list management"),
        (&["remind", "notification", "alert"], "reminders"),
        (&["search", "find", "filter"], "search"),
        (&["chart", "graph", "visual", "stats"], "visualization"),
        (&["dark", "theme", "light mode"], "theming"),
        (&["export", "download", "backup"], "export"),
        (&["tag", "category", "label"], "categorization"),
        (&["streak", "habit", "daily"], "streaks"),
    ];
    let mut features: Vec<String> = feature_hints
        .iter()
        .filter(|(keys, _)| keys.iter().any(|k| all_text.contains(k)))
        .map(|(_, f)| f.to_string())
        .collect();
    if features.is_empty() {
        features = vec!["list management".into(), "tracking".into()];
    }

    let theme = if all_text.contains("light mode") || all_text.contains("light theme") {
        "light"
    } else if all_text.contains("system") || all_text.contains("preference") {
        "system"
    } else {
        "dark"
    };

    AppSpec {
        name,
        app_type,
        features,
        persistence: "localStorage".into(),
        theme: theme.into(),
        ui_complexity: "minimal".into(),
    }
}

/// Render the three-file template triple for a spec.
pub fn render_files(spec: &AppSpec) -> Vec<(String, String)> {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{name}</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body>
    <div class="app">
        <header class="header">
            <h1>{name}</h1>
            <p class="tagline">Built through conversation</p>
        </header>
        <main class="main">
            <section class="input-section">
                <input type="text" id="newItem" placeholder="Add new entry...">
                <button onclick="addItem()">Add</button>
            </section>
            <section class="content-section">
                <div id="itemList" class="item-list"></div>
            </section>
        </main>
    </div>
    <script src="app.js"></script>
</body>
</html>"#,
        name = spec.name
    );

    let css = "* { margin: 0; padding: 0; box-sizing: border-box; }\n\
:root { --bg: #0f0f14; --surface: #1a1a22; --text: #e8e8ed; --text-dim: #888899; --accent: #6366f1; }\n\
body { font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); min-height: 100vh; }\n\
.app { max-width: 600px; margin: 0 auto; padding: 40px 20px; }\n\
.header { text-align: center; margin-bottom: 40px; }\n\
.tagline { color: var(--text-dim); font-size: 14px; }\n\
.input-section { display: flex; gap: 12px; margin-bottom: 32px; }\n\
.input-section input { flex: 1; padding: 14px 18px; background: var(--surface); border: 1px solid rgba(255,255,255,0.1); border-radius: 10px; color: var(--text); }\n\
.input-section button { padding: 14px 24px; background: var(--accent); border: none; border-radius: 10px; color: white; font-weight: 600; cursor: pointer; }\n\
.item { padding: 16px 20px; background: var(--surface); border-radius: 12px; display: flex; justify-content: space-between; margin-bottom: 12px; }\n"
        .to_string();

    let key = format!("{}_data", spec.name.to_lowercase().replace(' ', "_"));
    let js = format!(
        r#"const APP_KEY = '{key}';
let items = [];
document.addEventListener('DOMContentLoaded', () => {{ loadData(); render(); }});
function loadData() {{ const s = localStorage.getItem(APP_KEY); if (s) items = JSON.parse(s); }}
function saveData() {{ localStorage.setItem(APP_KEY, JSON.stringify(items)); }}
function addItem() {{
  const input = document.getElementById('newItem');
  const text = input.value.trim();
  if (!text) return;
  items.unshift({{ id: Date.now(), text, createdAt: new Date().toISOString() }});
  input.value = ''; saveData(); render();
}}
function deleteItem(id) {{ items = items.filter(x => x.id !== id); saveData(); render(); }}
function render() {{
  const list = document.getElementById('itemList');
  list.innerHTML = items.map(i =>
    `<div class="item"><span>${{i.text}}</span>` +
    `<button onclick="deleteItem(${{i.id}})">×</button></div>`).join('');
}}
"#
    );

    vec![
        ("index.html".into(), html),
        ("styles.css".into(), css),
        ("app.js".into(), js),
    ]
}

/// Short summary of the conversation for storage.
pub fn conversation_summary(transcript: &[Message], max_len: usize) -> String {
    let parts: Vec<String> = transcript
        .iter()
        .take(5)
        .map(|m| m.content.chars().take(200).collect())
        .collect();
    let summary = parts.join(" | ");
    summary.chars().take(max_len).collect()
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
