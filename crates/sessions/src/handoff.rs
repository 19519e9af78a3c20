//! Handoff documents written when a session is paused or completed.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use sw_domain::error::Result;
use sw_domain::session::Session;
use sw_domain::trace::TraceEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffKind {
    Pause,
    Complete,
}

impl HandoffKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandoffKind::Pause => "pause",
            HandoffKind::Complete => "complete",
        }
    }
}

impl fmt::Display for HandoffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the Markdown handoff for `session`.
pub fn render(session: &Session, kind: HandoffKind, generated_at: DateTime<Local>) -> String {
    let mut lines = vec![
        format!("# Handoff: {}", session.process_name),
        String::new(),
        format!("**Session ID**: {}", session.id),
        format!("**Type**: {kind}"),
        format!("**State**: {}", session.state),
        format!("**Generated**: {}", generated_at.to_rfc3339()),
        String::new(),
        "## Current State".to_string(),
        String::new(),
        format!("Session is in state `{}`.", session.state),
        String::new(),
    ];

    let steps: Vec<&str> = session.steps().collect();
    push_section(&mut lines, "Steps Executed", &steps);

    let decisions: Vec<&str> = session.decisions().collect();
    push_section(&mut lines, "Decisions Recorded", &decisions);

    let required: Vec<&str> = session.required_artifacts.iter().map(String::as_str).collect();
    push_section(&mut lines, "Required Artifacts", &required);

    lines.push("## Next Steps".to_string());
    lines.push(String::new());
    match kind {
        HandoffKind::Pause => {
            lines.push(format!("- Resume the session with `stepwise resume {}`", session.id));
            lines.push("- Check pending artifacts".to_string());
        }
        HandoffKind::Complete => {
            lines.push("- Session finished".to_string());
            lines.push("- Review the produced artifacts".to_string());
        }
    }

    let mut doc = lines.join("\n");
    doc.push('\n');
    doc
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[&str]) {
    if items.is_empty() {
        return;
    }
    lines.push(format!("## {title}"));
    lines.push(String::new());
    lines.extend(items.iter().map(|item| format!("- {item}")));
    lines.push(String::new());
}

/// Write a handoff document into `dir`, named
/// `<session>_<kind>_<YYYYmmdd_HHMMSS>.md`. An existing file is never
/// replaced; a numeric suffix is added instead.
pub fn write(dir: &Path, session: &Session, kind: HandoffKind) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let now = Local::now();
    let stem = format!("{}_{}_{}", session.id, kind, now.format("%Y%m%d_%H%M%S"));
    let content = render(session, kind, now);

    let mut attempt = 0u32;
    let path = loop {
        let name = if attempt == 0 {
            format!("{stem}.md")
        } else {
            format!("{stem}_{attempt}.md")
        };
        let candidate = dir.join(name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut file) => {
                file.write_all(content.as_bytes())?;
                break candidate;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    };

    TraceEvent::HandoffWritten {
        session_id: session.id.clone(),
        handoff_type: kind.to_string(),
        path: path.display().to_string(),
    }
    .emit();

    Ok(path)
}
