//! Output Rendering
//!
//! Renders per-target batch outcomes as text or JSON.

use crate::application::{BatchSummary, TargetOutcome};
use crate::domain::value_objects::{DirectoryListing, EntryKind, MessageCategory, OperationKind};

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

/// Icons for output rendering
struct Icons {
    check: &'static str,
    cross: &'static str,
    skip: &'static str,
    warn: &'static str,
    dir: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            skip: "○",
            warn: "!",
            dir: "▸",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            skip: "[ ]",
            warn: "[!]",
            dir: "[DIR]",
        }
    }
}

/// Renders the outcomes of one operation across its targets
pub trait OutcomeRenderer {
    fn render(&self, operation: OperationKind, outcomes: &[TargetOutcome]) -> String;

    fn render_listing(&self, target: &str, listing: &DirectoryListing) -> String;
}

/// Text renderer
pub struct TextRenderer {
    pub unicode: bool,
    /// Verbosity level
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    fn render_summary(&self, out: &mut Vec<String>, summary: &BatchSummary, icons: &Icons) {
        out.push(format!(
            "    {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped
        ));
        for (path, message) in &summary.errors {
            out.push(format!("    {} {}: {}", icons.cross, path.display(), message));
        }
        for message in &summary.report.messages {
            if message.category == MessageCategory::Warning || self.verbose > 0 {
                out.push(format!(
                    "    {} {} {}: {}",
                    icons.warn,
                    message.compiler,
                    message.file.display(),
                    message.message
                ));
            }
        }
        if summary.skipped > 0 && self.verbose > 0 {
            out.push(format!("    {} cancelled before completion", icons.skip));
        }
    }
}

impl OutcomeRenderer for TextRenderer {
    fn render(&self, operation: OperationKind, outcomes: &[TargetOutcome]) -> String {
        let icons = self.icons();
        if outcomes.is_empty() {
            return format!("{} No target applies", icons.skip);
        }

        let mut out = Vec::new();
        for outcome in outcomes {
            match &outcome.result {
                Ok(summary) => {
                    let icon = if summary.is_success() {
                        icons.check
                    } else {
                        icons.cross
                    };
                    out.push(format!("{} {} {}", icon, operation, outcome.target));
                    self.render_summary(&mut out, summary, &icons);
                }
                Err(e) => {
                    out.push(format!("{} {} {}", icons.cross, operation, outcome.target));
                    out.push(format!("    {}", e));
                }
            }
        }
        out.join("\n")
    }

    fn render_listing(&self, target: &str, listing: &DirectoryListing) -> String {
        let icons = self.icons();
        let mut out = vec![format!("{}:{}", target, listing.dir)];
        for entry in &listing.entries {
            let line = match entry.kind {
                EntryKind::Directory => format!("  {} {}/", icons.dir, entry.name),
                EntryKind::File if self.verbose > 0 => {
                    format!("    {} ({} bytes)", entry.name, entry.size)
                }
                EntryKind::File => format!("    {}", entry.name),
                EntryKind::Other => format!("  {} {}", icons.skip, entry.name),
            };
            out.push(line);
        }
        out.join("\n")
    }
}

/// JSON renderer
pub struct JsonRenderer;

impl OutcomeRenderer for JsonRenderer {
    fn render(&self, operation: OperationKind, outcomes: &[TargetOutcome]) -> String {
        let targets: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(summary) => serde_json::json!({
                    "target": outcome.target,
                    "success": summary.is_success(),
                    "succeeded": summary.succeeded,
                    "failed": summary.failed,
                    "skipped": summary.skipped,
                    "errors": summary.errors.iter().map(|(path, message)| serde_json::json!({
                        "path": path.display().to_string(),
                        "message": message,
                    })).collect::<Vec<_>>(),
                    "messages": summary.report.messages,
                }),
                Err(e) => serde_json::json!({
                    "target": outcome.target,
                    "success": false,
                    "error": e.to_string(),
                }),
            })
            .collect();

        let json = serde_json::json!({
            "operation": operation,
            "success": outcomes.iter().all(TargetOutcome::is_success),
            "targets": targets,
        });
        serde_json::to_string_pretty(&json).unwrap_or_default()
    }

    fn render_listing(&self, target: &str, listing: &DirectoryListing) -> String {
        let entries: Vec<serde_json::Value> = listing
            .entries
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "name": entry.name,
                    "path": entry.path,
                    "kind": match entry.kind {
                        EntryKind::Directory => "directory",
                        EntryKind::File => "file",
                        EntryKind::Other => "other",
                    },
                    "size": entry.size,
                    "modified": entry.modified,
                })
            })
            .collect();
        let json = serde_json::json!({
            "target": target,
            "dir": listing.dir,
            "entries": entries,
        });
        serde_json::to_string_pretty(&json).unwrap_or_default()
    }
}

/// Create a renderer based on format
pub fn create_renderer(format: OutputFormat, unicode: bool, verbose: u8) -> Box<dyn OutcomeRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer { unicode, verbose }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::DirectoryEntry;
    use crate::error::SyncError;
    use std::path::PathBuf;

    fn outcomes() -> Vec<TargetOutcome> {
        vec![
            TargetOutcome {
                target: "prod".into(),
                result: Ok(BatchSummary {
                    target: "prod".into(),
                    succeeded: 2,
                    failed: 1,
                    errors: vec![(PathBuf::from("/w/b.txt"), "denied".into())],
                    ..BatchSummary::default()
                }),
            },
            TargetOutcome {
                target: "ftp".into(),
                result: Err(SyncError::UnsupportedTargetType {
                    kind: "ftp".into(),
                    target: "ftp".into(),
                }),
            },
        ]
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn text_lists_failures_per_target() {
        let renderer = TextRenderer {
            unicode: false,
            verbose: 0,
        };
        let text = renderer.render(OperationKind::Upload, &outcomes());
        assert!(text.contains("[FAIL] upload prod"));
        assert!(text.contains("2 succeeded, 1 failed, 0 skipped"));
        assert!(text.contains("/w/b.txt: denied"));
        assert!(text.contains("unsupported target type 'ftp'"));
    }

    #[test]
    fn text_reports_no_target() {
        let text = TextRenderer::default().render(OperationKind::Upload, &[]);
        assert!(text.contains("No target applies"));
    }

    #[test]
    fn json_marks_overall_failure() {
        let json = JsonRenderer.render(OperationKind::Delete, &outcomes());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["operation"], "delete");
        assert_eq!(value["success"], false);
        assert_eq!(value["targets"][0]["failed"], 1);
        assert_eq!(value["targets"][1]["success"], false);
    }

    #[test]
    fn listing_marks_directories() {
        let listing = DirectoryListing {
            dir: "/".into(),
            entries: vec![
                DirectoryEntry::new("css", "/css", EntryKind::Directory),
                DirectoryEntry::new("index.html", "/index.html", EntryKind::File).with_size(12),
            ],
        };
        let text = TextRenderer {
            unicode: false,
            verbose: 1,
        }
        .render_listing("prod", &listing);
        assert!(text.contains("[DIR] css/"));
        assert!(text.contains("index.html (12 bytes)"));
    }
}
