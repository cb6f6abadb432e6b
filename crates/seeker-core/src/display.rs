//! Display formatting for plans, results, and clarification prompts.
//!
//! Domain models carry direct `Display` implementations; wrapper types cover
//! the cases where the same data needs context-specific formatting (a raw
//! backend document, a final result set). All output is markdown so it
//! renders cleanly in a terminal and over MCP alike.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};
use serde_json::Value;

use crate::models::{ClarificationRequest, Documents, ExecutionState, Plan, Step};

/// A wrapper around `Timestamp` that provides system timezone formatting via
/// the `Display` trait.
///
/// The display format follows the pattern: `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.index, self.description)?;
        if let Some(dep) = self.depends_on {
            write!(f, " (uses step {dep})")?;
        }
        Ok(())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan ({}): {}", self.kind, self.rationale)?;
        for step in &self.steps {
            writeln!(f, "  {step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClarificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.prompt)?;
        writeln!(f)?;
        for option in &self.options {
            writeln!(f, "{}. {}", option.ordinal, option.label)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.request)?;
        writeln!(f)?;
        writeln!(f, "- Step: {} of {}", self.current_step, self.total_steps())?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;
        writeln!(f)?;
        write!(f, "{}", self.plan)?;

        if let Some(pending) = &self.pending_clarification {
            writeln!(f, "\n## Waiting on clarification")?;
            writeln!(f)?;
            write!(f, "{pending}")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "\nError: {error}")?;
        }
        Ok(())
    }
}

/// Formats one backend document for human display, keyed on its entity type.
pub struct DocumentView<'a>(pub &'a Value);

impl fmt::Display for DocumentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self
            .0
            .get("entityType")
            .and_then(Value::as_str)
            .unwrap_or("");
        match entity {
            "FOLDER" => self.fmt_folder(f),
            _ => self.fmt_document(f),
        }
    }
}

impl DocumentView<'_> {
    fn fmt_document(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = str_at(self.0, &["commonAttributes", "name"]).unwrap_or("Unknown");
        let doc_type = str_at(self.0, &["commonAttributes", "documentType"]).unwrap_or("Unknown");

        writeln!(f, "📄 {name}")?;
        writeln!(f, "   Type: {doc_type}")?;

        if let Some(year) = value_at(self.0, &["commonAttributes", "taxYear"]) {
            if !year.is_null() {
                writeln!(f, "   Tax Year: {}", JsonScalar(year))?;
            }
        }
        if let Some(path) = str_at(self.0, &["organizationAttributes", "folderPath"]) {
            if !path.is_empty() {
                writeln!(f, "   Folder: {}", absolute(path))?;
            }
        }
        let size = value_at(self.0, &["systemAttributes", "size"])
            .and_then(Value::as_u64)
            .unwrap_or(0);
        writeln!(f, "   Size: {}", FileSize(size))
    }

    fn fmt_folder(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = str_at(self.0, &["commonAttributes", "name"]).unwrap_or("Unknown");
        writeln!(f, "📁 {name}")?;

        if let Some(path) = str_at(self.0, &["organizationAttributes", "folderPath"]) {
            if !path.is_empty() {
                writeln!(f, "   Path: {}", absolute(path))?;
            }
        }
        if let Some(desc) = str_at(self.0, &["commonAttributes", "description"]) {
            if !desc.is_empty() {
                writeln!(f, "   Description: {desc}")?;
            }
        }
        Ok(())
    }
}

/// Formats a final result set with a count header.
pub struct ResultSet<'a>(pub &'a Documents);

impl fmt::Display for ResultSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.len();
        if count == 0 {
            return writeln!(f, "No results found.");
        }

        writeln!(
            f,
            "Found {count} result{}:",
            if count == 1 { "" } else { "s" }
        )?;
        writeln!(f)?;
        for doc in self.0.iter() {
            write!(f, "{}", DocumentView(doc))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Byte counts rendered as B, KB, or MB.
struct FileSize(u64);

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const KB: u64 = 1024;
        const MB: u64 = 1024 * 1024;
        if self.0 > MB {
            write!(f, "{:.1} MB", self.0 as f64 / MB as f64)
        } else if self.0 > KB {
            write!(f, "{:.1} KB", self.0 as f64 / KB as f64)
        } else {
            write!(f, "{} B", self.0)
        }
    }
}

/// JSON scalars rendered without the quotes a `Value` Display would add.
struct JsonScalar<'a>(&'a Value);

impl fmt::Display for JsonScalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => write!(f, "{s}"),
            other => write!(f, "{other}"),
        }
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn value_at<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |v, key| v.get(key))
}

fn str_at<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(doc, path).and_then(Value::as_str)
}
