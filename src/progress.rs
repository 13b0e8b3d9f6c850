//! Human-readable progress lines for sync commands.
//!
//! Silent when output is JSON or `--quiet` is set; structured results are
//! printed by the commands themselves in that case.

use colored::Colorize;

use crate::model::Resource;
use crate::sync::{Batch, DeleteOutcome, OrderOutcome};

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A reporter that prints nothing.
    #[must_use]
    pub const fn silent() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn header(&self, title: &str) {
        if self.enabled {
            println!("{}", title.bold().underline());
            println!();
        }
    }

    pub fn section(&self, title: &str) {
        if self.enabled {
            println!("{}", title.white().bold());
        }
    }

    pub fn success(&self, description: &str) {
        if self.enabled {
            println!("{} {}", "✓".green().bold(), description.dimmed());
        }
    }

    pub fn failure(&self, description: &str) {
        if self.enabled {
            println!("{} {}", "✗".red().bold(), description.dimmed());
        }
    }

    /// One line per entry, failures with their reason.
    pub fn batch<T: Resource>(&self, title: &str, batch: &Batch<T>) {
        if !self.enabled {
            return;
        }
        self.section(title);
        if batch.is_empty() {
            println!("  {}", "nothing to do".dimmed());
        }
        for entry in &batch.entries {
            match &entry.failure {
                Some(reason) => self.failure(&format!("{entry}: {reason}")),
                None => self.success(&entry.to_string()),
            }
        }
        println!();
    }

    pub fn orders(&self, title: &str, outcomes: &[OrderOutcome]) {
        if !self.enabled {
            return;
        }
        self.section(title);
        for outcome in outcomes {
            let mut line = format!("{} ({} ordered", outcome.version, outcome.sent);
            if outcome.skipped > 0 {
                line.push_str(&format!(", {} without id", outcome.skipped));
            }
            line.push(')');
            match &outcome.failure {
                Some(reason) => self.failure(&format!("{line}: {reason}")),
                None => self.success(&line),
            }
        }
        println!();
    }

    pub fn deletes(&self, title: &str, outcomes: &[DeleteOutcome]) {
        if !self.enabled {
            return;
        }
        self.section(title);
        if outcomes.is_empty() {
            println!("  {}", "nothing to delete".dimmed());
        }
        for outcome in outcomes {
            let line = format!("DELETE: {} {}", outcome.section.kind(), outcome.key);
            match &outcome.failure {
                Some(reason) => self.failure(&format!("{line}: {reason}")),
                None => self.success(&line),
            }
        }
        println!();
    }
}
