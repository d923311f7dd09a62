use serde::Serialize;
use std::fmt;

/// What happened to one id during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
    /// Not synced (e.g. the kind has no local type); not counted
    Skipped,
}

/// Per-provider outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub provider: String,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl Report {
    /// Report for a provider whose pass could not run at all.
    #[must_use]
    pub fn fatal(provider: &str, error: impl fmt::Display) -> Self {
        Self {
            provider: provider.to_string(),
            failed: 1,
            errors: vec![error.to_string()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} created, {} updated, {} unchanged, {} failed",
            self.provider, self.created, self.updated, self.unchanged, self.failed
        )?;
        for error in &self.errors {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

/// Accumulates outcomes during a pass; [`ReportBuilder::finish`] hands out
/// the immutable [`Report`].
#[derive(Debug)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    #[must_use]
    pub fn new(provider: &str) -> Self {
        Self {
            report: Report {
                provider: provider.to_string(),
                ..Report::default()
            },
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.report.created += 1,
            Outcome::Updated => self.report.updated += 1,
            Outcome::Unchanged => self.report.unchanged += 1,
            Outcome::Skipped => {}
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.report.failed += 1;
        self.report.errors.push(message.into());
    }

    #[must_use]
    pub fn finish(self) -> Report {
        self.report
    }
}
