//! Outcome reports for batch operations.

use serde::Serialize;

use super::session::SessionState;

/// A note a batch left in its current state, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssue {
    pub path: String,
    pub reason: String,
}

/// Per-file results of a batch pass (unlock, lock, rotation, reconcile).
///
/// A failing note never aborts the batch; it is recorded here and left as it
/// was on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Notes the batch rewrote.
    pub processed: Vec<String>,
    /// Notes passed over on purpose (malformed blob, marker removed).
    pub skipped: Vec<FileIssue>,
    /// Notes the batch tried and failed to rewrite.
    pub failed: Vec<FileIssue>,
}

impl BatchReport {
    pub(crate) fn skip(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(FileIssue {
            path: path.into(),
            reason: reason.into(),
        });
    }

    pub(crate) fn fail(&mut self, path: impl Into<String>, reason: impl ToString) {
        self.failed.push(FileIssue {
            path: path.into(),
            reason: reason.to_string(),
        });
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of a successful unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockReport {
    /// No encrypted notes existed, so the entered password became canonical.
    pub first_time: bool,
    /// Password attempts used.
    pub attempts: u32,
    /// Notes decrypted in place.
    pub batch: BatchReport,
}

/// Point-in-time view of an interceptor's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub tracked: usize,
    /// A rotation left notes under the previous password.
    pub rotation_pending: bool,
    /// The last unlock exhausted its attempts.
    pub locked_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::default();
        report.processed.push("a.md".to_string());
        report.skip("b.md", "private marker removed");
        assert!(report.is_clean());

        report.fail("c.md", "disk full");
        assert!(!report.is_clean());
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.failed[0].reason, "disk full");
    }

    #[test]
    fn test_status_serializes_state_snake_case() {
        let status = SessionStatus {
            state: SessionState::NoPassword,
            tracked: 0,
            rotation_pending: false,
            locked_out: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"state\":\"no_password\""));
        assert!(json.contains("\"locked_out\":true"));
    }
}
