#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Succeeded,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub index: usize,
    pub status: BatchStatus,
}

impl BatchResult {
    pub fn succeeded(index: usize) -> Self {
        Self {
            index,
            status: BatchStatus::Succeeded,
        }
    }

    pub fn failed(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            status: BatchStatus::Failed {
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Succeeded)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            BatchStatus::Succeeded => None,
            BatchStatus::Failed { message } => Some(message),
        }
    }
}

/// Outcome of a completed run, one entry per attempted batch in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    results: Vec<BatchResult>,
}

impl RunSummary {
    pub fn record(&mut self, result: BatchResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[BatchResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|result| result.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.len() - self.succeeded_count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchResult, RunSummary};

    #[test]
    fn counts_succeeded_and_failed_batches() {
        let mut summary = RunSummary::default();
        summary.record(BatchResult::succeeded(1));
        summary.record(BatchResult::failed(2, "Invalid column name 'age'"));
        summary.record(BatchResult::succeeded(3));

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.succeeded_count(), 2);
        assert_eq!(summary.failed_count(), 1);
        assert!(summary.has_failures());

        let failure = summary
            .results()
            .iter()
            .find(|result| !result.is_success())
            .expect("one failure should exist");
        assert_eq!(failure.index, 2);
        assert_eq!(failure.error_message(), Some("Invalid column name 'age'"));
    }

    #[test]
    fn empty_summary_has_no_failures() {
        let summary = RunSummary::default();

        assert!(summary.is_empty());
        assert_eq!(summary.failed_count(), 0);
        assert!(!summary.has_failures());
    }
}
