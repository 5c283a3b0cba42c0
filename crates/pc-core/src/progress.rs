/// A progress report from one pipeline stage.
///
/// `percent` is non-decreasing within a run of a single stage. Reporters
/// are called synchronously at phase boundaries and between batches.
#[derive(Debug, Clone)]
pub struct ProgressUpdate<'a> {
    /// Stage label, e.g. "chains" or "placement".
    pub stage: &'a str,
    /// Completion in [0, 100].
    pub percent: f64,
    /// Human-readable detail, e.g. "batch 3/7".
    pub details: String,
}

/// Progress reporting trait for optimizer stages.
pub trait ProgressReporter {
    fn report(&self, update: ProgressUpdate);
}

/// No-op reporter for when progress isn't needed.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _update: ProgressUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Capture(RefCell<Vec<f64>>);

    impl ProgressReporter for Capture {
        fn report(&self, update: ProgressUpdate) {
            self.0.borrow_mut().push(update.percent);
        }
    }

    #[test]
    fn test_reporter_receives_updates() {
        let capture = Capture(RefCell::new(Vec::new()));
        capture.report(ProgressUpdate {
            stage: "chains",
            percent: 50.0,
            details: "batch 1/2".into(),
        });
        capture.report(ProgressUpdate {
            stage: "chains",
            percent: 100.0,
            details: "done".into(),
        });
        assert_eq!(*capture.0.borrow(), vec![50.0, 100.0]);
    }
}
