//! Exit code logic for the plucker process.

use plucker_core::MessageReport;

use crate::ProcessExit;

/// Running totals over every message handled in one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunTally {
    pub(crate) delivered: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    /// Messages cut short because the workspace could not be cleared.
    pub(crate) aborted: usize,
}

impl RunTally {
    pub(crate) fn record(&mut self, report: &MessageReport) {
        self.delivered += report.delivered();
        self.failed += report.failed();
        self.skipped += report.skipped;
        if report.aborted {
            self.aborted += 1;
        }
    }

    /// Exit outcome for the run.
    ///
    /// Skipped links never count against the run. An aborted message does,
    /// since links after the abort were neither delivered nor reported.
    pub(crate) fn outcome(&self) -> ProcessExit {
        if self.failed == 0 && self.aborted == 0 {
            ProcessExit::Success
        } else if self.delivered > 0 {
            ProcessExit::Partial
        } else {
            ProcessExit::Failure
        }
    }
}
