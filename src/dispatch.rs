//! Isolated listener invocation.
//!
//! Every place that fans a value out to caller code (state listeners, event
//! channels, native node events, dependency initializers) goes through
//! [`call_isolated`]. A failing listener is logged and recorded in the
//! [`DispatchReport`]; the remaining listeners still run.

use crate::error::BehaviorError;

/// Outcome of delivering one value to a list of listeners.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that returned `Ok`.
    pub delivered: usize,
    /// Errors returned by the remaining listeners, in call order.
    pub failures: Vec<BehaviorError>,
}

impl DispatchReport {
    /// No listener failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of listeners invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }

    /// Fold a nested report into this one.
    pub fn absorb(&mut self, other: DispatchReport) {
        self.delivered += other.delivered;
        self.failures.extend(other.failures);
    }

    fn record(&mut self, outcome: Result<(), BehaviorError>) {
        match outcome {
            Ok(()) => self.delivered += 1,
            Err(err) => self.failures.push(err),
        }
    }
}

/// Run one listener, logging and recording its failure instead of
/// propagating it.
pub fn call_isolated<F>(report: &mut DispatchReport, origin: &str, call: F)
where
    F: FnOnce() -> Result<(), BehaviorError>,
{
    let outcome = call();
    if let Err(ref err) = outcome {
        tracing::error!(origin, error = %err, "listener failed");
    }
    report.record(outcome);
}
