//! Consumer reacting to time-sync traffic from the controller.

use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use relay_protocol::{TimeOperation, TimeReport, Timestamp};

use super::DISPATCH_TARGET;
use super::bus::{TimeEvent, TimeSubscriber};

/// What a time-sync event means for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeOutcome {
    /// The controller reported its clock.
    ClockReported(Timestamp),
    /// A clock report arrived but could not be read.
    ReportMalformed,
    /// A `GET` arrived without a clock report.
    NoReport,
    /// The controller acknowledged a clock update.
    SetAcknowledged,
    /// A clock update came back without an acknowledgement.
    SetNotAcknowledged,
    /// The controller did not recognise the previous command.
    NotRecognized,
    /// The operation token was not a known time operation.
    UnknownOperation {
        /// Token found in the operation position.
        token: String,
    },
}

impl TimeOutcome {
    /// Interprets a time-channel event.
    #[must_use]
    pub fn evaluate(event: &TimeEvent) -> Self {
        let time = match event {
            TimeEvent::Command(time) => time,
            TimeEvent::Rejected { command, .. } => {
                return Self::UnknownOperation {
                    token: command.token(1).unwrap_or_default().to_owned(),
                };
            }
        };
        match time.operation() {
            TimeOperation::Get => match time.report() {
                TimeReport::Valid(stamp) => Self::ClockReported(stamp),
                TimeReport::Malformed => Self::ReportMalformed,
                TimeReport::Absent => Self::NoReport,
            },
            TimeOperation::Set if time.is_acknowledgement() => Self::SetAcknowledged,
            TimeOperation::Set => Self::SetNotAcknowledged,
            TimeOperation::Nack => Self::NotRecognized,
        }
    }
}

/// Tracks the controller clock and warns about failed time commands.
#[derive(Debug, Default)]
pub struct TimeSyncMonitor {
    latest: Mutex<Option<Timestamp>>,
    last_outcome: Mutex<Option<TimeOutcome>>,
}

impl TimeSyncMonitor {
    /// Creates a monitor that has not seen any report yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent clock reported by the controller.
    #[must_use]
    pub fn latest(&self) -> Option<Timestamp> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Outcome of the most recent event.
    #[must_use]
    pub fn last_outcome(&self) -> Option<TimeOutcome> {
        self.last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluates `event`, records the result, and logs it.
    pub fn observe(&self, event: &TimeEvent) -> TimeOutcome {
        let outcome = TimeOutcome::evaluate(event);
        log_outcome(&outcome);
        if let TimeOutcome::ClockReported(stamp) = outcome {
            *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(stamp);
        }
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        outcome
    }
}

impl TimeSubscriber for TimeSyncMonitor {
    fn on_time(&self, event: &TimeEvent) {
        self.observe(event);
    }
}

fn log_outcome(outcome: &TimeOutcome) {
    match outcome {
        TimeOutcome::ClockReported(stamp) => info!(
            target: DISPATCH_TARGET,
            event = "clock_reported",
            controller_time = %stamp,
            "controller clock reported"
        ),
        TimeOutcome::NoReport => info!(
            target: DISPATCH_TARGET,
            event = "clock_request",
            "time request carried no clock report"
        ),
        TimeOutcome::SetAcknowledged => info!(
            target: DISPATCH_TARGET,
            event = "clock_set",
            "controller acknowledged the clock update"
        ),
        TimeOutcome::ReportMalformed => warn!(
            target: DISPATCH_TARGET,
            event = "clock_report_malformed",
            "controller clock report could not be read"
        ),
        TimeOutcome::SetNotAcknowledged => warn!(
            target: DISPATCH_TARGET,
            event = "clock_set_unacknowledged",
            "the SET command was not acknowledged"
        ),
        TimeOutcome::NotRecognized => warn!(
            target: DISPATCH_TARGET,
            event = "command_not_recognized",
            "the command was not recognized by the controller"
        ),
        TimeOutcome::UnknownOperation { token } => warn!(
            target: DISPATCH_TARGET,
            event = "unknown_time_operation",
            operation = %token,
            "time operation unknown"
        ),
    }
}
