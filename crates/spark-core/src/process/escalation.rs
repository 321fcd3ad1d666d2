//! Two-phase shutdown state machine for a supervised child process
//!
//! When a timeout fires the child first receives a soft stop request
//! (SIGTERM on unix). If it has not exited once the grace window elapses,
//! it is force-killed. The transitions live here as plain state so the
//! behavior is testable without timers or a real child process; the runner
//! maps the returned actions onto actual signals.

use std::time::Duration;

/// Where the supervised child is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopState {
    /// The child is running normally.
    Running,
    /// The timeout fired and a soft stop was requested; the grace window
    /// is open.
    SoftStopRequested,
    /// The child exited on its own (cleanly or during the grace window).
    Exited,
    /// The grace window elapsed and the child was force-killed.
    ForceKilled,
}

/// What the runner must do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopAction {
    /// Nothing to do.
    None,
    /// Send the soft termination signal.
    SendSoftStop,
    /// Kill the child outright.
    ForceKill,
}

/// Tracks the shutdown escalation for one child process.
#[derive(Debug)]
pub struct KillEscalation {
    state: StopState,
    grace: Duration,
}

impl KillEscalation {
    pub fn new(grace: Duration) -> Self {
        Self {
            state: StopState::Running,
            grace,
        }
    }

    /// The grace window between the soft stop and the force kill.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn state(&self) -> StopState {
        self.state
    }

    /// The run timeout fired while the child was still alive.
    pub fn on_timeout(&mut self) -> StopAction {
        match self.state {
            StopState::Running => {
                self.state = StopState::SoftStopRequested;
                StopAction::SendSoftStop
            }
            _ => StopAction::None,
        }
    }

    /// The child exited, either on its own or in response to the soft stop.
    pub fn on_exit(&mut self) {
        match self.state {
            StopState::Running | StopState::SoftStopRequested => {
                self.state = StopState::Exited;
            }
            _ => {}
        }
    }

    /// The grace window elapsed without the child exiting.
    pub fn on_grace_elapsed(&mut self) -> StopAction {
        match self.state {
            StopState::SoftStopRequested => {
                self.state = StopState::ForceKilled;
                StopAction::ForceKill
            }
            _ => StopAction::None,
        }
    }
}
