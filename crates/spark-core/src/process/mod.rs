//! Supervised execution of external commands
//!
//! This module provides:
//! - A runner that spawns one child process, streams its output through a
//!   caller-supplied callback, and enforces a timeout
//! - The two-phase shutdown state machine (soft stop, grace window, force
//!   kill) used when a timeout fires

pub mod escalation;
pub mod runner;

pub use escalation::{KillEscalation, StopAction, StopState};
pub use runner::{
    run, CommandCapture, OutputChunk, OutputStream, RunOptions, DEFAULT_RUN_TIMEOUT, KILL_GRACE,
};
