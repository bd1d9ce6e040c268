//! Core simulation types: tolerance handling, run state, and per-hour output.

use std::fmt;

/// Absolute tolerance applied to every floating-point boundary check.
pub const ABS_TOL: f64 = 1e-6;

/// `true` when `a` and `b` differ by no more than [`ABS_TOL`].
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABS_TOL
}

/// Clamps rounding noise below zero back to zero.
///
/// Returns `None` when `value` is negative beyond [`ABS_TOL`].
///
/// # Examples
///
/// ```
/// use dispatch_sim::sim::types::clamp_non_negative;
///
/// assert_eq!(clamp_non_negative(3.0), Some(3.0));
/// assert_eq!(clamp_non_negative(-1e-9), Some(0.0));
/// assert_eq!(clamp_non_negative(-0.1), None);
/// ```
pub fn clamp_non_negative(value: f64) -> Option<f64> {
    if value >= 0.0 {
        Some(value)
    } else if value >= -ABS_TOL {
        Some(0.0)
    } else {
        None
    }
}

/// Lifecycle of a simulation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run has completed; no results attached.
    #[default]
    Uninitialized,
    /// Hour loop in progress.
    Running,
    /// Results attached.
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Running => "running",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Engine output for one hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourDispatch {
    /// Generation per fleet index (MWh); zero for units not dispatched.
    pub generation: Vec<f64>,
    /// Unrecovered spill per fleet index (MWh).
    pub spill: Vec<f64>,
    /// Residual demand left after the merit-order pass (MWh).
    pub residual_demand: f64,
}

impl HourDispatch {
    pub fn zeros(width: usize, residual_demand: f64) -> Self {
        Self {
            generation: vec![0.0; width],
            spill: vec![0.0; width],
            residual_demand,
        }
    }
}
