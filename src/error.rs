//! Error types shared by configuration, demand loading and the dispatch engine.

/// Configuration error with field path and constraint description.
///
/// Raised before any simulation state is touched; the caller can fix the
/// input and retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.nsp_limit"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A broken engine or generator contract detected during a run.
///
/// These are defects, not expected runtime conditions. A run that hits one
/// is aborted and attaches no results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// A generator reported more generation than it was offered.
    #[error("generation ({generated:.4}) > demand ({offered:.4}) for {generator} at hour {hour}")]
    GenerationExceedsOffer {
        hour: usize,
        generator: String,
        generated: f64,
        offered: f64,
    },

    /// Residual demand went negative beyond tolerance.
    #[error("residual demand {value:.6} < 0 after {generator} at hour {hour}")]
    NegativeResidualDemand {
        hour: usize,
        generator: String,
        value: f64,
    },

    /// Non-synchronous headroom went negative beyond tolerance.
    #[error("async demand {value:.6} < 0 after {generator} at hour {hour}")]
    NegativeAsyncDemand {
        hour: usize,
        generator: String,
        value: f64,
    },

    /// A generator reported negative spill.
    #[error("spill {value:.6} < 0 from {generator} at hour {hour}")]
    NegativeSpill {
        hour: usize,
        generator: String,
        value: f64,
    },

    /// A storage unit absorbed more energy than it was offered.
    #[error("{generator} stored {stored:.4} > offered {offered:.4} at hour {hour}")]
    StorageExceedsOffer {
        hour: usize,
        generator: String,
        stored: f64,
        offered: f64,
    },

    /// A storage unit reported absorbing a negative amount.
    #[error("{generator} stored {stored:.6} < 0 at hour {hour}")]
    NegativeStorage {
        hour: usize,
        generator: String,
        stored: f64,
    },

    /// A generator has no polygon assignment.
    #[error("every generator must be assigned a polygon ({generator} has none)")]
    MissingPolygon { generator: String },
}

/// Any failure of a simulation run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Input rejected before the run started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Contract breach detected mid-run; not retriable.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl SimError {
    /// Returns `true` for errors the caller can fix by changing the input.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
