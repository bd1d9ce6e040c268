/// Hourly timeline construction.
pub mod clock;
pub mod context;
/// Per-hour merit-order dispatch.
pub mod dispatch;
pub mod matrix;
pub mod results;
pub mod runner;
/// Spill-to-storage routing.
pub mod spill;
pub mod types;

pub use context::Context;
pub use dispatch::DispatchEngine;
pub use results::SimResults;
pub use runner::run;
pub use types::RunState;
