//! Generator fleet: the capability contract and its concrete kinds.

/// Dispatchable thermal plant.
pub mod fossil;
/// Energy-limited conventional hydro.
pub mod hydro;
/// Batteries and pumped hydro.
pub mod storage;
pub mod trace;
pub mod types;

pub use fossil::Fossil;
pub use hydro::Hydro;
pub use storage::{Storage, StorageKind};
pub use trace::{Trace, TraceKind};
pub use types::{Generator, GeneratorInfo};
