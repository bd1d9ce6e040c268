//! Variable renewable generation driven by an hourly capacity-factor trace.

use crate::generators::types::{Generator, GeneratorInfo};
use crate::regions::PolygonId;

/// Which resource a trace describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Wind,
    Solar,
}

/// A non-synchronous wind or solar plant.
///
/// Available energy each hour is `capacity × cf[hour]`. Whatever the offer
/// cannot take is reported as spill. Hours past the end of the trace have
/// zero availability.
#[derive(Debug, Clone)]
pub struct Trace {
    info: GeneratorInfo,
    pub kind: TraceKind,
    cf: Vec<f64>,
}

impl Trace {
    /// Creates a trace generator.
    ///
    /// # Panics
    ///
    /// Panics if any capacity factor lies outside `[0, 1]`.
    pub fn new(
        name: impl Into<String>,
        kind: TraceKind,
        polygon: PolygonId,
        capacity: f64,
        cf: Vec<f64>,
    ) -> Self {
        assert!(
            cf.iter().all(|v| (0.0..=1.0).contains(v)),
            "capacity factors must lie in [0, 1]"
        );
        Self {
            info: GeneratorInfo::new(name, polygon, capacity).non_synchronous(),
            kind,
            cf,
        }
    }

    /// Energy the plant could produce in `hour` (MWh).
    pub fn available(&self, hour: usize) -> f64 {
        self.cf.get(hour).copied().unwrap_or(0.0) * self.info.capacity
    }
}

impl Generator for Trace {
    fn info(&self) -> &GeneratorInfo {
        &self.info
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.info.capacity = capacity;
    }

    fn reset(&mut self) {}

    fn dispatch(&mut self, hour: usize, demand: f64) -> (f64, f64) {
        let available = self.available(hour);
        let generated = available.min(demand).max(0.0);
        (generated, available - generated)
    }
}
