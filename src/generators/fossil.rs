use crate::generators::types::{Generator, GeneratorInfo};
use crate::regions::PolygonId;

/// A dispatchable thermal unit (coal, gas, diesel).
///
/// Synchronous, runs up to capacity on demand and never spills. Holds no
/// per-run state.
#[derive(Debug, Clone)]
pub struct Fossil {
    info: GeneratorInfo,
}

impl Fossil {
    pub fn new(name: impl Into<String>, polygon: PolygonId, capacity: f64) -> Self {
        Self {
            info: GeneratorInfo::new(name, polygon, capacity),
        }
    }
}

impl Generator for Fossil {
    fn info(&self) -> &GeneratorInfo {
        &self.info
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.info.capacity = capacity;
    }

    fn reset(&mut self) {}

    fn dispatch(&mut self, _hour: usize, demand: f64) -> (f64, f64) {
        (demand.min(self.info.capacity).max(0.0), 0.0)
    }
}
