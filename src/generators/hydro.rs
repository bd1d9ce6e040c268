use crate::generators::types::{Generator, GeneratorInfo};
use crate::regions::PolygonId;

/// Conventional (non-pumped) hydro.
///
/// Synchronous and capacity-limited. An optional energy budget caps total
/// output over one run; `reset` restores the full budget.
#[derive(Debug, Clone)]
pub struct Hydro {
    info: GeneratorInfo,
    /// Energy available per run (MWh); `None` means unlimited.
    pub energy_budget: Option<f64>,
    /// Energy left in the current run (MWh).
    remaining: f64,
}

impl Hydro {
    /// Creates a hydro unit.
    ///
    /// # Panics
    ///
    /// Panics if `energy_budget` is negative.
    pub fn new(
        name: impl Into<String>,
        polygon: PolygonId,
        capacity: f64,
        energy_budget: Option<f64>,
    ) -> Self {
        assert!(energy_budget.is_none_or(|e| e >= 0.0));
        Self {
            info: GeneratorInfo::new(name, polygon, capacity),
            energy_budget,
            remaining: energy_budget.unwrap_or(f64::INFINITY),
        }
    }

    /// Energy left for the rest of the run (MWh).
    pub fn remaining(&self) -> f64 {
        self.remaining
    }
}

impl Generator for Hydro {
    fn info(&self) -> &GeneratorInfo {
        &self.info
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.info.capacity = capacity;
    }

    fn reset(&mut self) {
        self.remaining = self.energy_budget.unwrap_or(f64::INFINITY);
    }

    fn dispatch(&mut self, _hour: usize, demand: f64) -> (f64, f64) {
        let generated = demand.min(self.info.capacity).min(self.remaining).max(0.0);
        self.remaining -= generated;
        (generated, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_limits_output() {
        let mut g = Hydro::new("Hydro", 1, 100.0, Some(150.0));
        assert_eq!(g.dispatch(0, 200.0), (100.0, 0.0));
        assert_eq!(g.dispatch(1, 200.0), (50.0, 0.0));
        assert_eq!(g.dispatch(2, 200.0), (0.0, 0.0));
    }

    #[test]
    fn reset_restores_budget() {
        let mut g = Hydro::new("Hydro", 1, 100.0, Some(80.0));
        g.dispatch(0, 100.0);
        assert_eq!(g.remaining(), 0.0);
        g.reset();
        assert_eq!(g.remaining(), 80.0);
    }

    #[test]
    fn unlimited_without_budget() {
        let mut g = Hydro::new("Hydro", 1, 100.0, None);
        for h in 0..100 {
            assert_eq!(g.dispatch(h, 100.0).0, 100.0);
        }
    }
}
