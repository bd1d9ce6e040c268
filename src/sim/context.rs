//! Simulation context: inputs, fleet, and the results of the last run.

use std::fmt;

use chrono::NaiveDateTime;

use crate::demand::DemandMatrix;
use crate::error::{ConfigError, SimError};
use crate::generators::Generator;
use crate::regions::RegionMap;

use super::results::SimResults;
use super::runner;
use super::types::RunState;

/// Default non-synchronous penetration limit.
pub const DEFAULT_NSP_LIMIT: f64 = 0.75;

/// Everything one simulation run reads and writes.
///
/// The generator list defines both merit order and the order in which
/// storage units are offered spill.
pub struct Context {
    /// Regions under study; `None` is rejected by [`Context::run`].
    pub regions: Option<Vec<String>>,
    pub region_map: RegionMap,
    /// Caller-owned demand; runs work on a copy.
    pub demand: DemandMatrix,
    /// Non-synchronous penetration limit in `[0, 1]`.
    pub nsp_limit: f64,
    pub generators: Vec<Box<dyn Generator>>,
    /// Emit per-hour dispatch diagnostics.
    pub verbose: bool,
    pub(crate) state: RunState,
    pub(crate) results: Option<SimResults>,
}

impl Context {
    /// Creates a context studying every region in `region_map`.
    pub fn new(
        region_map: RegionMap,
        demand: DemandMatrix,
        generators: Vec<Box<dyn Generator>>,
    ) -> Self {
        Self {
            regions: Some(region_map.ids()),
            region_map,
            demand,
            nsp_limit: DEFAULT_NSP_LIMIT,
            generators,
            verbose: false,
            state: RunState::Uninitialized,
            results: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Results of the last completed run.
    pub fn results(&self) -> Option<&SimResults> {
        self.results.as_ref()
    }

    /// Runs the simulation over `start..=end`, defaulting to the full
    /// demand range.
    ///
    /// # Errors
    ///
    /// See [`runner::run`].
    pub fn run(
        &mut self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<&SimResults, SimError> {
        runner::run(self, start, end)
    }

    /// Sets generator capacities from GW values, in merit order.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the number of values differs from the
    /// number of generators or a value is negative.
    pub fn set_capacities(&mut self, capacities_gw: &[f64]) -> Result<(), ConfigError> {
        if capacities_gw.len() != self.generators.len() {
            return Err(ConfigError::new(
                "capacities",
                format!(
                    "expected {} values, got {}",
                    self.generators.len(),
                    capacities_gw.len()
                ),
            ));
        }
        if let Some(c) = capacities_gw.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(ConfigError::new(
                "capacities",
                format!("invalid capacity {c} GW"),
            ));
        }
        for (generator, gw) in self.generators.iter_mut().zip(capacities_gw) {
            generator.set_capacity(gw * 1000.0);
        }
        Ok(())
    }

    /// Total demand of the last run, or of the whole demand table before any
    /// run has completed.
    pub fn total_demand(&self) -> f64 {
        self.results
            .as_ref()
            .map_or_else(|| self.demand.total(), SimResults::total_demand)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("regions", &self.regions)
            .field("nsp_limit", &self.nsp_limit)
            .field(
                "generators",
                &self.generators.iter().map(|g| g.info()).collect::<Vec<_>>(),
            )
            .field("hours", &self.demand.hours())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::parse_timestamp;
    use crate::generators::{Fossil, Trace, TraceKind};
    use crate::regions::Region;

    fn context() -> Context {
        let map = RegionMap::new(vec![Region::new("NSW", vec![1])]).expect("valid map");
        let start = parse_timestamp("2020-01-01 00:00:00").expect("valid timestamp");
        let demand = DemandMatrix::new(start, vec![1], vec![vec![10.0], vec![20.0]])
            .expect("valid demand");
        Context::new(
            map,
            demand,
            vec![
                Box::new(Trace::new("Wind", TraceKind::Wind, 1, 1.0, vec![0.5; 2])),
                Box::new(Fossil::new("Coal", 1, 1.0)),
            ],
        )
    }

    #[test]
    fn set_capacities_converts_gw() {
        let mut ctx = context();
        ctx.set_capacities(&[0.1, 0.2]).expect("valid capacities");
        assert_eq!(ctx.generators[0].capacity(), 100.0);
        assert_eq!(ctx.generators[1].capacity(), 200.0);
    }

    #[test]
    fn set_capacities_length_mismatch() {
        let mut ctx = context();
        let err = ctx.set_capacities(&[0.1]).unwrap_err();
        assert_eq!(err.field, "capacities");
    }

    #[test]
    fn new_context_selects_all_regions() {
        let ctx = context();
        assert_eq!(ctx.regions, Some(vec!["NSW".to_string()]));
        assert_eq!(ctx.state(), RunState::Uninitialized);
        assert!(ctx.results().is_none());
        assert_eq!(ctx.total_demand(), 30.0);
    }
}
