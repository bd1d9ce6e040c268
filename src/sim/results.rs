//! Labelled result series attached to a context after a completed run.

use chrono::NaiveDateTime;

use super::matrix::HourlyMatrix;
use super::types::is_close;

/// Output of one completed run.
///
/// All energies are MWh. Matrix rows align with `timeline`; columns align
/// with the context's generator list.
#[derive(Debug, Clone, PartialEq)]
pub struct SimResults {
    timeline: Vec<NaiveDateTime>,
    demand: Vec<f64>,
    generation: HourlyMatrix,
    spill: HourlyMatrix,
    unserved: Vec<(NaiveDateTime, f64)>,
    generator_names: Vec<String>,
    capacities: Vec<f64>,
}

impl SimResults {
    /// Assembles results and derives the unserved series.
    ///
    /// Unserved energy per hour is aggregate demand minus aggregate
    /// generation; hours within tolerance of zero are dropped and
    /// the rest kept unmodified.
    pub(crate) fn new(
        timeline: Vec<NaiveDateTime>,
        demand: Vec<f64>,
        generation: HourlyMatrix,
        spill: HourlyMatrix,
        generator_names: Vec<String>,
        capacities: Vec<f64>,
    ) -> Self {
        let unserved = timeline
            .iter()
            .zip(&demand)
            .enumerate()
            .map(|(h, (ts, d))| (*ts, d - generation.row_sum(h)))
            .filter(|(_, shortfall)| !is_close(*shortfall, 0.0))
            .collect();

        Self {
            timeline,
            demand,
            generation,
            spill,
            unserved,
            generator_names,
            capacities,
        }
    }

    pub fn timeline(&self) -> &[NaiveDateTime] {
        &self.timeline
    }

    /// Aggregate demand per hour over the selected regions.
    pub fn demand(&self) -> &[f64] {
        &self.demand
    }

    pub fn generation(&self) -> &HourlyMatrix {
        &self.generation
    }

    /// Spill no storage unit could absorb.
    pub fn spill(&self) -> &HourlyMatrix {
        &self.spill
    }

    /// Hours with a non-negligible shortfall.
    pub fn unserved(&self) -> &[(NaiveDateTime, f64)] {
        &self.unserved
    }

    pub fn generator_names(&self) -> &[String] {
        &self.generator_names
    }

    /// Number of simulated hours.
    pub fn timesteps(&self) -> usize {
        self.timeline.len()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    pub fn total_generation(&self) -> f64 {
        self.generation.total()
    }

    pub fn unserved_energy(&self) -> f64 {
        self.unserved.iter().map(|(_, v)| v).sum()
    }

    /// Unstored surplus energy.
    pub fn surplus_energy(&self) -> f64 {
        self.spill.total()
    }

    /// Unserved energy as a percentage of demand; `None` with zero demand.
    pub fn unserved_percent(&self) -> Option<f64> {
        let demand = self.total_demand();
        (demand > 0.0).then(|| 100.0 * self.unserved_energy() / demand)
    }

    /// Energy delivered by one generator.
    pub fn generator_energy(&self, column: usize) -> f64 {
        self.generation.column_total(column)
    }

    /// Delivered energy as a fraction of `capacity × hours`.
    pub fn capacity_factor(&self, column: usize) -> Option<f64> {
        let possible = self.capacities.get(column)? * self.timesteps() as f64;
        (possible > 0.0).then(|| self.generator_energy(column) / possible)
    }

    /// Maximal runs of consecutive unserved hours.
    pub fn unserved_events(&self) -> usize {
        self.unserved
            .iter()
            .enumerate()
            .filter(|(i, (ts, _))| {
                *i == 0 || (*ts - self.unserved[i - 1].0) != chrono::TimeDelta::hours(1)
            })
            .count()
    }

    /// Smallest and largest hourly shortfall, if any.
    pub fn shortfall_range(&self) -> Option<(f64, f64)> {
        let mut values = self.unserved.iter().map(|(_, v)| *v);
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}
