//! End-of-run summary of a completed simulation.

use std::fmt;

use serde::Serialize;

use crate::generators::Generator;
use crate::regions::PolygonId;
use crate::sim::{Context, SimResults};

/// Maximum unserved energy, as a percentage of demand, before the
/// reliability standard is breached.
pub const RELIABILITY_STANDARD_PCT: f64 = 0.002;

/// Per-generator line of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorSummary {
    pub name: String,
    pub polygon: Option<PolygonId>,
    pub capacity_mw: f64,
    pub energy_mwh: f64,
    pub capacity_factor: Option<f64>,
}

/// Headline figures of one completed run.
///
/// Shortfall fields are `None` when every hour was served.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub timesteps: usize,
    pub demand_mwh: f64,
    pub surplus_mwh: f64,
    pub unserved_mwh: f64,
    pub unserved_percent: Option<f64>,
    pub reliability_exceeded: bool,
    pub unserved_hours: usize,
    pub unserved_events: usize,
    pub shortfall_min_mw: Option<f64>,
    pub shortfall_max_mw: Option<f64>,
    pub generators: Vec<GeneratorSummary>,
}

impl Summary {
    /// Builds a summary from results and the fleet that produced them.
    ///
    /// # Arguments
    ///
    /// * `results` - Output of a completed run
    /// * `generators` - Fleet in the same order as the result columns
    pub fn new(results: &SimResults, generators: &[Box<dyn Generator>]) -> Self {
        let unserved_percent = results.unserved_percent();
        let shortfalls = results.shortfall_range();
        let generators = generators
            .iter()
            .enumerate()
            .map(|(i, g)| GeneratorSummary {
                name: g.name().to_string(),
                polygon: g.info().polygon,
                capacity_mw: g.capacity(),
                energy_mwh: results.generator_energy(i),
                capacity_factor: results.capacity_factor(i),
            })
            .collect();

        Self {
            timesteps: results.timesteps(),
            demand_mwh: results.total_demand(),
            surplus_mwh: results.surplus_energy(),
            unserved_mwh: results.unserved_energy(),
            unserved_percent,
            reliability_exceeded: unserved_percent.is_some_and(|p| p > RELIABILITY_STANDARD_PCT),
            unserved_hours: results.unserved().len(),
            unserved_events: results.unserved_events(),
            shortfall_min_mw: shortfalls.map(|(lo, _)| lo),
            shortfall_max_mw: shortfalls.map(|(_, hi)| hi),
            generators,
        }
    }

    /// Summarises the context's last completed run, if any.
    pub fn from_context(ctx: &Context) -> Option<Self> {
        ctx.results().map(|r| Self::new(r, &ctx.generators))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generators:")?;
        for g in &self.generators {
            let polygon = g
                .polygon
                .map_or_else(|| "unassigned".to_string(), |p| format!("polygon {p}"));
            write!(
                f,
                "  {} ({polygon}:{:.2} MW): {:.2} MWh",
                g.name, g.capacity_mw, g.energy_mwh
            )?;
            match g.capacity_factor {
                Some(cf) => writeln!(f, ", CF {:.1}%", cf * 100.0)?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, "Timesteps: {} h", self.timesteps)?;
        writeln!(f, "Demand energy: {:.2} MWh", self.demand_mwh)?;
        writeln!(f, "Unstored surplus energy: {:.2} MWh", self.surplus_mwh)?;

        if self.reliability_exceeded {
            writeln!(f, "WARNING: reliability standard exceeded")?;
        }
        if self.unserved_hours == 0 {
            return write!(f, "No unserved energy");
        }

        match self.unserved_percent {
            Some(p) => writeln!(f, "Unserved energy: {:.2} MWh ({p:.3}%)", self.unserved_mwh)?,
            None => writeln!(f, "Unserved energy: {:.2} MWh", self.unserved_mwh)?,
        }
        writeln!(f, "Unserved total hours: {}", self.unserved_hours)?;
        writeln!(
            f,
            "Number of unserved energy events: {}",
            self.unserved_events
        )?;
        write!(
            f,
            "Shortfalls (min, max): ({:.2} MW, {:.2} MW)",
            self.shortfall_min_mw.unwrap_or(0.0),
            self.shortfall_max_mw.unwrap_or(0.0)
        )
    }
}
