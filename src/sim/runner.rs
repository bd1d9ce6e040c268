//! Hour-by-hour orchestration of a full simulation run.

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{ConfigError, InvariantViolation, SimError};

use super::clock::Timeline;
use super::context::Context;
use super::dispatch::DispatchEngine;
use super::matrix::HourlyMatrix;
use super::results::SimResults;
use super::types::RunState;

/// Runs the simulation over `start..=end` and attaches the results.
///
/// Missing endpoints default to the first/last hour of the demand table.
/// Hours run in strict chronological order; generators whose region is not
/// selected are reset but never dispatched, and their columns stay zero.
///
/// # Errors
///
/// Returns `SimError::Config` before anything is touched if the region
/// selection is missing or names an unknown region, the nsp limit is out of
/// range, or the endpoints fall outside the demand table. Returns
/// `SimError::Invariant` if a contract breaks mid-run. Either way no results
/// are attached.
pub fn run<'a>(
    ctx: &'a mut Context,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<&'a SimResults, SimError> {
    let selected = validate_regions(ctx)?;
    if !(0.0..=1.0).contains(&ctx.nsp_limit) {
        return Err(ConfigError::new(
            "simulation.nsp_limit",
            format!("must be in [0, 1], got {}", ctx.nsp_limit),
        )
        .into());
    }
    let (first_row, timeline) = resolve_timeline(ctx, start, end)?;

    ctx.state = RunState::Running;
    ctx.results = None;
    match simulate(ctx, &selected, first_row, &timeline) {
        Ok(results) => {
            info!(
                hours = results.timesteps(),
                unserved_mwh = results.unserved_energy(),
                spill_mwh = results.surplus_energy(),
                "Simulation completed"
            );
            ctx.state = RunState::Completed;
            Ok(ctx.results.insert(results))
        }
        Err(e) => {
            ctx.state = RunState::Uninitialized;
            Err(e.into())
        }
    }
}

fn validate_regions(ctx: &Context) -> Result<Vec<String>, ConfigError> {
    let selected = ctx
        .regions
        .clone()
        .ok_or_else(|| ConfigError::new("regions", "regions is not a list"))?;
    if let Some(unknown) = selected.iter().find(|r| ctx.region_map.get(r).is_none()) {
        return Err(ConfigError::new(
            "regions",
            format!("unknown region \"{unknown}\""),
        ));
    }
    Ok(selected)
}

/// Maps the requested endpoints onto demand rows.
fn resolve_timeline(
    ctx: &Context,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<(usize, Timeline), ConfigError> {
    if ctx.demand.hours() == 0 {
        return Err(ConfigError::new("demand", "demand table is empty"));
    }
    let start = start.unwrap_or_else(|| ctx.demand.first_hour());
    let end = end.unwrap_or_else(|| ctx.demand.last_hour());

    let first_row = ctx.demand.row_of(start).ok_or_else(|| {
        ConfigError::new("start", format!("{start} is not an hour in the demand data"))
    })?;
    if ctx.demand.row_of(end).is_none() {
        return Err(ConfigError::new(
            "end",
            format!("{end} is not an hour in the demand data"),
        ));
    }
    if end < start {
        return Err(ConfigError::new("end", format!("{end} is before {start}")));
    }
    Ok((first_row, Timeline::new(start, end)))
}

fn simulate(
    ctx: &mut Context,
    selected: &[String],
    first_row: usize,
    timeline: &Timeline,
) -> Result<SimResults, InvariantViolation> {
    for generator in &mut ctx.generators {
        generator.reset();
        if generator.info().polygon.is_none() {
            return Err(InvariantViolation::MissingPolygon {
                generator: generator.name().to_string(),
            });
        }
    }

    let order: Vec<usize> = ctx
        .generators
        .iter()
        .enumerate()
        .filter(|(_, g)| {
            g.info()
                .region(&ctx.region_map)
                .is_some_and(|r| selected.iter().any(|s| s == r))
        })
        .map(|(i, _)| i)
        .collect();

    let mut demand = ctx.demand.clone();
    for polygon in ctx.region_map.polygons_outside(selected) {
        demand.zero_polygon(polygon);
    }
    let residual: Vec<f64> = (0..timeline.len())
        .map(|h| demand.row_sum(first_row + h))
        .collect();

    info!(
        hours = timeline.len(),
        generators = order.len(),
        regions = ?selected,
        nsp_limit = ctx.nsp_limit,
        "Simulation started"
    );

    let width = ctx.generators.len();
    let mut generation = HourlyMatrix::zeros(timeline.len(), width);
    let mut spill = HourlyMatrix::zeros(timeline.len(), width);
    let engine = DispatchEngine::new(ctx.nsp_limit, ctx.verbose);

    for (hour, ts) in timeline.iter() {
        // Generators index their traces by demand row, not by run hour.
        let row = first_row + hour;
        if ctx.verbose {
            info!(hour = row, "STEP: {ts}");
            info!(hour = row, "DEMAND: {:?}", demand.row(row));
        }

        let out = engine.dispatch_hour(row, residual[hour], &mut ctx.generators, &order)?;
        generation.set_row(hour, &out.generation);
        spill.set_row(hour, &out.spill);

        if ctx.verbose {
            info!(hour = row, "ENDSTEP: {ts}");
        }
    }

    let names = ctx.generators.iter().map(|g| g.name().to_string()).collect();
    let capacities = ctx.generators.iter().map(|g| g.capacity()).collect();
    Ok(SimResults::new(
        timeline.timestamps(),
        residual,
        generation,
        spill,
        names,
        capacities,
    ))
}
