//! Per-hour merit-order dispatch under a non-synchronous penetration cap.

use tracing::info;

use crate::error::InvariantViolation;
use crate::generators::Generator;

use super::spill::route_spill;
use super::types::{ABS_TOL, HourDispatch, clamp_non_negative};

/// Allocates one hour of residual demand across the fleet in merit order.
///
/// Residual demand and the non-synchronous headroom (`async_demand`) are
/// threaded through the list, so unit N sees what units 1..N-1 left. The
/// order must never be changed or parallelised within an hour.
#[derive(Debug, Clone, Copy)]
pub struct DispatchEngine {
    /// Fraction of residual demand that non-synchronous units may serve.
    pub nsp_limit: f64,
    /// Emit per-generator diagnostics.
    pub verbose: bool,
}

impl DispatchEngine {
    /// Creates an engine.
    ///
    /// # Panics
    ///
    /// Panics if `nsp_limit` is outside `[0, 1]`.
    pub fn new(nsp_limit: f64, verbose: bool) -> Self {
        assert!(
            (0.0..=1.0).contains(&nsp_limit),
            "nsp_limit must be in [0, 1]"
        );
        Self { nsp_limit, verbose }
    }

    /// Dispatches `fleet[order[..]]` against `residual_demand` for `hour`.
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour index handed to generators; the runner passes the
    ///   demand row so capacity-factor traces stay aligned with demand
    /// * `residual_demand` - Aggregate demand to be met (MWh)
    /// * `fleet` - Every generator; rows in the result are indexed by position here
    /// * `order` - Fleet indices to dispatch, in merit order
    ///
    /// # Returns
    ///
    /// An `HourDispatch` with one generation and one spill entry per fleet
    /// index and the residual demand left unmet.
    ///
    /// # Errors
    ///
    /// Returns an `InvariantViolation` if a generator over-delivers, reports
    /// negative spill, or drives residual/async demand negative beyond
    /// tolerance, or if a storage unit over-absorbs.
    pub fn dispatch_hour(
        &self,
        hour: usize,
        residual_demand: f64,
        fleet: &mut [Box<dyn Generator>],
        order: &[usize],
    ) -> Result<HourDispatch, InvariantViolation> {
        let mut out = HourDispatch::zeros(fleet.len(), residual_demand);
        let mut residual = residual_demand;
        // Largest share of the remaining demand non-synchronous output may take.
        let mut async_demand = residual * self.nsp_limit;

        for &idx in order {
            let generator = &mut fleet[idx];
            let synchronous = generator.synchronous();

            let offered = if !synchronous && async_demand < residual {
                async_demand
            } else {
                residual
            };

            let (generated, spilled) = generator.dispatch(hour, offered);
            if generated > offered + ABS_TOL {
                return Err(InvariantViolation::GenerationExceedsOffer {
                    hour,
                    generator: generator.info().to_string(),
                    generated,
                    offered,
                });
            }
            if spilled < -ABS_TOL {
                return Err(InvariantViolation::NegativeSpill {
                    hour,
                    generator: generator.info().to_string(),
                    value: spilled,
                });
            }
            out.generation[idx] = generated;

            if !synchronous {
                async_demand = clamp_non_negative(async_demand - generated).ok_or_else(|| {
                    InvariantViolation::NegativeAsyncDemand {
                        hour,
                        generator: generator.info().to_string(),
                        value: async_demand - generated,
                    }
                })?;
            }

            residual = clamp_non_negative(residual - generated).ok_or_else(|| {
                InvariantViolation::NegativeResidualDemand {
                    hour,
                    generator: generator.info().to_string(),
                    value: residual - generated,
                }
            })?;

            if self.verbose {
                info!(
                    hour,
                    "GENERATOR: {}, generation: {generated:.1} spill: {spilled:.1} \
                     residual-demand: {residual:.1} async-demand: {async_demand:.1}",
                    generator.info(),
                );
            }

            if spilled > 0.0 {
                out.spill[idx] = route_spill(hour, spilled, fleet, order, idx, self.verbose)?;
            }
        }

        out.residual_demand = residual;
        Ok(out)
    }
}
