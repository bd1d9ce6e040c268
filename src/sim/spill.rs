//! Routing of one generator's surplus into storage.

use tracing::info;

use crate::error::InvariantViolation;
use crate::generators::Generator;

use super::types::{ABS_TOL, clamp_non_negative};

/// Offers `spill` from `fleet[source]` to every storage-capable unit in
/// `order`, in that order, and returns what nothing could absorb.
///
/// Every storage unit in the list is eligible, including those ahead of the
/// spiller in merit order. Round-trip losses are the absorber's business;
/// this only checks that no unit takes more than it was offered.
///
/// # Errors
///
/// Returns `StorageExceedsOffer` if an absorber reports taking more than the
/// remaining spill, or `NegativeStorage` if it reports a negative amount
/// (both beyond [`ABS_TOL`]).
pub fn route_spill(
    hour: usize,
    spill: f64,
    fleet: &mut [Box<dyn Generator>],
    order: &[usize],
    source: usize,
    verbose: bool,
) -> Result<f64, InvariantViolation> {
    let mut remaining = spill;

    for &idx in order {
        if remaining <= 0.0 {
            break;
        }
        let other = &mut fleet[idx];
        if !other.storage_capable() {
            continue;
        }

        let stored = other.absorb(hour, remaining);
        if stored < -ABS_TOL {
            return Err(InvariantViolation::NegativeStorage {
                hour,
                generator: other.name().to_string(),
                stored,
            });
        }
        if stored > remaining + ABS_TOL {
            return Err(InvariantViolation::StorageExceedsOffer {
                hour,
                generator: other.name().to_string(),
                stored,
                offered: remaining,
            });
        }
        remaining = clamp_non_negative(remaining - stored.max(0.0)).unwrap_or(0.0);

        if verbose {
            info!(
                hour,
                "STORE: {} -> {} ({stored:.1})",
                fleet[source].info(),
                fleet[idx].info(),
            );
        }
    }

    Ok(remaining)
}
