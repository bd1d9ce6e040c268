//! Seeded synthetic demand and capacity-factor traces.
//!
//! Used by presets and scenarios that do not supply a demand CSV. All
//! generators are deterministic for a given seed.

use chrono::{NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::demand::DemandMatrix;
use crate::error::ConfigError;
use crate::regions::PolygonId;

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Sinusoidal daily demand shape with Gaussian noise.
///
/// ```
/// use dispatch_sim::traces::DemandProfile;
///
/// let profile = DemandProfile { base_mw: 100.0, amp_mw: 0.0, phase_rad: 0.0, noise_std: 0.0 };
/// assert_eq!(profile.value(13, &mut rand::SeedableRng::seed_from_u64(1)), 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandProfile {
    /// Mean hourly demand per polygon (MW).
    pub base_mw: f64,
    /// Daily swing amplitude (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Noise standard deviation (MW).
    pub noise_std: f64,
}

impl DemandProfile {
    /// Demand for a given hour of day; never negative.
    pub fn value(&self, hour_of_day: u32, rng: &mut StdRng) -> f64 {
        let day_pos = f64::from(hour_of_day % 24) / 24.0;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let mw = self.base_mw + self.amp_mw * angle.sin() + gaussian_noise(rng, self.noise_std);
        mw.max(0.0)
    }

    /// Builds an `hours` × `polygons` demand table starting at `start`.
    ///
    /// Each polygon draws from its own RNG stream derived from `seed`.
    ///
    /// # Errors
    ///
    /// Propagates validation errors from [`DemandMatrix::new`].
    pub fn synthesize(
        &self,
        start: NaiveDateTime,
        hours: usize,
        polygons: &[PolygonId],
        seed: u64,
    ) -> Result<DemandMatrix, ConfigError> {
        let mut rngs: Vec<StdRng> = polygons
            .iter()
            .map(|p| StdRng::seed_from_u64(seed.wrapping_add(u64::from(*p))))
            .collect();

        let first = start.hour();
        let rows = (0..hours)
            .map(|h| {
                let hod = first + (h % 24) as u32;
                rngs.iter_mut().map(|rng| self.value(hod, rng)).collect()
            })
            .collect();
        DemandMatrix::new(start, polygons.to_vec(), rows)
    }
}

/// Half-cosine solar capacity factor between sunrise and sunset.
///
/// Returns one value in `[0, 1]` per hour. Noise is multiplicative on the
/// clear-sky shape.
pub fn solar_trace(
    start: NaiveDateTime,
    hours: usize,
    sunrise: u32,
    sunset: u32,
    noise_std: f64,
    seed: u64,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let first = start.hour();
    (0..hours)
        .map(|h| {
            let hod = (first + (h % 24) as u32) % 24;
            let frac = daylight_frac(hod, sunrise, sunset);
            if frac <= 0.0 {
                return 0.0;
            }
            let noise = 1.0 + gaussian_noise(&mut rng, noise_std);
            (frac * noise).clamp(0.0, 1.0)
        })
        .collect()
}

/// Fraction of peak irradiance at `hour` for a half-cosine day.
fn daylight_frac(hour: u32, sunrise: u32, sunset: u32) -> f64 {
    if hour < sunrise || hour >= sunset || sunrise >= sunset {
        return 0.0;
    }
    let span = f64::from(sunset - sunrise);
    let x = (f64::from(hour - sunrise) + 0.5) / span;
    (std::f64::consts::PI * x).sin()
}

/// Wind capacity factor as a clamped AR(1) process.
///
/// ```text
/// cf(t) = alpha * cf(t-1) + (1 - alpha) * (mean + epsilon(t))
/// ```
pub fn wind_trace(hours: usize, mean: f64, alpha: f64, noise_std: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let alpha = alpha.clamp(0.0, 1.0);
    let mut cf = mean.clamp(0.0, 1.0);
    (0..hours)
        .map(|_| {
            let epsilon = gaussian_noise(&mut rng, noise_std);
            cf = (alpha * cf + (1.0 - alpha) * (mean + epsilon)).clamp(0.0, 1.0);
            cf
        })
        .collect()
}
