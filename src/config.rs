//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::demand::{DemandMatrix, parse_timestamp};
use crate::error::ConfigError;
use crate::generators::{Fossil, Generator, Hydro, Storage, StorageKind, Trace, TraceKind};
use crate::regions::{PolygonId, Region, RegionMap};
use crate::sim::context::{Context, DEFAULT_NSP_LIMIT};
use crate::traces::{DemandProfile, solar_trace, wind_trace};

/// Seed offset between consecutive trace generators.
const TRACE_SEED_STRIDE: u64 = 101;

/// Top-level scenario configuration parsed from TOML.
///
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default. The order of
/// `generators` is the merit order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run window and engine parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Demand source.
    #[serde(default)]
    pub demand: DemandConfig,
    /// Polygon to region mapping.
    #[serde(default)]
    pub regions: Vec<Region>,
    /// Fleet in merit order.
    #[serde(default)]
    pub generators: Vec<GeneratorConfig>,
}

/// Run window and engine parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Non-synchronous penetration limit (0.0–1.0).
    pub nsp_limit: f64,
    /// Regions under study; all mapped regions when omitted.
    pub regions: Option<Vec<String>>,
    /// First simulated hour; defaults to the start of the demand data.
    pub start: Option<NaiveDateTime>,
    /// Last simulated hour (inclusive); defaults to the end of the demand data.
    pub end: Option<NaiveDateTime>,
    /// Emit per-hour dispatch diagnostics.
    pub verbose: bool,
    /// Master random seed for synthetic traces.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nsp_limit: DEFAULT_NSP_LIMIT,
            regions: None,
            start: None,
            end: None,
            verbose: false,
            seed: 42,
        }
    }
}

/// Demand source: a CSV file or a synthetic daily profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    /// Path to an hourly demand CSV. Overrides the synthetic profile.
    pub csv: Option<PathBuf>,
    /// Start of the synthetic profile.
    pub start: NaiveDateTime,
    /// Length of the synthetic profile (hours).
    pub hours: usize,
    /// Mean demand per polygon (MW).
    pub base_mw: f64,
    /// Daily amplitude per polygon (MW).
    pub amp_mw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (MW).
    pub noise_std: f64,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            csv: None,
            start: NaiveDateTime::default(),
            hours: 168,
            base_mw: 600.0,
            amp_mw: 150.0,
            phase_rad: 1.2,
            noise_std: 20.0,
        }
    }
}

/// Generator technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    Fossil,
    Hydro,
    Wind,
    Solar,
    Battery,
    PumpedHydro,
}

/// One generator entry. Fields that do not apply to `kind` are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub kind: GeneratorKind,
    pub name: String,
    pub polygon: PolygonId,
    /// Rated output (MW).
    pub capacity: f64,
    /// Hydro: energy available per run (MWh).
    #[serde(default)]
    pub energy_mwh: Option<f64>,
    /// Wind: long-run mean capacity factor.
    #[serde(default = "default_mean_cf")]
    pub mean_cf: f64,
    /// Wind: AR(1) persistence (0.0–1.0).
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Wind/solar: noise standard deviation.
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,
    /// Solar: sunrise hour (inclusive).
    #[serde(default = "default_sunrise")]
    pub sunrise: u32,
    /// Solar: sunset hour (exclusive).
    #[serde(default = "default_sunset")]
    pub sunset: u32,
    /// Storage: energy capacity (MWh).
    #[serde(default)]
    pub storage_mwh: f64,
    /// Storage: level at reset (0.0–1.0).
    #[serde(default = "default_initial_soc")]
    pub initial_soc: f64,
    /// Storage: round-trip efficiency (0..1.0).
    #[serde(default = "default_rte")]
    pub rte: f64,
}

fn default_mean_cf() -> f64 {
    0.35
}

fn default_alpha() -> f64 {
    0.9
}

fn default_noise_std() -> f64 {
    0.1
}

fn default_sunrise() -> u32 {
    6
}

fn default_sunset() -> u32 {
    18
}

fn default_initial_soc() -> f64 {
    0.5
}

fn default_rte() -> f64 {
    0.8
}

impl GeneratorConfig {
    fn new(kind: GeneratorKind, name: &str, polygon: PolygonId, capacity: f64) -> Self {
        Self {
            kind,
            name: name.to_string(),
            polygon,
            capacity,
            energy_mwh: None,
            mean_cf: default_mean_cf(),
            alpha: default_alpha(),
            noise_std: default_noise_std(),
            sunrise: default_sunrise(),
            sunset: default_sunset(),
            storage_mwh: 0.0,
            initial_soc: default_initial_soc(),
            rte: default_rte(),
        }
    }

    fn with_storage(mut self, storage_mwh: f64, rte: f64) -> Self {
        self.storage_mwh = storage_mwh;
        self.rte = rte;
        self
    }

    /// Instantiates the generator.
    ///
    /// `start` and `hours` size the capacity-factor traces of wind and solar
    /// plants; `seed` drives their noise.
    pub fn build(&self, start: NaiveDateTime, hours: usize, seed: u64) -> Box<dyn Generator> {
        let name = self.name.clone();
        match self.kind {
            GeneratorKind::Fossil => Box::new(Fossil::new(name, self.polygon, self.capacity)),
            GeneratorKind::Hydro => Box::new(Hydro::new(
                name,
                self.polygon,
                self.capacity,
                self.energy_mwh,
            )),
            GeneratorKind::Wind => Box::new(Trace::new(
                name,
                TraceKind::Wind,
                self.polygon,
                self.capacity,
                wind_trace(hours, self.mean_cf, self.alpha, self.noise_std, seed),
            )),
            GeneratorKind::Solar => Box::new(Trace::new(
                name,
                TraceKind::Solar,
                self.polygon,
                self.capacity,
                solar_trace(start, hours, self.sunrise, self.sunset, self.noise_std, seed),
            )),
            GeneratorKind::Battery | GeneratorKind::PumpedHydro => {
                let kind = if self.kind == GeneratorKind::Battery {
                    StorageKind::Battery
                } else {
                    StorageKind::PumpedHydro
                };
                Box::new(Storage::new(
                    name,
                    kind,
                    self.polygon,
                    self.capacity,
                    self.storage_mwh,
                    self.initial_soc,
                    self.rte,
                ))
            }
        }
    }

    fn validate(&self, idx: usize, errors: &mut Vec<ConfigError>) {
        let field = |f: &str| format!("generators[{idx}].{f}");

        if self.name.trim().is_empty() {
            errors.push(ConfigError::new(field("name"), "must not be empty"));
        }
        if !self.capacity.is_finite() || self.capacity < 0.0 {
            errors.push(ConfigError::new(field("capacity"), "must be >= 0"));
        }

        match self.kind {
            GeneratorKind::Hydro => {
                if self.energy_mwh.is_some_and(|e| e < 0.0) {
                    errors.push(ConfigError::new(field("energy_mwh"), "must be >= 0"));
                }
            }
            GeneratorKind::Wind => {
                if !(0.0..=1.0).contains(&self.mean_cf) {
                    errors.push(ConfigError::new(field("mean_cf"), "must be in [0.0, 1.0]"));
                }
                if !(0.0..=1.0).contains(&self.alpha) {
                    errors.push(ConfigError::new(field("alpha"), "must be in [0.0, 1.0]"));
                }
            }
            GeneratorKind::Solar => {
                if self.sunrise >= self.sunset || self.sunset > 24 {
                    errors.push(ConfigError::new(
                        field("sunrise"),
                        "must be < sunset, and sunset must be <= 24",
                    ));
                }
            }
            GeneratorKind::Battery | GeneratorKind::PumpedHydro => {
                if self.storage_mwh < 0.0 {
                    errors.push(ConfigError::new(field("storage_mwh"), "must be >= 0"));
                }
                if !(0.0..=1.0).contains(&self.initial_soc) {
                    errors.push(ConfigError::new(
                        field("initial_soc"),
                        "must be in [0.0, 1.0]",
                    ));
                }
                if !(self.rte > 0.0 && self.rte <= 1.0) {
                    errors.push(ConfigError::new(field("rte"), "must be in (0.0, 1.0]"));
                }
            }
            GeneratorKind::Fossil => {}
        }
        if self.noise_std < 0.0 {
            errors.push(ConfigError::new(field("noise_std"), "must be >= 0"));
        }
    }
}

fn default_regions() -> Vec<Region> {
    vec![
        Region::new("NSW", vec![1, 2]),
        Region::new("VIC", vec![3]),
        Region::new("SA", vec![4]),
    ]
}

fn default_start() -> NaiveDateTime {
    parse_timestamp("2020-01-01 00:00:00").unwrap_or_default()
}

impl ScenarioConfig {
    /// Returns the baseline scenario: three regions, a mixed fleet, one
    /// synthetic week of demand.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            demand: DemandConfig {
                start: default_start(),
                ..DemandConfig::default()
            },
            regions: default_regions(),
            generators: vec![
                GeneratorConfig::new(GeneratorKind::Wind, "SA wind", 4, 800.0),
                GeneratorConfig::new(GeneratorKind::Wind, "VIC wind", 3, 600.0),
                GeneratorConfig::new(GeneratorKind::Solar, "NSW solar", 1, 1000.0),
                GeneratorConfig::new(GeneratorKind::Battery, "SA battery", 4, 200.0)
                    .with_storage(800.0, 0.85),
                GeneratorConfig::new(GeneratorKind::PumpedHydro, "NSW pumped hydro", 2, 500.0)
                    .with_storage(4000.0, 0.8),
                GeneratorConfig {
                    energy_mwh: Some(50_000.0),
                    ..GeneratorConfig::new(GeneratorKind::Hydro, "VIC hydro", 3, 600.0)
                },
                GeneratorConfig::new(GeneratorKind::Fossil, "NSW coal", 1, 1500.0),
                GeneratorConfig::new(GeneratorKind::Fossil, "VIC coal", 3, 800.0),
                GeneratorConfig::new(GeneratorKind::Fossil, "NSW gas", 2, 300.0),
            ],
        }
    }

    /// Returns the high-renewables preset: large wind and solar fleet, most
    /// coal retired, more storage.
    pub fn high_renewables() -> Self {
        Self {
            simulation: SimulationConfig {
                nsp_limit: 0.85,
                ..SimulationConfig::default()
            },
            generators: vec![
                GeneratorConfig::new(GeneratorKind::Wind, "SA wind", 4, 2500.0),
                GeneratorConfig::new(GeneratorKind::Wind, "VIC wind", 3, 2000.0),
                GeneratorConfig::new(GeneratorKind::Solar, "NSW solar", 1, 3000.0),
                GeneratorConfig::new(GeneratorKind::Battery, "SA battery", 4, 800.0)
                    .with_storage(3200.0, 0.85),
                GeneratorConfig::new(GeneratorKind::PumpedHydro, "NSW pumped hydro", 2, 1000.0)
                    .with_storage(12_000.0, 0.8),
                GeneratorConfig {
                    energy_mwh: Some(50_000.0),
                    ..GeneratorConfig::new(GeneratorKind::Hydro, "VIC hydro", 3, 600.0)
                },
                GeneratorConfig::new(GeneratorKind::Fossil, "NSW gas", 2, 300.0),
            ],
            ..Self::baseline()
        }
    }

    /// Returns the constrained-nsp preset: baseline fleet held to 50%
    /// non-synchronous penetration.
    pub fn constrained_nsp() -> Self {
        Self {
            simulation: SimulationConfig {
                nsp_limit: 0.5,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_renewables", "constrained_nsp"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_renewables" => Ok(Self::high_renewables()),
            "constrained_nsp" => Ok(Self::constrained_nsp()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// A relative `demand.csv` path is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        if let (Some(csv), Some(dir)) = (cfg.demand.csv.as_mut(), path.parent()) {
            if csv.is_relative() {
                *csv = dir.join(&*csv);
            }
        }
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if !(0.0..=1.0).contains(&s.nsp_limit) {
            errors.push(ConfigError::new(
                "simulation.nsp_limit",
                "must be in [0.0, 1.0]",
            ));
        }
        if let (Some(start), Some(end)) = (s.start, s.end) {
            if end < start {
                errors.push(ConfigError::new("simulation.end", "must be >= simulation.start"));
            }
        }

        if self.regions.is_empty() {
            errors.push(ConfigError::new("regions", "at least one region is required"));
        }
        if let Err(e) = RegionMap::new(self.regions.clone()) {
            errors.push(e);
        }
        if let Some(selected) = &s.regions {
            for r in selected {
                if !self.regions.iter().any(|region| &region.id == r) {
                    errors.push(ConfigError::new(
                        "simulation.regions",
                        format!("unknown region \"{r}\""),
                    ));
                }
            }
        }

        let d = &self.demand;
        if d.csv.is_none() {
            if d.hours == 0 {
                errors.push(ConfigError::new("demand.hours", "must be > 0"));
            }
            if d.base_mw < 0.0 || d.amp_mw < 0.0 || d.noise_std < 0.0 {
                errors.push(ConfigError::new(
                    "demand",
                    "base_mw, amp_mw and noise_std must be >= 0",
                ));
            }
        }

        if self.generators.is_empty() {
            errors.push(ConfigError::new("generators", "at least one generator is required"));
        }
        for (i, g) in self.generators.iter().enumerate() {
            g.validate(i, &mut errors);
            if !self.regions.iter().any(|r| r.polygons.contains(&g.polygon)) {
                errors.push(ConfigError::new(
                    format!("generators[{i}].polygon"),
                    format!("polygon {} is not in any region", g.polygon),
                ));
            }
        }

        errors
    }

    /// Builds a ready-to-run context.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, or a `ConfigError` if the demand
    /// CSV cannot be loaded.
    pub fn build(&self) -> Result<Context, ConfigError> {
        if let Some(e) = self.validate().into_iter().next() {
            return Err(e);
        }

        let region_map = RegionMap::new(self.regions.clone())?;
        let demand = match &self.demand.csv {
            Some(path) => DemandMatrix::from_csv_path(path)?,
            None => {
                let d = &self.demand;
                let mut polygons: Vec<PolygonId> = self
                    .regions
                    .iter()
                    .flat_map(|r| r.polygons.iter().copied())
                    .collect();
                polygons.sort_unstable();
                let profile = DemandProfile {
                    base_mw: d.base_mw,
                    amp_mw: d.amp_mw,
                    phase_rad: d.phase_rad,
                    noise_std: d.noise_std,
                };
                profile.synthesize(d.start, d.hours, &polygons, self.simulation.seed)?
            }
        };

        let seed = self.simulation.seed;
        let generators = self
            .generators
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let trace_seed = seed.wrapping_add(TRACE_SEED_STRIDE * (i as u64 + 1));
                g.build(demand.first_hour(), demand.hours(), trace_seed)
            })
            .collect();

        let mut ctx = Context::new(region_map, demand, generators);
        if let Some(selected) = &self.simulation.regions {
            ctx.regions = Some(selected.clone());
        }
        ctx.nsp_limit = self.simulation.nsp_limit;
        ctx.verbose = self.simulation.verbose;
        Ok(ctx)
    }
}
