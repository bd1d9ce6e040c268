use crate::generators::types::{Generator, GeneratorInfo};
use crate::regions::PolygonId;

/// Storage technology; decides the synchronous flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Inverter-connected, non-synchronous.
    Battery,
    /// Turbine-connected, synchronous.
    PumpedHydro,
}

/// An energy storage unit that charges from other generators' spill.
///
/// `Storage` models a reservoir with an energy limit, a power rating shared
/// by charging and discharging, and a round-trip efficiency applied on the
/// way in. It cannot charge and discharge in the same hour.
///
/// # Energy Convention
/// - `absorb` returns energy taken from the spiller (before losses)
/// - `level` holds energy available for later dispatch (after losses)
#[derive(Debug, Clone)]
pub struct Storage {
    info: GeneratorInfo,

    pub kind: StorageKind,

    /// Usable energy capacity (MWh).
    pub storage_mwh: f64,

    /// Level at reset as a fraction of `storage_mwh` (0.0 to 1.0).
    pub initial_soc: f64,

    /// Round-trip efficiency (0..1.0).
    pub rte: f64,

    /// Current stored energy (MWh).
    level: f64,

    /// Total energy taken from spill since reset (MWh, before losses).
    absorbed_total: f64,

    /// Energy taken so far during `last_charge` (MWh).
    charged_this_hour: f64,

    last_charge: Option<usize>,
    last_discharge: Option<usize>,
}

impl Storage {
    /// Creates a storage unit.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name
    /// * `kind` - Battery or pumped hydro
    /// * `polygon` - Polygon the unit is connected in
    /// * `capacity` - Charge/discharge power rating (MW)
    /// * `storage_mwh` - Energy capacity (MWh, must be >= 0)
    /// * `initial_soc` - Level at reset as a fraction (0.0 to 1.0)
    /// * `rte` - Round-trip efficiency (0..1.0)
    ///
    /// # Panics
    ///
    /// Panics if `storage_mwh` is negative, `initial_soc` is out of range, or
    /// `rte` is not in (0, 1].
    pub fn new(
        name: impl Into<String>,
        kind: StorageKind,
        polygon: PolygonId,
        capacity: f64,
        storage_mwh: f64,
        initial_soc: f64,
        rte: f64,
    ) -> Self {
        assert!(storage_mwh >= 0.0);
        assert!((0.0..=1.0).contains(&initial_soc));
        assert!(rte > 0.0 && rte <= 1.0);

        let mut info = GeneratorInfo::new(name, polygon, capacity).storage();
        info.synchronous = kind == StorageKind::PumpedHydro;

        Self {
            info,
            kind,
            storage_mwh,
            initial_soc,
            rte,
            level: storage_mwh * initial_soc,
            absorbed_total: 0.0,
            charged_this_hour: 0.0,
            last_charge: None,
            last_discharge: None,
        }
    }

    /// Current stored energy (MWh).
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Energy taken from spill since the last reset (MWh).
    pub fn absorbed_total(&self) -> f64 {
        self.absorbed_total
    }
}

impl Generator for Storage {
    fn info(&self) -> &GeneratorInfo {
        &self.info
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.info.capacity = capacity;
    }

    fn reset(&mut self) {
        self.level = self.storage_mwh * self.initial_soc;
        self.absorbed_total = 0.0;
        self.charged_this_hour = 0.0;
        self.last_charge = None;
        self.last_discharge = None;
    }

    fn dispatch(&mut self, hour: usize, demand: f64) -> (f64, f64) {
        if self.last_charge == Some(hour) {
            return (0.0, 0.0);
        }

        let generated = demand.min(self.info.capacity).min(self.level).max(0.0);
        if generated > 0.0 {
            self.level = (self.level - generated).max(0.0);
            self.last_discharge = Some(hour);
        }
        (generated, 0.0)
    }

    fn absorb(&mut self, hour: usize, spill: f64) -> f64 {
        if self.last_discharge == Some(hour) {
            return 0.0;
        }
        if self.last_charge != Some(hour) {
            self.charged_this_hour = 0.0;
        }

        // Rating is shared by every absorb call in the same hour.
        let rate_room = (self.info.capacity - self.charged_this_hour).max(0.0);
        let headroom = (self.storage_mwh - self.level).max(0.0) / self.rte;
        let stored = spill.min(rate_room).min(headroom).max(0.0);
        if stored > 0.0 {
            self.level = (self.level + stored * self.rte).min(self.storage_mwh);
            self.charged_this_hour += stored;
            self.absorbed_total += stored;
            self.last_charge = Some(hour);
        }
        stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery(capacity: f64, storage_mwh: f64, soc: f64, rte: f64) -> Storage {
        Storage::new("Battery", StorageKind::Battery, 1, capacity, storage_mwh, soc, rte)
    }

    #[test]
    fn kind_sets_synchronous_flag() {
        assert!(!battery(10.0, 10.0, 0.0, 1.0).synchronous());
        let phes = Storage::new("PHES", StorageKind::PumpedHydro, 1, 10.0, 10.0, 0.0, 0.8);
        assert!(phes.synchronous());
        assert!(phes.storage_capable());
    }

    #[test]
    fn perfect_efficiency_absorbs_all() {
        let mut b = battery(100.0, 400.0, 0.5, 1.0);
        assert_eq!(b.absorb(0, 50.0), 50.0);
        assert_eq!(b.level(), 250.0);
        assert_eq!(b.absorbed_total(), 50.0);
    }

    #[test]
    fn absorb_limited_by_rating_across_calls() {
        let mut b = battery(30.0, 1000.0, 0.0, 1.0);
        assert_eq!(b.absorb(0, 20.0), 20.0);
        assert_eq!(b.absorb(0, 20.0), 10.0);
        assert_eq!(b.absorb(0, 20.0), 0.0);
        // New hour, fresh rating.
        assert_eq!(b.absorb(1, 20.0), 20.0);
    }

    #[test]
    fn absorb_limited_by_headroom_and_losses() {
        // 10 MWh free, 80% RTE: 12.5 MWh of spill fills it.
        let mut b = battery(100.0, 20.0, 0.5, 0.8);
        let stored = b.absorb(0, 50.0);
        assert!((stored - 12.5).abs() < 1e-9);
        assert!((b.level() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn never_stores_more_than_offered() {
        let mut b = battery(100.0, 1000.0, 0.0, 0.9);
        for offer in [0.0, 0.5, 7.0, 99.0] {
            assert!(b.absorb(0, offer) <= offer);
        }
    }

    #[test]
    fn discharge_limited_by_level_and_rating() {
        let mut b = battery(10.0, 15.0, 1.0, 1.0);
        assert_eq!(b.dispatch(0, 100.0), (10.0, 0.0));
        assert_eq!(b.dispatch(1, 100.0), (5.0, 0.0));
        assert_eq!(b.dispatch(2, 100.0), (0.0, 0.0));
    }

    #[test]
    fn no_charge_and_discharge_in_same_hour() {
        let mut b = battery(10.0, 100.0, 0.5, 1.0);
        b.dispatch(0, 5.0);
        assert_eq!(b.absorb(0, 5.0), 0.0);

        b.absorb(1, 5.0);
        assert_eq!(b.dispatch(1, 5.0), (0.0, 0.0));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut b = battery(10.0, 100.0, 0.25, 1.0);
        b.absorb(0, 10.0);
        b.dispatch(1, 3.0);
        b.reset();
        assert_eq!(b.level(), 25.0);
        assert_eq!(b.absorbed_total(), 0.0);
        assert_eq!(b.absorb(0, 10.0), 10.0);
    }
}
