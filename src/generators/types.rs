//! Common types and the capability contract shared by every generator.

use std::fmt;

use crate::regions::{PolygonId, RegionMap};

/// Static attributes of a generator.
///
/// # Fields
/// * `name` - Display name used in logs and reports
/// * `polygon` - Polygon the unit is connected in
/// * `capacity` - Rated output (MW)
/// * `synchronous` - `false` if output counts against the non-synchronous cap
/// * `storage_capable` - `true` if the unit can absorb spill from others
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorInfo {
    pub name: String,
    pub polygon: Option<PolygonId>,
    pub capacity: f64,
    pub synchronous: bool,
    pub storage_capable: bool,
}

impl GeneratorInfo {
    pub fn new(name: impl Into<String>, polygon: PolygonId, capacity: f64) -> Self {
        Self {
            name: name.into(),
            polygon: Some(polygon),
            capacity,
            synchronous: true,
            storage_capable: false,
        }
    }

    pub fn non_synchronous(mut self) -> Self {
        self.synchronous = false;
        self
    }

    pub fn storage(mut self) -> Self {
        self.storage_capable = true;
        self
    }

    /// Region id derived from the polygon assignment.
    pub fn region<'a>(&self, map: &'a RegionMap) -> Option<&'a str> {
        self.polygon
            .and_then(|p| map.region_of(p))
            .map(|r| r.id.as_str())
    }
}

impl fmt::Display for GeneratorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.polygon {
            Some(p) => write!(f, "{} (polygon {p}:{:.2} MW)", self.name, self.capacity),
            None => write!(f, "{} (unassigned:{:.2} MW)", self.name, self.capacity),
        }
    }
}

/// A unit that can be offered demand each hour and, optionally, absorb spill.
///
/// Implementations own all their per-run state. The engine guarantees
/// hours arrive in chronological order after a single `reset`.
pub trait Generator {
    /// Static attributes.
    fn info(&self) -> &GeneratorInfo;

    /// Sets the rated output (MW).
    fn set_capacity(&mut self, capacity: f64);

    /// Clears per-run state (e.g., storage level back to its initial value).
    fn reset(&mut self);

    /// Offers `demand` MWh for `hour`.
    ///
    /// # Returns
    ///
    /// `(generated, spilled)` where `generated <= demand` and `spilled >= 0`
    /// is surplus the unit could not deliver.
    fn dispatch(&mut self, hour: usize, demand: f64) -> (f64, f64);

    /// Offers `spill` MWh of surplus for storage and returns the amount taken.
    ///
    /// The return value never exceeds `spill`. Units that cannot store keep
    /// the default, which takes nothing.
    fn absorb(&mut self, _hour: usize, _spill: f64) -> f64 {
        0.0
    }

    fn name(&self) -> &str {
        &self.info().name
    }

    fn capacity(&self) -> f64 {
        self.info().capacity
    }

    fn synchronous(&self) -> bool {
        self.info().synchronous
    }

    fn storage_capable(&self) -> bool {
        self.info().storage_capable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::Region;

    #[test]
    fn builder_flags() {
        let info = GeneratorInfo::new("Battery", 3, 50.0)
            .non_synchronous()
            .storage();
        assert!(!info.synchronous);
        assert!(info.storage_capable);
        assert_eq!(info.polygon, Some(3));
    }

    #[test]
    fn region_is_derived_from_polygon() {
        let map = RegionMap::new(vec![Region::new("SA", vec![3])]).expect("valid map");
        let info = GeneratorInfo::new("Wind", 3, 100.0);
        assert_eq!(info.region(&map), Some("SA"));

        let unassigned = GeneratorInfo {
            polygon: None,
            ..info
        };
        assert_eq!(unassigned.region(&map), None);
    }

    #[test]
    fn display_shows_polygon_and_capacity() {
        let info = GeneratorInfo::new("Coal", 1, 600.0);
        assert_eq!(info.to_string(), "Coal (polygon 1:600.00 MW)");
    }
}
