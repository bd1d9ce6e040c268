//! Region and polygon taxonomy.
//!
//! Every demand column and every generator sits in exactly one polygon;
//! polygons aggregate into regions.

use serde::Deserialize;

use crate::error::ConfigError;

/// Identifier of a demand sub-region.
pub type PolygonId = u32;

/// A named group of polygons.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    /// Short region code (e.g., `"NSW"`).
    pub id: String,
    /// Polygons belonging to this region.
    pub polygons: Vec<PolygonId>,
}

impl Region {
    pub fn new(id: impl Into<String>, polygons: Vec<PolygonId>) -> Self {
        Self {
            id: id.into(),
            polygons,
        }
    }
}

/// Static polygon to region mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Builds a map, rejecting duplicate region ids and polygons claimed by
    /// more than one region.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first duplicate found.
    pub fn new(regions: Vec<Region>) -> Result<Self, ConfigError> {
        for (i, region) in regions.iter().enumerate() {
            for other in &regions[i + 1..] {
                if other.id == region.id {
                    return Err(ConfigError::new(
                        "regions",
                        format!("duplicate region id \"{}\"", region.id),
                    ));
                }
                if let Some(p) = other.polygons.iter().find(|p| region.polygons.contains(p)) {
                    return Err(ConfigError::new(
                        "regions",
                        format!(
                            "polygon {p} assigned to both \"{}\" and \"{}\"",
                            region.id, other.id
                        ),
                    ));
                }
            }
        }
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// All region ids in declaration order.
    pub fn ids(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Returns the region that owns `polygon`, if any.
    pub fn region_of(&self, polygon: PolygonId) -> Option<&Region> {
        self.regions.iter().find(|r| r.polygons.contains(&polygon))
    }

    /// Polygons of every region not named in `selected`.
    pub fn polygons_outside<'a>(
        &'a self,
        selected: &'a [String],
    ) -> impl Iterator<Item = PolygonId> + 'a {
        self.regions
            .iter()
            .filter(move |r| !selected.contains(&r.id))
            .flat_map(|r| r.polygons.iter().copied())
    }
}
