//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDateTime;
use dispatch_sim::demand::{DemandMatrix, parse_timestamp};
use dispatch_sim::generators::{Generator, GeneratorInfo};
use dispatch_sim::regions::{PolygonId, Region, RegionMap};
use dispatch_sim::sim::Context;

pub fn ts(s: &str) -> NaiveDateTime {
    parse_timestamp(s).expect("valid timestamp")
}

/// Single region "NSW" holding polygon 1.
pub fn single_region() -> RegionMap {
    RegionMap::new(vec![Region::new("NSW", vec![1])]).expect("valid map")
}

/// Regions "NSW" (polygons 1, 2) and "VIC" (polygon 3).
pub fn two_regions() -> RegionMap {
    RegionMap::new(vec![
        Region::new("NSW", vec![1, 2]),
        Region::new("VIC", vec![3]),
    ])
    .expect("valid map")
}

/// Demand starting 2020-01-01 00:00 with one row per hour.
pub fn demand(polygons: &[PolygonId], rows: Vec<Vec<f64>>) -> DemandMatrix {
    DemandMatrix::new(ts("2020-01-01 00:00:00"), polygons.to_vec(), rows).expect("valid demand")
}

/// Context over the single-region map with flat demand on polygon 1.
pub fn single_region_context(hourly: &[f64], generators: Vec<Box<dyn Generator>>) -> Context {
    let rows = hourly.iter().map(|d| vec![*d]).collect();
    Context::new(single_region(), demand(&[1], rows), generators)
}

/// One observed call on a wrapped generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Dispatch {
        hour: usize,
        generator: String,
        offered: f64,
        generated: f64,
        spilled: f64,
    },
    Absorb {
        hour: usize,
        generator: String,
        offered: f64,
        stored: f64,
    },
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Forwards to an inner generator and logs every call.
pub struct Recorder {
    inner: Box<dyn Generator>,
    log: CallLog,
}

impl Recorder {
    pub fn wrap(inner: Box<dyn Generator>, log: &CallLog) -> Box<dyn Generator> {
        Box::new(Self {
            inner,
            log: Rc::clone(log),
        })
    }
}

impl Generator for Recorder {
    fn info(&self) -> &GeneratorInfo {
        self.inner.info()
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.inner.set_capacity(capacity);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn dispatch(&mut self, hour: usize, demand: f64) -> (f64, f64) {
        let (generated, spilled) = self.inner.dispatch(hour, demand);
        self.log.borrow_mut().push(Call::Dispatch {
            hour,
            generator: self.inner.name().to_string(),
            offered: demand,
            generated,
            spilled,
        });
        (generated, spilled)
    }

    fn absorb(&mut self, hour: usize, spill: f64) -> f64 {
        let stored = self.inner.absorb(hour, spill);
        self.log.borrow_mut().push(Call::Absorb {
            hour,
            generator: self.inner.name().to_string(),
            offered: spill,
            stored,
        });
        stored
    }
}

/// Wraps every generator of `ctx` in a [`Recorder`] sharing one log.
pub fn record_all(ctx: &mut Context) -> CallLog {
    let log = CallLog::default();
    ctx.generators = ctx
        .generators
        .drain(..)
        .map(|g| Recorder::wrap(g, &log))
        .collect();
    log
}

/// Broken unit that delivers more than it is offered.
pub struct Overdeliver(pub GeneratorInfo);

impl Generator for Overdeliver {
    fn info(&self) -> &GeneratorInfo {
        &self.0
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.0.capacity = capacity;
    }

    fn reset(&mut self) {}

    fn dispatch(&mut self, _hour: usize, demand: f64) -> (f64, f64) {
        (demand + 1.0, 0.0)
    }
}

/// Broken storage unit that claims more than it is offered.
pub struct Overabsorb(pub GeneratorInfo);

impl Generator for Overabsorb {
    fn info(&self) -> &GeneratorInfo {
        &self.0
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.0.capacity = capacity;
    }

    fn reset(&mut self) {}

    fn dispatch(&mut self, _hour: usize, _demand: f64) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn absorb(&mut self, _hour: usize, spill: f64) -> f64 {
        spill * 2.0
    }
}

/// Broken unit that reports negative spill.
pub struct NegativeSpiller(pub GeneratorInfo);

impl Generator for NegativeSpiller {
    fn info(&self) -> &GeneratorInfo {
        &self.0
    }

    fn set_capacity(&mut self, capacity: f64) {
        self.0.capacity = capacity;
    }

    fn reset(&mut self) {}

    fn dispatch(&mut self, _hour: usize, demand: f64) -> (f64, f64) {
        (demand.min(self.0.capacity), -1.0)
    }
}
