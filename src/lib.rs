//! Numerical core of an aerial-vehicle perception pipeline: a greedy
//! single-stream bounding-box tracker, plus the geodesic and route helpers
//! its callers use to put tracked objects on the map.

pub mod bbox;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod geo;
pub mod math;
pub mod route;
pub mod tracker;

mod scene;
mod track;

pub use config::TrackerConfig;
pub use detection::{AssignResult, Detection};
pub use error::{Error, Result};
pub use frame::Frame;
pub use track::Track;
pub use tracker::BBoxTracker;

use std::rc::Rc;

pub trait Tracking {
    fn update(&mut self, frame: &Frame) -> Vec<AssignResult>;
    fn tracks(&self) -> Rc<[Track]>;
}
