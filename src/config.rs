use serde_derive::{Deserialize, Serialize};
use std::io::Read;

use crate::error::Result;

/// Immature tracks never tolerate more than this many consecutive misses.
const IMMATURE_MAX_MISSED: u32 = 2;

/// Tuning knobs of the bounding-box tracker.
///
/// Values are taken as-is: nothing here is range-checked, so out-of-range
/// settings simply change how the tracker behaves (e.g. a `smoothing_factor`
/// of 0.0 freezes every track at its first box).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Weight of the new detection when blending it into the track's box
    #[serde(alias = "alpha")]
    pub smoothing_factor: f64,

    /// In px; centers further apart than this have zero proximity similarity
    #[serde(alias = "max_center_distance_px")]
    pub max_center_distance: f64,

    /// Minimum IoU for a match on overlap grounds
    pub iou_threshold: f64,

    /// Seconds since the last match after which a track is dropped
    #[serde(alias = "max_age_seconds")]
    pub max_track_age_seconds: f64,

    /// Tracks with fewer hits use the stricter missed-frame tolerance
    #[serde(alias = "min_hits")]
    pub min_hits_for_grace: u32,

    /// Consecutive unmatched frames a mature track survives
    #[serde(alias = "max_missed")]
    pub max_missed_frames: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.5,
            max_center_distance: 80.0,
            iou_threshold: 0.25,
            max_track_age_seconds: 2.0,
            min_hits_for_grace: 2,
            max_missed_frames: 10,
        }
    }
}

impl TrackerConfig {
    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    #[inline]
    pub fn with_smoothing_factor(mut self, value: f64) -> Self {
        self.smoothing_factor = value;
        self
    }

    #[inline]
    pub fn with_max_center_distance(mut self, value: f64) -> Self {
        self.max_center_distance = value;
        self
    }

    #[inline]
    pub fn with_iou_threshold(mut self, value: f64) -> Self {
        self.iou_threshold = value;
        self
    }

    #[inline]
    pub fn with_max_track_age_seconds(mut self, value: f64) -> Self {
        self.max_track_age_seconds = value;
        self
    }

    #[inline]
    pub fn with_min_hits_for_grace(mut self, value: u32) -> Self {
        self.min_hits_for_grace = value;
        self
    }

    #[inline]
    pub fn with_max_missed_frames(mut self, value: u32) -> Self {
        self.max_missed_frames = value;
        self
    }

    /// Missed-frame tolerance for a track with `hits` matches so far.
    #[inline]
    pub fn missed_tolerance(&self, hits: u32) -> u32 {
        if hits >= self.min_hits_for_grace {
            self.max_missed_frames
        } else {
            IMMATURE_MAX_MISSED.min(self.max_missed_frames)
        }
    }
}
