use std::rc::Rc;

use crate::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::detection::{AssignResult, Detection};
use crate::scene::Scene;
use crate::{Frame, Track};

/// Greedy IoU / center-distance tracker with exponential box smoothing.
///
/// One instance follows one stream. `process` takes `&mut self`, so calls
/// on an instance are serialized by construction; share it across threads
/// behind a `Mutex` if needed.
pub struct BBoxTracker<C: Clock = SystemClock> {
    scene: Scene,
    clock: C,
}

impl BBoxTracker<SystemClock> {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for BBoxTracker<SystemClock> {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl<C: Clock> BBoxTracker<C> {
    pub fn with_clock(config: TrackerConfig, clock: C) -> Self {
        Self {
            scene: Scene::new(config),
            clock,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.scene.config
    }

    /// Tracks one frame of detections, reading "now" from the clock.
    ///
    /// Returns one result per detection, in input order.
    pub fn process(&mut self, detections: &[Detection]) -> Vec<AssignResult> {
        let now = self.clock.now();
        self.process_at(now, detections)
    }

    /// Like [`process`](Self::process), with an explicit "now" in seconds.
    /// Detections carrying their own timestamp still use it as last-seen.
    pub fn process_at(&mut self, now: f64, detections: &[Detection]) -> Vec<AssignResult> {
        if detections.is_empty() {
            self.scene.prune(now);
            return Vec::new();
        }

        let mapping = self.scene.map_detections(now, detections);
        self.scene.update(mapping)
    }

    /// Snapshot of the live tracks, ordered by id.
    pub fn tracks(&self) -> Vec<Track> {
        self.scene.tracks()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scene.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scene.tracks.is_empty()
    }
}

impl<C: Clock> crate::Tracking for BBoxTracker<C> {
    #[inline]
    fn update(&mut self, frame: &Frame) -> Vec<AssignResult> {
        self.process_at(frame.timestamp, &frame.detections)
    }

    #[inline]
    fn tracks(&self) -> Rc<[Track]> {
        self.scene.tracks().into_boxed_slice().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::clock::ManualClock;
    use crate::Tracking;

    fn det(class: i32, x1: f64, y1: f64, x2: f64, y2: f64) -> Detection {
        Detection::new(class, 0.9, BBox::ltrb(x1, y1, x2, y2))
    }

    #[test]
    fn test_empty_frame_only_prunes() {
        let clock = ManualClock::new(100.0);
        let mut tracker = BBoxTracker::with_clock(TrackerConfig::default(), clock.clone());

        tracker.process(&[det(0, 0.0, 0.0, 10.0, 10.0)]);

        clock.advance(0.5);
        assert!(tracker.process(&[]).is_empty());
        // aged once in its creation frame, the empty frame leaves it alone
        assert_eq!(tracker.tracks()[0].missed, 1);

        clock.advance(2.0);
        assert!(tracker.process(&[]).is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_detection_timestamp_overrides_clock() {
        let clock = ManualClock::new(100.0);
        let mut tracker = BBoxTracker::with_clock(TrackerConfig::default(), clock);

        tracker.process(&[det(0, 0.0, 0.0, 10.0, 10.0).with_timestamp(99.5)]);
        assert_eq!(tracker.tracks()[0].last_seen, 99.5);

        tracker.process(&[det(0, 0.0, 0.0, 10.0, 10.0)]);
        assert_eq!(tracker.tracks()[0].last_seen, 100.0);
    }

    #[test]
    fn test_tracking_trait_uses_frame_time() {
        let mut tracker = BBoxTracker::new(TrackerConfig::default());

        let frame = Frame::new(1.0, vec![det(0, 0.0, 0.0, 10.0, 10.0)]);
        let res = Tracking::update(&mut tracker, &frame);
        assert_eq!(res.len(), 1);

        let tracks = Tracking::tracks(&tracker);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].last_seen, 1.0);

        // far in the future relative to the frame clock
        Tracking::update(&mut tracker, &Frame::new(10.0, vec![]));
        assert!(Tracking::tracks(&tracker).is_empty());
    }
}
