use tracing::{debug, trace};

use crate::bbox::{BBox, Ltrb};
use crate::config::TrackerConfig;
use crate::detection::{AssignResult, Detection};

/// Base score of a proximity-only candidate, keeps it above zero.
const PROXIMITY_BASE_SCORE: f64 = 0.001;
/// Scale of a proximity-only candidate, keeps it below any overlap match.
const PROXIMITY_SCORE_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    Expired,
    Missed,
}

/// Live state of one tracked object.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: u64,
    pub class: i32,
    pub bbox: BBox<Ltrb>,
    pub score: f64,
    pub hits: u32,
    pub missed: u32,
    pub last_seen: f64,
}

impl Participant {
    pub fn new(id: u64, ts_sec: f64, det: &Detection) -> Self {
        Self {
            id,
            class: det.class,
            bbox: det.bbox(),
            score: det.confidence,
            hits: 1,
            missed: 0,
            last_seen: det.seen_at(ts_sec),
        }
    }

    /// Match score against `det`, `None` when the pair carries no usable
    /// signal. Overlap matches score their IoU; proximity-only matches land
    /// in `(0.001, 0.201]`.
    pub fn match_score(&self, det: &Detection, cfg: &TrackerConfig) -> Option<f64> {
        if det.class != self.class {
            return None;
        }

        let det_bbox = det.bbox();
        let iou = self.bbox.iou(&det_bbox);
        let center = self
            .bbox
            .center_similarity(&det_bbox, cfg.max_center_distance);

        if iou >= cfg.iou_threshold {
            Some(iou)
        } else if center > 0.0 {
            Some(PROXIMITY_BASE_SCORE + PROXIMITY_SCORE_WEIGHT * center)
        } else {
            None
        }
    }

    pub fn update(&mut self, ts_sec: f64, det: &Detection, smoothing_factor: f64) {
        self.bbox = self.bbox.lerp(&det.bbox(), smoothing_factor);
        self.score = det.confidence;
        self.hits += 1;
        self.missed = 0;
        self.last_seen = det.seen_at(ts_sec);
    }

    pub fn stale(&self, ts_sec: f64, cfg: &TrackerConfig) -> Option<PruneReason> {
        if ts_sec - self.last_seen > cfg.max_track_age_seconds {
            Some(PruneReason::Expired)
        } else if self.missed > cfg.missed_tolerance(self.hits) {
            Some(PruneReason::Missed)
        } else {
            None
        }
    }
}

impl From<&Participant> for crate::Track {
    fn from(p: &Participant) -> crate::Track {
        crate::Track {
            track_id: p.id,
            class: p.class,
            confidence: p.score,
            bbox: p.bbox,
            hits: p.hits,
            missed: p.missed,
            last_seen: p.last_seen,
        }
    }
}

/// Pairing of one frame's detections against the live tracks.
#[derive(Debug)]
pub struct DetectionsMapping<'a> {
    timestamp: f64,
    detections: &'a [Detection],
    /// (track index, detection index, score), in commit order
    matched: Vec<(usize, usize, f64)>,
    missed: Vec<usize>,
}

impl<'a> DetectionsMapping<'a> {
    #[inline]
    pub fn matched(&self) -> &[(usize, usize, f64)] {
        &self.matched
    }

    #[inline]
    pub fn missed(&self) -> &[usize] {
        &self.missed
    }
}

pub struct Scene {
    pub config: TrackerConfig,
    pub tracks: Vec<Participant>,
    next_id: u64,
}

impl Scene {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            tracks: Vec::with_capacity(64),
            next_id: 0,
        }
    }

    /// Every usable (track index, detection index, score) pair, best first.
    /// Equal scores keep generation order: lower track index, then lower
    /// detection index.
    fn candidates(&self, detections: &[Detection]) -> Vec<(usize, usize, f64)> {
        let mut candidates = Vec::new();

        for (ti, track) in self.tracks.iter().enumerate() {
            for (di, det) in detections.iter().enumerate() {
                if let Some(score) = track.match_score(det, &self.config) {
                    candidates.push((ti, di, score));
                }
            }
        }

        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));
        candidates
    }

    fn assignment(&self, detections: &[Detection]) -> (Vec<(usize, usize, f64)>, Vec<usize>) {
        let mut track_used = vec![false; self.tracks.len()];
        let mut det_used = vec![false; detections.len()];
        let mut assignments = Vec::new();

        for (ti, di, score) in self.candidates(detections) {
            if track_used[ti] || det_used[di] {
                continue;
            }

            track_used[ti] = true;
            det_used[di] = true;
            assignments.push((ti, di, score));
        }

        let missed = det_used
            .iter()
            .enumerate()
            .filter(|&(_, &used)| !used)
            .map(|(di, _)| di)
            .collect();

        (assignments, missed)
    }

    pub fn map_detections<'a>(
        &self,
        ts_sec: f64,
        detections: &'a [Detection],
    ) -> DetectionsMapping<'a> {
        let (matched, missed) = self.assignment(detections);

        DetectionsMapping {
            timestamp: ts_sec,
            detections,
            matched,
            missed,
        }
    }

    /// Applies a mapping: updates matched tracks, spawns tracks for missed
    /// detections, ages every track not matched (new ones included) and
    /// prunes. Results are in detection order.
    pub fn update(&mut self, mapping: DetectionsMapping<'_>) -> Vec<AssignResult> {
        let time = mapping.timestamp;
        let dets = mapping.detections;
        let alpha = self.config.smoothing_factor;

        let mut results = Vec::with_capacity(dets.len());
        let mut track_used = vec![false; self.tracks.len()];

        for &(i, j, score) in mapping.matched() {
            let track = &mut self.tracks[i];
            track.update(time, &dets[j], alpha);
            track_used[i] = true;

            trace!(track_id = track.id, detection = j, score, "matched");

            results.push(AssignResult {
                detection_index: j,
                track_id: track.id,
                bbox: track.bbox,
            });
        }

        for &j in mapping.missed() {
            let track = Participant::new(self.next_id, time, &dets[j]);
            self.next_id += 1;

            trace!(track_id = track.id, class = track.class, detection = j, "spawned");

            results.push(AssignResult {
                detection_index: j,
                track_id: track.id,
                bbox: track.bbox,
            });
            self.tracks.push(track);
        }

        // spawned tracks were not committed either, they age too
        track_used.resize(self.tracks.len(), false);
        for (t, used) in self.tracks.iter_mut().zip(&track_used) {
            if !used {
                t.missed += 1;
            }
        }

        let pruned = self.prune(time);

        debug!(
            matched = mapping.matched().len(),
            spawned = mapping.missed().len(),
            pruned,
            live = self.tracks.len(),
            "frame processed"
        );

        results.sort_by_key(|r| r.detection_index);
        results
    }

    /// Drops stale tracks, returns how many were removed.
    pub fn prune(&mut self, ts_sec: f64) -> usize {
        let before = self.tracks.len();
        let config = self.config;

        self.tracks.retain(|t| match t.stale(ts_sec, &config) {
            Some(reason) => {
                debug!(
                    track_id = t.id,
                    ?reason,
                    hits = t.hits,
                    missed = t.missed,
                    "track pruned"
                );
                false
            }
            None => true,
        });

        before - self.tracks.len()
    }

    pub fn tracks(&self) -> Vec<crate::Track> {
        self.tracks.iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn det(class: i32, x1: f64, y1: f64, x2: f64, y2: f64) -> Detection {
        Detection::new(class, 0.9, BBox::ltrb(x1, y1, x2, y2))
    }

    fn scene_with(dets: &[Detection]) -> Scene {
        let mut scene = Scene::new(TrackerConfig::default());
        let mapping = scene.map_detections(0.0, dets);
        scene.update(mapping);
        scene
    }

    #[test]
    fn test_overlap_score_is_iou() {
        let track = Participant::new(0, 0.0, &det(0, 0.0, 0.0, 10.0, 10.0));
        let score = track
            .match_score(&det(0, 0.0, 0.0, 10.0, 10.0), &TrackerConfig::default())
            .unwrap();

        assert_relative_eq!(score, 1.0);
    }

    #[test]
    fn test_proximity_score_is_bounded() {
        let cfg = TrackerConfig::default();
        let track = Participant::new(0, 0.0, &det(0, 0.0, 0.0, 10.0, 10.0));

        // centers 20px apart, no overlap
        let score = track
            .match_score(&det(0, 20.0, 0.0, 30.0, 10.0), &cfg)
            .unwrap();
        assert_relative_eq!(score, 0.001 + 0.2 * 0.75, epsilon = 1e-12);
        assert!(score > 0.001 && score < 0.201);

        // inverted box at the same center: zero IoU, full proximity
        let score = track
            .match_score(&det(0, 10.0, 10.0, 0.0, 0.0), &cfg)
            .unwrap();
        assert_relative_eq!(score, 0.201, epsilon = 1e-12);
    }

    #[test]
    fn test_no_signal_and_class_mismatch_are_skipped() {
        let cfg = TrackerConfig::default();
        let track = Participant::new(0, 0.0, &det(0, 0.0, 0.0, 10.0, 10.0));

        assert!(track.match_score(&det(0, 200.0, 0.0, 210.0, 10.0), &cfg).is_none());
        assert!(track.match_score(&det(1, 0.0, 0.0, 10.0, 10.0), &cfg).is_none());
    }

    #[test]
    fn test_greedy_commits_best_pair_first() {
        let scene = scene_with(&[det(0, 0.0, 0.0, 10.0, 10.0), det(0, 100.0, 0.0, 110.0, 10.0)]);

        // second detection overlaps track 1 perfectly, first one only partially overlaps track 0
        let dets = [det(0, 2.0, 0.0, 12.0, 10.0), det(0, 100.0, 0.0, 110.0, 10.0)];
        let mapping = scene.map_detections(0.1, &dets);

        assert_eq!(mapping.matched()[0].0, 1);
        assert_eq!(mapping.matched()[0].1, 1);
        assert_eq!(mapping.matched()[1].0, 0);
        assert_eq!(mapping.matched()[1].1, 0);
        assert!(mapping.missed().is_empty());
    }

    #[test]
    fn test_each_track_claimed_once() {
        let scene = scene_with(&[det(0, 0.0, 0.0, 10.0, 10.0)]);

        let dets = [det(0, 0.0, 0.0, 10.0, 10.0), det(0, 0.0, 0.0, 10.0, 10.0)];
        let mapping = scene.map_detections(0.1, &dets);

        assert_eq!(mapping.matched().len(), 1);
        assert_eq!(mapping.missed().len(), 1);
    }

    #[test]
    fn test_spawned_tracks_age_in_creation_frame() {
        let scene = scene_with(&[det(0, 0.0, 0.0, 10.0, 10.0), det(2, 50.0, 50.0, 60.0, 60.0)]);

        assert_eq!(scene.tracks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1]);
        for t in &scene.tracks {
            assert_eq!(t.hits, 1);
            assert_eq!(t.missed, 1);
        }
    }

    #[test]
    fn test_zero_tolerance_drops_unconfirmed_track_at_once() {
        let mut scene = Scene::new(TrackerConfig::default().with_max_missed_frames(0));
        let dets = [det(0, 0.0, 0.0, 10.0, 10.0)];

        let mapping = scene.map_detections(0.0, &dets);
        let results = scene.update(mapping);

        assert_eq!(results.len(), 1);
        assert!(scene.tracks.is_empty());
    }

    #[test]
    fn test_immature_track_pruned_after_two_misses() {
        let mut scene = scene_with(&[det(0, 0.0, 0.0, 10.0, 10.0)]);
        let elsewhere = [det(1, 500.0, 500.0, 510.0, 510.0)];
        assert_eq!(scene.tracks[0].missed, 1);

        let mapping = scene.map_detections(0.1, &elsewhere);
        scene.update(mapping);
        let track = scene.tracks.iter().find(|t| t.id == 0).unwrap();
        assert_eq!(track.missed, 2);

        let mapping = scene.map_detections(0.2, &elsewhere);
        scene.update(mapping);
        assert!(scene.tracks.iter().all(|t| t.id != 0));
    }

    #[test]
    fn test_expired_track_pruned() {
        let mut scene = scene_with(&[det(0, 0.0, 0.0, 10.0, 10.0)]);

        assert_eq!(scene.prune(2.0), 0);
        assert_eq!(scene.tracks[0].stale(2.5, &scene.config), Some(PruneReason::Expired));
        assert_eq!(scene.prune(2.5), 1);
    }
}
