use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::{Error, Result};

/// One detector output: class, confidence and a left-top-right-bottom box
/// in image pixels. `timestamp` of `0.0` means "not set".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(rename = "c")]
    pub class: i32,
    #[serde(rename = "p")]
    pub confidence: f64,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(rename = "ts", default, skip_serializing_if = "is_unset")]
    pub timestamp: f64,
}

#[inline]
fn is_unset(ts: &f64) -> bool {
    *ts == 0.0
}

impl Detection {
    #[inline]
    pub fn new(class: i32, confidence: f64, bbox: BBox<Ltrb>) -> Self {
        Self {
            class,
            confidence,
            x1: bbox.left(),
            y1: bbox.top(),
            x2: bbox.right(),
            y2: bbox.bottom(),
            timestamp: 0.0,
        }
    }

    #[inline]
    pub fn with_timestamp(mut self, ts: f64) -> Self {
        self.timestamp = ts;
        self
    }

    /// Decodes `(class, conf, x1, y1, x2, y2, [ts])`. The class must be an
    /// integral `i32` value.
    pub fn from_tuple(fields: &[f64]) -> Result<Self> {
        let (class, confidence, x1, y1, x2, y2, timestamp) = match *fields {
            [class, confidence, x1, y1, x2, y2] => (class, confidence, x1, y1, x2, y2, 0.0),
            [class, confidence, x1, y1, x2, y2, ts] => (class, confidence, x1, y1, x2, y2, ts),
            _ => return Err(Error::MalformedDetection(fields.len())),
        };

        if !class.is_finite()
            || class.fract() != 0.0
            || class < i32::MIN as f64
            || class > i32::MAX as f64
        {
            return Err(Error::InvalidClass(class));
        }

        Ok(Self {
            class: class as i32,
            confidence,
            x1,
            y1,
            x2,
            y2,
            timestamp,
        })
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltrb> {
        BBox::ltrb(self.x1, self.y1, self.x2, self.y2)
    }

    /// The detection's own timestamp when set, `now` otherwise.
    #[inline]
    pub fn seen_at(&self, now: f64) -> f64 {
        if self.timestamp > 0.0 {
            self.timestamp
        } else {
            now
        }
    }
}

/// Outcome of tracking one detection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AssignResult {
    pub detection_index: usize,
    pub track_id: u64,
    pub bbox: BBox<Ltrb>,
}

impl AssignResult {
    #[inline]
    pub fn as_tuple(&self) -> (usize, u64, (f64, f64, f64, f64)) {
        let [x1, y1, x2, y2]: [f64; 4] = self.bbox.into();

        (self.detection_index, self.track_id, (x1, y1, x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tuple() {
        let det = Detection::from_tuple(&[3.0, 0.75, 1.0, 2.0, 11.0, 12.0]).unwrap();

        assert_eq!(det.class, 3);
        assert_eq!(det.bbox(), BBox::ltrb(1.0, 2.0, 11.0, 12.0));
        assert_eq!(det.timestamp, 0.0);

        let det = Detection::from_tuple(&[0.0, 0.5, 0.0, 0.0, 1.0, 1.0, 42.5]).unwrap();
        assert_eq!(det.timestamp, 42.5);
    }

    #[test]
    fn test_from_short_tuple_fails() {
        let err = Detection::from_tuple(&[0.0, 0.9, 1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::MalformedDetection(5)));
    }

    #[test]
    fn test_from_long_tuple_fails() {
        let err = Detection::from_tuple(&[0.0, 0.9, 0.0, 0.0, 1.0, 1.0, 5.0, 6.0]).unwrap_err();
        assert!(matches!(err, Error::MalformedDetection(8)));
    }

    #[test]
    fn test_fractional_class_fails() {
        let err = Detection::from_tuple(&[1.7, 0.9, 0.0, 0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidClass(c) if c == 1.7));
    }

    #[test]
    fn test_non_finite_class_fails() {
        for class in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let res = Detection::from_tuple(&[class, 0.9, 0.0, 0.0, 1.0, 1.0]);
            assert!(matches!(res, Err(Error::InvalidClass(_))));
        }
    }

    #[test]
    fn test_out_of_range_class_fails() {
        let res = Detection::from_tuple(&[3e9, 0.9, 0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(res, Err(Error::InvalidClass(_))));

        let res = Detection::from_tuple(&[-3e9, 0.9, 0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(res, Err(Error::InvalidClass(_))));

        let det = Detection::from_tuple(&[-1.0, 0.9, 0.0, 0.0, 1.0, 1.0]).unwrap();
        assert_eq!(det.class, -1);
    }

    #[test]
    fn test_json_short_names() {
        let det: Detection =
            serde_json::from_str(r#"{"c": 1, "p": 0.8, "x1": 0, "y1": 0, "x2": 4, "y2": 4}"#)
                .unwrap();

        assert_eq!(det, Detection::new(1, 0.8, BBox::ltrb(0.0, 0.0, 4.0, 4.0)));
        assert_eq!(det.seen_at(7.0), 7.0);
        assert_eq!(det.with_timestamp(3.0).seen_at(7.0), 3.0);
    }

    #[test]
    fn test_missing_field_fails_at_boundary() {
        let res = serde_json::from_str::<Detection>(r#"{"c": 1, "p": 0.8, "x1": 0}"#);
        assert!(res.is_err());
    }
}
