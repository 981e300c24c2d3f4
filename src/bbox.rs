use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::math;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

/// X-y-width-height format, contains coordinates of the center of bbox and width-height
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Xywh;
impl BBoxFormat for Xywh {}

/// Box in image pixels. Serialized as a bare `[f64; 4]`.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(transparent)]
pub struct BBox<F: BBoxFormat>([f64; 4], #[serde(skip)] PhantomData<F>);

impl<F: BBoxFormat> From<BBox<F>> for [f64; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f64; 4] {
        &self.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        BBox([x1, y1, x2, y2], PhantomData)
    }

    #[inline]
    pub fn as_xywh(&self) -> BBox<Xywh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f64 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f64 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f64 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f64 {
        self.0[3]
    }

    /// Inverted boxes have zero area.
    #[inline]
    pub fn area(&self) -> f64 {
        (self.right() - self.left()).max(0.0) * (self.bottom() - self.top()).max(0.0)
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f64> {
        na::Point2::new(
            (self.left() + self.right()) * 0.5,
            (self.top() + self.bottom()) * 0.5,
        )
    }

    pub fn iou(&self, other: &BBox<Ltrb>) -> f64 {
        let i_w = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let i_h = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        let i_area = i_w * i_h;

        if i_area <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - i_area;

        if union > 0.0 {
            i_area / union
        } else {
            0.0
        }
    }

    /// Linear falloff of center distance: 1.0 for coincident centers, 0.0 at
    /// `max_dist` and beyond. A non-positive `max_dist` disables it.
    pub fn center_similarity(&self, other: &BBox<Ltrb>, max_dist: f64) -> f64 {
        if max_dist <= 0.0 {
            return 0.0;
        }

        let dist = na::distance(&self.center(), &other.center());
        if dist > max_dist {
            return 0.0;
        }

        (1.0 - dist / max_dist).max(0.0)
    }

    /// Exponential moving average towards `next`, component-wise.
    #[inline]
    pub fn lerp(&self, next: &BBox<Ltrb>, factor: f64) -> BBox<Ltrb> {
        BBox(
            [
                math::lerp(self.0[0], next.0[0], factor),
                math::lerp(self.0[1], next.0[1], factor),
                math::lerp(self.0[2], next.0[2], factor),
                math::lerp(self.0[3], next.0[3], factor),
            ],
            PhantomData,
        )
    }
}

impl BBox<Xywh> {
    #[inline]
    pub fn xywh(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        BBox([cx, cy, w, h], PhantomData)
    }

    #[inline(always)]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    #[inline(always)]
    pub fn cx(&self) -> f64 {
        self.0[0]
    }

    #[inline(always)]
    pub fn cy(&self) -> f64 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f64 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f64 {
        self.0[3]
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Xywh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self(
            [
                (v.0[0] + v.0[2]) * 0.5,
                (v.0[1] + v.0[3]) * 0.5,
                v.0[2] - v.0[0],
                v.0[3] - v.0[1],
            ],
            PhantomData,
        )
    }
}

impl<'a> From<&'a BBox<Xywh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Xywh>) -> Self {
        let w2 = v.0[2] / 2.0;
        let h2 = v.0[3] / 2.0;

        Self(
            [v.0[0] - w2, v.0[1] - h2, v.0[0] + w2, v.0[1] + h2],
            PhantomData,
        )
    }
}
