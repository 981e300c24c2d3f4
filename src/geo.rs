use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::error::{Error, Result};
use crate::math;

/// Mean Earth radius, used for great-circle distances and ENU offsets.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 equatorial radius, used by the equirectangular local frame.
pub const WGS84_RADIUS_M: f64 = 6_378_137.0;

/// Rays flatter than this never reach the ground.
const MIN_RAY_DZ: f64 = 1e-6;

/// Latitude/longitude in degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Camera position above flat ground and its attitude (radians).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: GeoPoint,
    pub alt_m: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Pinhole intrinsics in pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

/// Haversine great-circle distance in meters.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let h = math::haversine(
        a.lat.to_radians(),
        a.lon.to_radians(),
        b.lat.to_radians(),
        b.lon.to_radians(),
    );

    EARTH_RADIUS_M * math::central_angle(h)
}

/// Element-wise [`distance_m`] over paired coordinate vectors.
pub fn distance_many(lats1: &[f64], lons1: &[f64], lats2: &[f64], lons2: &[f64]) -> Result<Vec<f64>> {
    Error::check_lengths(
        "distance_many",
        lats1.len(),
        &[lons1.len(), lats2.len(), lons2.len()],
    )?;

    Ok((0..lats1.len())
        .map(|i| {
            distance_m(
                GeoPoint::new(lats1[i], lons1[i]),
                GeoPoint::new(lats2[i], lons2[i]),
            )
        })
        .collect())
}

/// Moves `origin` by a local east/north displacement in meters.
pub fn offset(origin: GeoPoint, dx_east_m: f64, dy_north_m: f64) -> GeoPoint {
    let d_lat = dy_north_m / EARTH_RADIUS_M;
    let d_lon = dx_east_m / (EARTH_RADIUS_M * origin.lat.to_radians().cos());

    GeoPoint::new(
        origin.lat + d_lat.to_degrees(),
        origin.lon + d_lon.to_degrees(),
    )
}

/// Equirectangular projection of `p` into meters east/north of `origin`.
pub fn to_local(origin: GeoPoint, p: GeoPoint) -> na::Vector2<f64> {
    let d_lat = (p.lat - origin.lat).to_radians();
    let d_lon = (p.lon - origin.lon).to_radians();

    na::Vector2::new(
        d_lon * WGS84_RADIUS_M * origin.lat.to_radians().cos(),
        d_lat * WGS84_RADIUS_M,
    )
}

/// Inverse of [`to_local`].
pub fn from_local(origin: GeoPoint, v: na::Vector2<f64>) -> GeoPoint {
    let d_lat = v.y / WGS84_RADIUS_M;
    let d_lon = v.x / (WGS84_RADIUS_M * origin.lat.to_radians().cos());

    GeoPoint::new(
        origin.lat + d_lat.to_degrees(),
        origin.lon + d_lon.to_degrees(),
    )
}

/// Ground position under the center of `bbox`.
///
/// Casts a pinhole ray (camera frame: +X right, +Y down, +Z forward)
/// through the box center, rotates it by yaw-pitch-roll and intersects it
/// with the ground plane `alt_m` below the camera. A ray parallel to the
/// ground yields the camera position itself.
pub fn project_bbox_to_ground(pose: &CameraPose, k: &Intrinsics, bbox: &BBox<Ltrb>) -> GeoPoint {
    let center = bbox.center();

    // zero focal lengths would divide by zero
    let fx = if k.fx == 0.0 { 1.0 } else { k.fx };
    let fy = if k.fy == 0.0 { 1.0 } else { k.fy };

    let ray_cam = na::Vector3::new((center.x - k.cx) / fx, (center.y - k.cy) / fy, 1.0);
    let rot = na::Rotation3::from_euler_angles(pose.roll, pose.pitch, pose.yaw);
    let ray = rot * ray_cam;

    if ray.z.abs() <= MIN_RAY_DZ {
        return pose.position;
    }

    let t = -pose.alt_m / ray.z;

    offset(pose.position, t * ray.x, t * ray.y)
}
