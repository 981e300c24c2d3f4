use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::{self, GeoPoint};

/// Scale of the placeholder energy model, see [`route_energy_cost`].
const ENERGY_SCALE: f64 = 1e-3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Waypoint {
    #[inline]
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Total horizontal length of a route in meters. Altitude is ignored.
pub fn route_length_m(lats: &[f64], lons: &[f64], alts: &[f64]) -> Result<f64> {
    Error::check_lengths("route_length_m", lats.len(), &[lons.len(), alts.len()])?;

    Ok(lats
        .windows(2)
        .zip(lons.windows(2))
        .map(|(lat, lon)| {
            geo::distance_m(GeoPoint::new(lat[0], lon[0]), GeoPoint::new(lat[1], lon[1]))
        })
        .sum())
}

/// Rough energy estimate: `length * mass * base_power * 1e-3`.
pub fn route_energy_cost(
    lats: &[f64],
    lons: &[f64],
    alts: &[f64],
    mass_kg: f64,
    base_power_w: f64,
) -> Result<f64> {
    Error::check_lengths("route_energy_cost", lats.len(), &[lons.len(), alts.len()])?;

    let length_m = route_length_m(lats, lons, alts)?;

    Ok(length_m * mass_kg * base_power_w * ENERGY_SCALE)
}

/// [`route_length_m`] over waypoints.
pub fn path_length_m(route: &[Waypoint]) -> f64 {
    route
        .windows(2)
        .map(|leg| geo::distance_m(leg[0].position(), leg[1].position()))
        .sum()
}

/// [`route_energy_cost`] over waypoints.
#[inline]
pub fn path_energy_cost(route: &[Waypoint], mass_kg: f64, base_power_w: f64) -> f64 {
    path_length_m(route) * mass_kg * base_power_w * ENERGY_SCALE
}

/// Lawn-mower sweep over the bounding box of `polygon`.
///
/// Sweep lines run east-west, `swath_m` apart starting at the southern
/// edge, alternating direction; each line contributes its two endpoints.
pub fn lawnmower(polygon: &[GeoPoint], swath_m: f64, altitude_m: f64) -> Result<Vec<Waypoint>> {
    if polygon.len() < 3 {
        return Err(Error::InvalidPolygon(polygon.len()));
    }

    if !(swath_m.is_finite() && swath_m > 0.0) {
        return Err(Error::InvalidSwath(swath_m));
    }

    let origin = polygon[0];
    let (mut min, mut max) = (
        na::Vector2::repeat(f64::INFINITY),
        na::Vector2::repeat(f64::NEG_INFINITY),
    );

    for p in polygon {
        let v = geo::to_local(origin, *p);
        min = min.inf(&v);
        max = max.sup(&v);
    }

    let mut out = Vec::new();
    let mut left_to_right = true;

    for y in (0..)
        .map(|k| min.y + k as f64 * swath_m)
        .take_while(|&y| y <= max.y)
    {
        let (a, b) = if left_to_right {
            (min.x, max.x)
        } else {
            (max.x, min.x)
        };
        left_to_right = !left_to_right;

        for x in [a, b] {
            let p = geo::from_local(origin, na::Vector2::new(x, y));
            out.push(Waypoint::new(p.lat, p.lon, altitude_m));
        }
    }

    Ok(out)
}

/// Waypoints exactly along `path` at a fixed altitude.
pub fn follow_path(path: &[GeoPoint], altitude_m: f64) -> Vec<Waypoint> {
    path.iter()
        .map(|p| Waypoint::new(p.lat, p.lon, altitude_m))
        .collect()
}
