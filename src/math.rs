use num_traits::Float;

/// Blends `next` into `prev` with weight `factor` on `next`.
#[inline(always)]
pub fn lerp<T: Float>(prev: T, next: T, factor: T) -> T {
    factor * next + (T::one() - factor) * prev
}

/// Haversine of the central angle between two points given in radians.
#[inline]
pub fn haversine<T: Float>(lat1: T, lon1: T, lat2: T, lon2: T) -> T {
    let two = T::one() + T::one();
    let dlat = (lat2 - lat1) / two;
    let dlon = (lon2 - lon1) / two;

    dlat.sin() * dlat.sin() + lat1.cos() * lat2.cos() * dlon.sin() * dlon.sin()
}

/// Central angle in radians for a haversine value, robust to rounding above 1.
#[inline]
pub fn central_angle<T: Float>(h: T) -> T {
    let two = T::one() + T::one();

    two * h.sqrt().min(T::one()).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_relative_eq!(lerp(2.0f32, 10.0, 0.25), 4.0);
    }

    #[test]
    fn test_antipodal_angle_is_pi() {
        let h = haversine(0.0f64, 0.0, 0.0, std::f64::consts::PI);
        assert_relative_eq!(central_angle(h), std::f64::consts::PI, epsilon = 1e-12);
    }
}
