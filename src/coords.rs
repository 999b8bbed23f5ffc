//! Affine mapping between data space and pixel space.
//!
//! Two independent pairs are mapped with the same functions: data index to
//! overview x, and signal value to overview y. The y pair passes its pixel
//! bounds reversed (`height..0`) so larger values land nearer the top.

/// Map `value` from `[domain_min, domain_max]` onto `[pixel_min, pixel_max]`.
///
/// A zero-width domain maps every value to the middle of the pixel range.
pub fn data_to_pixel(
    value: f64,
    domain_min: f64,
    domain_max: f64,
    pixel_min: f64,
    pixel_max: f64,
) -> f64 {
    if domain_min == domain_max {
        return (pixel_min + pixel_max) / 2.0;
    }
    pixel_min + (pixel_max - pixel_min) * (value - domain_min) / (domain_max - domain_min)
}

/// Inverse of [`data_to_pixel`].
///
/// A zero-width domain has a single data value to return. A zero-width pixel
/// range maps to the middle of the domain.
pub fn pixel_to_data(
    pixel: f64,
    domain_min: f64,
    domain_max: f64,
    pixel_min: f64,
    pixel_max: f64,
) -> f64 {
    if domain_min == domain_max {
        return domain_min;
    }
    if pixel_min == pixel_max {
        return (domain_min + domain_max) / 2.0;
    }
    domain_min + (domain_max - domain_min) * (pixel - pixel_min) / (pixel_max - pixel_min)
}

/// One axis worth of domain and pixel bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    pub domain_min: f64,
    pub domain_max: f64,
    pub pixel_min: f64,
    pub pixel_max: f64,
}

impl AxisMap {
    pub fn new(domain_min: f64, domain_max: f64, pixel_min: f64, pixel_max: f64) -> Self {
        Self {
            domain_min,
            domain_max,
            pixel_min,
            pixel_max,
        }
    }

    /// Left-to-right axis spanning `width` pixels
    pub fn horizontal(domain: (f64, f64), width: f64) -> Self {
        Self::new(domain.0, domain.1, 0.0, width)
    }

    /// Bottom-to-top axis on a top-down pixel grid of `height` pixels
    pub fn vertical(domain: (f64, f64), height: f64) -> Self {
        Self::new(domain.0, domain.1, height, 0.0)
    }

    pub fn to_pixel(&self, value: f64) -> f64 {
        data_to_pixel(
            value,
            self.domain_min,
            self.domain_max,
            self.pixel_min,
            self.pixel_max,
        )
    }

    pub fn to_data(&self, pixel: f64) -> f64 {
        pixel_to_data(
            pixel,
            self.domain_min,
            self.domain_max,
            self.pixel_min,
            self.pixel_max,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain_min == self.domain_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, scale: f64) -> bool {
        (a - b).abs() <= 1e-9 * scale.max(1.0)
    }

    // Deterministic sample generator, enough spread for a round-trip sweep
    fn lcg(seed: &mut u64) -> f64 {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((*seed >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    }

    #[test]
    fn test_round_trip() {
        let mut seed = 42u64;
        for _ in 0..5000 {
            let dmin = lcg(&mut seed) * 1e6;
            let dmax = dmin + lcg(&mut seed).abs() * 1e6 + 1e-3;
            let pmin = lcg(&mut seed) * 2000.0;
            let span = lcg(&mut seed).abs() * 2000.0 + 1.0;
            let pmax = if lcg(&mut seed) < 0.0 { pmin - span } else { pmin + span };
            let v = lcg(&mut seed) * 2e6;

            let px = data_to_pixel(v, dmin, dmax, pmin, pmax);
            let back = pixel_to_data(px, dmin, dmax, pmin, pmax);
            let scale = v.abs().max(dmin.abs()).max(dmax.abs());
            assert!(close(back, v, scale), "v={v} back={back}");
        }
    }

    #[test]
    fn test_degenerate_domain_maps_to_midpoint() {
        assert_eq!(data_to_pixel(5.0, 3.0, 3.0, 0.0, 100.0), 50.0);
        assert_eq!(data_to_pixel(-1e9, 3.0, 3.0, 10.0, 20.0), 15.0);
        assert_eq!(pixel_to_data(77.0, 3.0, 3.0, 0.0, 100.0), 3.0);
        assert_eq!(pixel_to_data(77.0, 0.0, 10.0, 5.0, 5.0), 5.0);
    }

    #[test]
    fn test_vertical_axis_is_inverted() {
        let axis = AxisMap::vertical((-1.0, 1.0), 100.0);
        assert_eq!(axis.to_pixel(1.0), 0.0);
        assert_eq!(axis.to_pixel(-1.0), 100.0);
        assert_eq!(axis.to_pixel(0.0), 50.0);
        assert_eq!(axis.to_data(25.0), 0.5);
    }

    #[test]
    fn test_horizontal_axis_ratio() {
        let axis = AxisMap::horizontal((0.0, 1000.0), 500.0);
        assert_eq!(axis.to_pixel(500.0), 250.0);
        assert_eq!(axis.to_data(49.0), 98.0);
        assert!(!axis.is_degenerate());
    }
}
