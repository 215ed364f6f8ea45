//! Blur kernel and noise math shared by the shaders and the CPU reference

/// Number of samples per blur axis
pub const TAP_COUNT: usize = 13;

/// Sample offsets in units of the tap spacing
pub const TAP_OFFSETS: [f32; TAP_COUNT] = [
    -3.0, -2.5, -2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0,
];

/// Weight of every tap. The weights sum to 1.001, slightly brightening.
pub const TAP_WEIGHT: f32 = 0.077;

/// Luminance weights used for desaturation
pub const LUMA: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Tap spacing in window-uv units
///
/// `blur_size` is in device-independent pixels and is scaled by `density`.
/// Dividing by the mean window resolution keeps the blur radius the same
/// fraction of the screen at any resolution.
pub fn tap_spacing(blur_size: f32, density: f32, mean_resolution: f32) -> f32 {
    if mean_resolution <= 0.0 {
        return 0.0;
    }
    (blur_size * density / 2.0) / mean_resolution
}

/// Per-pass multiplier converting window-uv tap spacing into the sampled
/// texture's uv space
pub fn tap_scale(window_extent: f32, sampled_extent: f32) -> f32 {
    if sampled_extent <= 0.0 {
        return 0.0;
    }
    window_extent / sampled_extent
}

fn fract(v: f32) -> f32 {
    let f = v - v.floor();
    // Tiny negative inputs round up to exactly 1.0
    if f >= 1.0 { 0.0 } else { f }
}

/// GLSL-style `mod`, result has the sign of `y`
fn glsl_mod(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Pseudo-random value in [0, 1) for a uv coordinate
pub fn noise_hash(u: f32, v: f32) -> f32 {
    let d = u * 12.9898 + v * 78.233;
    fract((glsl_mod(d, 3.14)).sin() * 43758.5453)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum() {
        let sum = TAP_WEIGHT * TAP_COUNT as f32;
        assert!((sum - 1.001).abs() < 1e-5);
    }

    #[test]
    fn test_offsets_symmetric() {
        for i in 0..TAP_COUNT {
            assert_eq!(TAP_OFFSETS[i], -TAP_OFFSETS[TAP_COUNT - 1 - i]);
        }
    }

    #[test]
    fn test_tap_spacing_monotonic_in_blur_size() {
        let mut prev = -1.0;
        for blur in [0.0, 1.0, 10.0, 25.0, 100.0] {
            let dt = tap_spacing(blur, 1.0, 667.0);
            assert!(dt > prev);
            prev = dt;
        }
    }

    #[test]
    fn test_tap_spacing_scales_with_density() {
        let a = tap_spacing(25.0, 1.0, 500.0);
        let b = tap_spacing(25.0, 2.0, 500.0);
        assert!((b - 2.0 * a).abs() < 1e-7);
        assert_eq!(tap_spacing(25.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_noise_in_unit_range() {
        for i in 0..50 {
            for j in 0..50 {
                let n = noise_hash(i as f32 / 50.0, j as f32 / 50.0);
                assert!((0.0..1.0).contains(&n));
            }
        }
    }

    #[test]
    fn test_noise_varies() {
        assert_ne!(noise_hash(0.1, 0.2), noise_hash(0.2, 0.1));
    }
}
