//! Spectral tables and the chromaticity to RGB conversion of the daylight
//! model (Preetham et al., appendix A.5).

use glam::Vec3;

use crate::color::Rgb;

/// First wavelength of [`S0`], [`S1`] and [`S2`] in nm.
pub const S_LAMBDA_MIN: u32 = 300;
/// Sampling interval of the daylight basis in nm.
pub const S_LAMBDA_STEP: u32 = 10;
/// First wavelength of the CIE tables in nm.
pub const CIE_LAMBDA_MIN: u32 = 380;
/// Last wavelength of the CIE tables in nm.
pub const CIE_LAMBDA_MAX: u32 = 780;
/// Sampling interval of the CIE tables in nm.
pub const CIE_LAMBDA_STEP: u32 = 5;

// Luminance units of the model are cd/m², display values are scaled down by
// this factor.
const LUMINANCE_SCALE: f32 = 4000.0;

// Denominators closer to zero than this are treated as degenerate.
const EPSILON: f32 = 1e-6;

/// Mean daylight spectrum, 300..=830 nm at 10 nm.
pub(crate) const S0: [f32; 54] = [
    0.04, 6.0, 29.6, 55.3, 57.3, 61.8, 61.5, 68.8, 63.4, 65.8, 94.8, 104.8, 105.9, 96.8, 113.9,
    125.6, 125.5, 121.3, 121.3, 113.5, 113.1, 110.8, 106.5, 108.8, 105.3, 104.4, 100.0, 96.0, 95.1,
    89.1, 90.5, 90.3, 88.4, 84.0, 85.1, 81.9, 82.6, 84.9, 81.3, 71.9, 74.3, 76.4, 63.3, 71.7, 77.0,
    65.2, 47.7, 68.6, 65.0, 66.0, 61.0, 53.3, 58.9, 61.9,
];

/// First daylight eigenvector, 300..=830 nm at 10 nm.
pub(crate) const S1: [f32; 54] = [
    0.02, 4.5, 22.4, 42.0, 40.6, 41.6, 38.0, 42.4, 38.5, 35.0, 43.4, 46.3, 43.9, 37.1, 36.7, 35.9,
    32.6, 27.9, 24.3, 20.1, 16.2, 13.2, 8.6, 6.1, 4.2, 1.9, 0.0, -1.6, -3.5, -3.5, -5.8, -7.2, -8.6,
    -9.5, -10.9, -10.7, -12.0, -14.0, -13.6, -12.0, -13.3, -12.9, -10.6, -11.6, -12.2, -10.2, -7.8,
    -11.2, -10.4, -10.6, -9.7, -8.3, -9.3, -9.8,
];

/// Second daylight eigenvector, 300..=830 nm at 10 nm.
pub(crate) const S2: [f32; 54] = [
    0.0, 2.0, 4.0, 8.5, 7.8, 6.7, 5.3, 6.1, 3.0, 1.2, -1.1, -0.5, -0.7, -1.2, -2.6, -2.9, -2.8,
    -2.6, -2.6, -1.8, -1.5, -1.3, -1.2, -1.0, -0.5, -0.3, 0.0, 0.2, 0.5, 2.1, 3.2, 4.1, 4.7, 5.1,
    6.7, 7.3, 8.6, 9.8, 10.2, 8.3, 9.6, 8.5, 7.0, 7.6, 8.0, 6.7, 5.2, 7.4, 6.8, 7.0, 6.4, 5.5, 6.1,
    6.5,
];

/// CIE 1931 2° x̄, 380..=780 nm at 5 nm.
pub(crate) const CIE_X: [f32; 81] = [
    0.001368, 0.002236, 0.004243, 0.007650, 0.014310, 0.023190, 0.043510, 0.077630, 0.134380,
    0.214770, 0.283900, 0.328500, 0.348280, 0.348060, 0.336200, 0.318700, 0.290800, 0.251100,
    0.195360, 0.142100, 0.095640, 0.057950, 0.032010, 0.014700, 0.004900, 0.002400, 0.009300,
    0.029100, 0.063270, 0.109600, 0.165500, 0.225750, 0.290400, 0.359700, 0.433450, 0.512050,
    0.594500, 0.678400, 0.762100, 0.842500, 0.916300, 0.978600, 1.026300, 1.056700, 1.062200,
    1.045600, 1.002600, 0.938400, 0.854450, 0.751400, 0.642400, 0.541900, 0.447900, 0.360800,
    0.283500, 0.218700, 0.164900, 0.121200, 0.087400, 0.063600, 0.046770, 0.032900, 0.022700,
    0.015840, 0.011359, 0.008111, 0.005790, 0.004109, 0.002899, 0.002049, 0.001440, 0.001000,
    0.000690, 0.000476, 0.000332, 0.000235, 0.000166, 0.000117, 0.000083, 0.000059, 0.000042,
];

/// CIE 1931 2° ȳ, 380..=780 nm at 5 nm.
pub(crate) const CIE_Y: [f32; 81] = [
    0.000039, 0.000064, 0.000120, 0.000217, 0.000396, 0.000640, 0.001210, 0.002180, 0.004000,
    0.007300, 0.011600, 0.016840, 0.023000, 0.029800, 0.038000, 0.048000, 0.060000, 0.073900,
    0.090980, 0.112600, 0.139020, 0.169300, 0.208020, 0.258600, 0.323000, 0.407300, 0.503000,
    0.608200, 0.710000, 0.793200, 0.862000, 0.914850, 0.954000, 0.980300, 0.994950, 1.000000,
    0.995000, 0.978600, 0.952000, 0.915400, 0.870000, 0.816300, 0.757000, 0.694900, 0.631000,
    0.566800, 0.503000, 0.441200, 0.381000, 0.321000, 0.265000, 0.217000, 0.175000, 0.138200,
    0.107000, 0.081600, 0.061000, 0.044580, 0.032000, 0.023200, 0.017000, 0.011920, 0.008210,
    0.005723, 0.004102, 0.002929, 0.002091, 0.001484, 0.001047, 0.000740, 0.000520, 0.000361,
    0.000249, 0.000172, 0.000120, 0.000085, 0.000060, 0.000042, 0.000030, 0.000021, 0.000015,
];

/// CIE 1931 2° z̄, 380..=780 nm at 5 nm.
pub(crate) const CIE_Z: [f32; 81] = [
    0.006450, 0.010550, 0.020050, 0.036210, 0.067850, 0.110200, 0.207400, 0.371300, 0.645600,
    1.039050, 1.385600, 1.622960, 1.747060, 1.782600, 1.772110, 1.744100, 1.669200, 1.528100,
    1.287640, 1.041900, 0.812950, 0.616200, 0.465180, 0.353300, 0.272000, 0.212300, 0.158200,
    0.111700, 0.078250, 0.057250, 0.042160, 0.029840, 0.020300, 0.013400, 0.008750, 0.005750,
    0.003900, 0.002750, 0.002100, 0.001800, 0.001650, 0.001400, 0.001100, 0.001000, 0.000800,
    0.000600, 0.000340, 0.000240, 0.000190, 0.000100, 0.000050, 0.000030, 0.000020, 0.000010,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
    0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000,
];

/// Converts chromaticity `(x, y)` and luminance `luminance` (cd/m²) to CIE
/// XYZ by reconstructing the daylight spectrum from the `S0..S2` basis and
/// integrating it against the CIE functions.
///
/// The basis is sampled every 10 nm, so only every other CIE entry is used.
/// Returns `None` when the luminance is not positive, the chromaticity lies
/// on the singular line of the basis weights or the spectrum integrates to
/// zero luminance.
pub fn xyy_to_xyz(x: f32, y: f32, luminance: f32) -> Option<Vec3> {
    // The zenith luminance fit goes negative for a low sun in a hazy sky.
    if luminance.is_nan() || luminance <= 0.0 {
        return None;
    }
    let den = 0.0241 + 0.2562 * x - 0.7341 * y;
    if den.abs() < EPSILON {
        return None;
    }
    let m1 = (-1.3515 - 1.7703 * x + 5.9114 * y) / den;
    let m2 = (0.0300 - 31.4424 * x + 30.0717 * y) / den;

    let s_start = ((CIE_LAMBDA_MIN - S_LAMBDA_MIN) / S_LAMBDA_STEP) as usize;
    let cie_stride = (S_LAMBDA_STEP / CIE_LAMBDA_STEP) as usize;
    let samples = ((CIE_LAMBDA_MAX - CIE_LAMBDA_MIN) / S_LAMBDA_STEP) as usize;

    let mut xyz = Vec3::ZERO;
    for i in 0..samples {
        let s = s_start + i;
        let c = i * cie_stride;
        let amp = S0[s] + m1 * S1[s] + m2 * S2[s];
        xyz += amp * Vec3::new(CIE_X[c], CIE_Y[c], CIE_Z[c]);
    }

    if xyz.y == 0.0 || !xyz.is_finite() {
        return None;
    }
    let y_target = luminance / LUMINANCE_SCALE;
    let scale = y_target / xyz.y;
    let xyz = Vec3::new(xyz.x * scale, y_target, xyz.z * scale);
    xyz.is_finite().then_some(xyz)
}

/// Linear RGB from CIE XYZ. Channels may be negative.
pub fn xyz_to_rgb(xyz: Vec3) -> Rgb {
    Rgb::new(
        1.967 * xyz.x - 0.548 * xyz.y - 0.297 * xyz.z,
        -0.955 * xyz.x + 1.938 * xyz.y - 0.027 * xyz.z,
        0.064 * xyz.x - 0.130 * xyz.y + 0.982 * xyz.z,
    )
}

/// Converts `(x, y, Y)` to linear RGB with negative channels clamped to zero.
/// Degenerate chromaticities produce black.
pub fn xyy_to_rgb(x: f32, y: f32, luminance: f32) -> Rgb {
    match xyy_to_xyz(x, y, luminance) {
        Some(xyz) => xyz_to_rgb(xyz).clamp_negative(),
        None => Rgb::BLACK,
    }
}

/// Integrates a spectral power distribution against the CIE functions at
/// every tabulated wavelength.
pub(crate) fn spectrum_to_xyz(spectrum: impl Fn(f32) -> f32) -> Vec3 {
    let mut xyz = Vec3::ZERO;
    for (i, ((&cx, &cy), &cz)) in CIE_X.iter().zip(&CIE_Y).zip(&CIE_Z).enumerate() {
        let lambda = (CIE_LAMBDA_MIN + i as u32 * CIE_LAMBDA_STEP) as f32;
        xyz += spectrum(lambda) * Vec3::new(cx, cy, cz);
    }
    xyz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_extents() {
        let s_len = ((830 - S_LAMBDA_MIN) / S_LAMBDA_STEP + 1) as usize;
        assert_eq!(S0.len(), s_len);
        assert_eq!(S1.len(), s_len);
        assert_eq!(S2.len(), s_len);
        let cie_len = ((CIE_LAMBDA_MAX - CIE_LAMBDA_MIN) / CIE_LAMBDA_STEP + 1) as usize;
        assert_eq!(CIE_X.len(), cie_len);
        assert_eq!(CIE_Y.len(), cie_len);
        assert_eq!(CIE_Z.len(), cie_len);
        // ȳ peaks at 555 nm.
        let peak = ((555 - CIE_LAMBDA_MIN) / CIE_LAMBDA_STEP) as usize;
        assert_eq!(CIE_Y[peak], 1.0);
    }

    #[test]
    fn luminance_is_preserved() {
        let xyz = xyy_to_xyz(0.28, 0.29, 8000.0).unwrap();
        assert_eq!(xyz.y, 2.0);
        assert!(xyz.x > 0.0 && xyz.z > 0.0);
    }

    #[test]
    fn daylight_is_bluish_white() {
        // Typical clear zenith chromaticity.
        let rgb = xyy_to_rgb(0.27855, 0.29263, 4000.0);
        assert!(rgb.r > 0.0 && rgb.g > 0.0 && rgb.b > 0.0);
        assert!(rgb.b > rgb.g && rgb.g > rgb.r, "{rgb:?}");
    }

    #[test]
    fn scales_monotonically_with_luminance() {
        for (x, y) in [(0.25, 0.26), (0.28, 0.29), (0.33, 0.35), (0.40, 0.38)] {
            let mut previous = Rgb::BLACK;
            for luminance in [0.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0] {
                let rgb = xyy_to_rgb(x, y, luminance);
                assert!(rgb.r >= previous.r, "{rgb:?} < {previous:?}");
                assert!(rgb.g >= previous.g, "{rgb:?} < {previous:?}");
                assert!(rgb.b >= previous.b, "{rgb:?} < {previous:?}");
                previous = rgb;
            }
        }
    }

    #[test]
    fn zero_luminance_is_black() {
        assert_eq!(xyy_to_rgb(0.3, 0.3, 0.0), Rgb::BLACK);
    }

    #[test]
    fn negative_luminance_is_black() {
        // Chromaticity of a low sun in a T = 20 sky.
        let (x, y) = (0.607, 0.480);
        assert!(xyy_to_rgb(x, y, 1940.8).r > 0.0);
        for luminance in [-1940.8, -19408.0, -194080.0, f32::NAN] {
            assert_eq!(xyy_to_xyz(x, y, luminance), None);
            assert_eq!(xyy_to_rgb(x, y, luminance), Rgb::BLACK);
        }
    }

    #[test]
    fn singular_chromaticity_is_black() {
        // 0.0241 + 0.2562 x - 0.7341 y == 0
        let x = 0.3;
        let y = (0.0241 + 0.2562 * x) / 0.7341;
        assert_eq!(xyy_to_xyz(x, y, 1000.0), None);
        assert_eq!(xyy_to_rgb(x, y, 1000.0), Rgb::BLACK);
    }

    #[test]
    fn negative_channels_are_clamped() {
        // Saturated green lies outside the RGB gamut.
        let rgb = xyy_to_rgb(0.2, 0.7, 4000.0);
        assert!(rgb.r >= 0.0 && rgb.g >= 0.0 && rgb.b >= 0.0);
        let raw = xyz_to_rgb(Vec3::new(0.2 / 0.7, 1.0, 0.1 / 0.7));
        assert!(raw.r < 0.0 || raw.b < 0.0);
    }

    #[test]
    fn flat_spectrum_matches_table_sums() {
        let xyz = spectrum_to_xyz(|_| 1.0);
        let sum_y: f32 = CIE_Y.iter().sum();
        assert!((xyz.y - sum_y).abs() < 1e-4);
        let outside = spectrum_to_xyz(|lambda| if lambda > 780.0 { 1.0 } else { 0.0 });
        assert_eq!(outside, Vec3::ZERO);
    }
}
