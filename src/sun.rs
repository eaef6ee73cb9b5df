//! Color of the sun disk after atmospheric attenuation (Preetham et al.,
//! appendix A.2).
//!
//! The extraterrestrial solar spectrum is attenuated along the optical path
//! by Rayleigh scattering, aerosols, ozone, mixed gases and water vapour,
//! then integrated against the CIE functions.

use std::f32::consts::FRAC_PI_2;

use crate::color::Rgb;
use crate::perez::{spectrum, SkyState};

/// Solar spectral radiance, 380..=750 nm at 10 nm.
const SOL_AMPLITUDES: [f32; 38] = [
    165.5, 162.3, 211.2, 258.8, 258.2, 242.3, 267.6, 296.6, 305.4, 300.6, 306.6, 288.3, 287.1,
    278.2, 271.0, 272.3, 263.6, 255.0, 250.6, 253.1, 253.5, 251.3, 246.3, 241.7, 236.8, 232.1,
    228.2, 223.4, 219.7, 215.3, 211.0, 207.3, 202.4, 198.7, 194.3, 190.7, 186.3, 182.6,
];
const SOL_LAMBDA_MIN: f32 = 380.0;
const SOL_LAMBDA_MAX: f32 = 750.0;

/// Ozone absorption.
const K_O_WAVELENGTHS: [f32; 64] = [
    300.0, 305.0, 310.0, 315.0, 320.0, 325.0, 330.0, 335.0, 340.0, 345.0, 350.0, 355.0, 445.0,
    450.0, 455.0, 460.0, 465.0, 470.0, 475.0, 480.0, 485.0, 490.0, 495.0, 500.0, 505.0, 510.0,
    515.0, 520.0, 525.0, 530.0, 535.0, 540.0, 545.0, 550.0, 555.0, 560.0, 565.0, 570.0, 575.0,
    580.0, 585.0, 590.0, 595.0, 600.0, 605.0, 610.0, 620.0, 630.0, 640.0, 650.0, 660.0, 670.0,
    680.0, 690.0, 700.0, 710.0, 720.0, 730.0, 740.0, 750.0, 760.0, 770.0, 780.0, 790.0,
];
const K_O_AMPLITUDES: [f32; 64] = [
    10.0, 4.8, 2.7, 1.35, 0.8, 0.380, 0.160, 0.075, 0.04, 0.019, 0.007, 0.0, 0.003, 0.003, 0.004,
    0.006, 0.008, 0.009, 0.012, 0.014, 0.017, 0.021, 0.025, 0.03, 0.035, 0.04, 0.045, 0.048, 0.057,
    0.063, 0.07, 0.075, 0.08, 0.085, 0.095, 0.103, 0.110, 0.12, 0.122, 0.12, 0.118, 0.115, 0.12,
    0.125, 0.130, 0.12, 0.105, 0.09, 0.079, 0.067, 0.057, 0.048, 0.036, 0.028, 0.023, 0.018, 0.014,
    0.011, 0.010, 0.009, 0.007, 0.004, 0.0, 0.0,
];

/// Mixed gases absorption.
const K_G_WAVELENGTHS: [f32; 4] = [759.0, 760.0, 770.0, 771.0];
const K_G_AMPLITUDES: [f32; 4] = [0.0, 3.0, 0.210, 0.0];

/// Water vapour absorption.
const K_WA_WAVELENGTHS: [f32; 13] = [
    689.0, 690.0, 700.0, 710.0, 720.0, 730.0, 740.0, 750.0, 760.0, 770.0, 780.0, 790.0, 800.0,
];
const K_WA_AMPLITUDES: [f32; 13] = [
    0.0, 0.160e-1, 0.240e-1, 0.125e-1, 0.100e+1, 0.870, 0.610e-1, 0.100e-2, 0.100e-4, 0.100e-4,
    0.600e-3, 0.175e-1, 0.360e-1,
];

// Ångström exponent, ozone thickness (cm) and precipitable water vapour (cm).
const ALPHA: f32 = 1.3;
const OZONE: f32 = 0.35;
const WATER_VAPOR: f32 = 2.0;

// Scales integrated radiance into the range of the sky colors.
const SUN_SCALE: f32 = 1e-4;

/// Spectral radiance of the sun at `lambda` nm, seen through the atmosphere
/// with the sun at zenith angle `theta` (radians).
pub fn attenuated_sunlight(theta: f32, turbidity: f32, lambda: f32) -> f32 {
    let beta = 0.04608365822050 * turbidity - 0.04586025928522;
    // Relative optical mass.
    let m = 1.0 / (theta.cos() + 0.000940 * (1.6386 - theta).powf(-1.253));
    let lambda_um = lambda / 1000.0;

    let tau_r = (-m * 0.008735 * lambda_um.powf(-4.08)).exp();
    let tau_a = (-m * beta * lambda_um.powf(-ALPHA)).exp();
    let k_o = sample_irregular(&K_O_WAVELENGTHS, &K_O_AMPLITUDES, lambda);
    let tau_o = (-m * k_o * OZONE).exp();
    let k_g = sample_irregular(&K_G_WAVELENGTHS, &K_G_AMPLITUDES, lambda);
    let tau_g = (-1.41 * k_g * m / (1.0 + 118.93 * k_g * m).powf(0.45)).exp();
    let k_wa = sample_irregular(&K_WA_WAVELENGTHS, &K_WA_AMPLITUDES, lambda);
    let wm = k_wa * WATER_VAPOR * m;
    let tau_wa = (-0.2385 * wm / (1.0 + 20.07 * wm).powf(0.45)).exp();

    let sol = sample_regular(&SOL_AMPLITUDES, SOL_LAMBDA_MIN, SOL_LAMBDA_MAX, lambda);
    sol * tau_r * tau_a * tau_o * tau_g * tau_wa
}

/// Linear RGB color of the sun at zenith angle `theta`. A sun at or below
/// the horizon is black.
pub fn sun_color(theta: f32, turbidity: f32) -> Rgb {
    if !(0.0..FRAC_PI_2).contains(&theta) {
        return Rgb::BLACK;
    }
    let xyz = spectrum::spectrum_to_xyz(|lambda| attenuated_sunlight(theta, turbidity, lambda));
    let color = spectrum::xyz_to_rgb(xyz * SUN_SCALE).constrain();
    log::trace!("Sun color at theta={theta:.4}, turbidity={turbidity}: {color:?}");
    color
}

impl SkyState {
    /// Color of the directly visible sun for the configured sun direction and
    /// turbidity. See [`sun_color`].
    pub fn sun_color(&self) -> Rgb {
        sun_color(self.theta(), self.turbidity())
    }
}

// Linear interpolation between evenly spaced samples, zero outside the range.
fn sample_regular(amplitudes: &[f32], lambda_min: f32, lambda_max: f32, lambda: f32) -> f32 {
    if amplitudes.is_empty() || lambda < lambda_min || lambda > lambda_max {
        return 0.0;
    }
    let last = amplitudes.len() - 1;
    if last == 0 {
        return amplitudes[0];
    }
    let x = (lambda - lambda_min) * last as f32 / (lambda_max - lambda_min);
    let b0 = (x as usize).min(last);
    let b1 = (b0 + 1).min(last);
    let dx = x - b0 as f32;
    (1.0 - dx) * amplitudes[b0] + dx * amplitudes[b1]
}

// Linear interpolation between sorted samples, clamped to the end points.
fn sample_irregular(wavelengths: &[f32], amplitudes: &[f32], lambda: f32) -> f32 {
    let (Some(&first), Some(&last)) = (wavelengths.first(), wavelengths.last()) else {
        return 0.0;
    };
    if lambda <= first {
        return amplitudes[0];
    }
    if lambda >= last {
        return amplitudes[amplitudes.len() - 1];
    }
    let i = wavelengths.partition_point(|&w| w <= lambda);
    let dx = (lambda - wavelengths[i - 1]) / (wavelengths[i] - wavelengths[i - 1]);
    (1.0 - dx) * amplitudes[i - 1] + dx * amplitudes[i]
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::perez::SkyParams;

    #[test]
    fn regular_curve() {
        let curve = [1.0, 3.0, 5.0];
        assert_eq!(sample_regular(&curve, 400.0, 420.0, 399.0), 0.0);
        assert_eq!(sample_regular(&curve, 400.0, 420.0, 421.0), 0.0);
        assert_eq!(sample_regular(&curve, 400.0, 420.0, 400.0), 1.0);
        assert_eq!(sample_regular(&curve, 400.0, 420.0, 405.0), 2.0);
        assert_eq!(sample_regular(&curve, 400.0, 420.0, 420.0), 5.0);
    }

    #[test]
    fn irregular_curve() {
        let k_g = |lambda| sample_irregular(&K_G_WAVELENGTHS, &K_G_AMPLITUDES, lambda);
        assert_eq!(k_g(500.0), 0.0);
        assert_eq!(k_g(760.0), 3.0);
        let mid = k_g(765.0);
        assert!((mid - 1.605).abs() < 1e-5, "{mid}");
        // Clamped past the last sample.
        assert_eq!(
            sample_irregular(&K_WA_WAVELENGTHS, &K_WA_AMPLITUDES, 900.0),
            0.036
        );
        assert_eq!(sample_irregular(&[], &[], 500.0), 0.0);
    }

    #[test]
    fn attenuation_grows_with_optical_mass() {
        for lambda in [400.0, 550.0, 700.0] {
            let high = attenuated_sunlight(0.0, 3.0, lambda);
            let low = attenuated_sunlight(1.4, 3.0, lambda);
            assert!(high > low && low > 0.0, "{lambda}: {high} {low}");
        }
    }

    #[test]
    fn overhead_sun_is_warm_white() {
        let color = sun_color(0.0, 2.0);
        assert!(color.b > 0.3, "{color:?}");
        assert!(color.r >= color.g && color.g >= color.b, "{color:?}");
    }

    #[test]
    fn sun_reddens_toward_horizon() {
        let high = sun_color(0.2, 3.0);
        let low = sun_color(1.4, 3.0);
        assert!(low.luminance() < high.luminance());
        assert!(low.r / low.b > high.r / high.b);
    }

    #[test]
    fn haze_dims_the_sun() {
        let clear = sun_color(0.5, 2.0);
        let hazy = sun_color(0.5, 20.0);
        assert!(hazy.luminance() < clear.luminance());
    }

    #[test]
    fn sun_below_horizon_is_black() {
        assert_eq!(sun_color(FRAC_PI_2, 3.0), Rgb::BLACK);
        assert_eq!(sun_color(2.0, 3.0), Rgb::BLACK);
        let state = SkyState::new(&SkyParams {
            sun_direction: Vec3::new(0.0, -0.5, 1.0),
            turbidity: 3.0,
            ..SkyParams::default()
        })
        .unwrap();
        assert_eq!(state.sun_color(), Rgb::BLACK);
    }

    #[test]
    fn state_sun_color() {
        let state = SkyState::new(&SkyParams {
            sun_direction: Vec3::new(0.0, 1.0, 1.0),
            turbidity: 4.0,
            ..SkyParams::default()
        })
        .unwrap();
        let color = state.sun_color();
        assert_eq!(color, sun_color(state.theta(), 4.0));
        assert!(color.is_finite());
        assert!(color.r > 0.0 && color.g > 0.0 && color.b > 0.0);
    }
}
