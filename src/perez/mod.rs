// A Practical Analytic Model for Daylight
// A. J. Preetham, Peter Shirley & Brian Smits, SIGGRAPH 1999
// Sky distribution: R. Perez, R. Seals & J. Michalsky, 1993

use std::f32::consts::PI;
use std::ops::RangeInclusive;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use thiserror::Error;

use crate::color::Rgb;

/// Spectral tables and chromaticity conversion.
pub mod spectrum;

/// Turbidities accepted by [`SkyState::new`]. Clear days are around `2..=6`.
pub const TURBIDITY_RANGE: RangeInclusive<f32> = 2.0..=20.0;

// Lower bound for the cosine of the view zenith angle. Keeps `B / cos θv`
// finite at the horizon.
const MIN_COS_THETA: f32 = 1e-3;

/// One of the three Perez distributions of the model.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Distribution {
    /// Luminance `Y` in cd/m².
    Luminance = 0,
    /// CIE chromaticity `x`.
    ChromaticityX = 1,
    /// CIE chromaticity `y`.
    ChromaticityY = 2,
}

impl Distribution {
    pub const ALL: [Self; 3] = [Self::Luminance, Self::ChromaticityX, Self::ChromaticityY];
}

/// What [`SkyState::sky_color`] returns for directions below the horizon.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ground {
    /// A constant ground color.
    Color(Rgb),
    /// Mirror the direction across the horizon and evaluate the sky there.
    ExtendSky,
}

impl Default for Ground {
    fn default() -> Self {
        Self::Color(Rgb::BLACK)
    }
}

/// Initial parameters for the sky model.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkyParams {
    /// Direction toward the sun. Y is up. Doesn't need to be normalized.
    pub sun_direction: Vec3,
    /// Turbidity must be between `2..=20`.
    pub turbidity: f32,
    /// Horizon policy.
    pub ground: Ground,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::Y,
            turbidity: 2.0,
            ground: Ground::default(),
        }
    }
}

#[derive(Error, PartialEq, Debug)]
pub enum Error {
    #[error("Turbidity must be between 2..=20, got {0} instead")]
    TurbidityOutOfRange(f32),
    #[error("Sun direction must be finite and non-zero, got {0:?} instead")]
    InvalidSunDirection([f32; 3]),
}

/// The state of the sky model. All fields are derived from [`SkyParams`] in
/// one step; to change the sun or the turbidity, call
/// [`SkyState::configure`] (or create a new state) and every coefficient is
/// recomputed.
///
/// Evaluation is cheap and never allocates. If you are planning to evaluate
/// the sky in a shader, upload [`SkyState::raw`] and port
/// [`SkyState::sky_color`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SkyState {
    sun_direction: Vec3,
    theta: f32,
    phi: f32,
    turbidity: f32,
    zenith: [f32; 3],
    coefficients: [[f32; 5]; 3],
    denominators: [f32; 3],
    ground: Ground,
}

impl Default for SkyState {
    fn default() -> Self {
        let params = SkyParams::default();
        Self::solve(params.sun_direction, params.turbidity, params.ground)
    }
}

impl SkyState {
    /// Creates `SkyState`.
    ///
    /// # Errors
    /// Can fail if the turbidity is out of range or the sun direction can't
    /// be normalized.
    pub fn new(sky_params: &SkyParams) -> Result<Self, Error> {
        if !TURBIDITY_RANGE.contains(&sky_params.turbidity) {
            return Err(Error::TurbidityOutOfRange(sky_params.turbidity));
        }
        // Scale by the largest component first so huge or tiny vectors don't
        // overflow the squared length.
        let direction = sky_params.sun_direction;
        let sun_direction = (direction / direction.abs().max_element())
            .try_normalize()
            .ok_or(Error::InvalidSunDirection(direction.to_array()))?;

        Ok(Self::solve(sun_direction, sky_params.turbidity, sky_params.ground))
    }

    /// Recomputes the whole state from `sky_params`. On error the state is
    /// left untouched.
    ///
    /// # Errors
    /// Same as [`SkyState::new`].
    pub fn configure(&mut self, sky_params: &SkyParams) -> Result<(), Error> {
        *self = Self::new(sky_params)?;
        Ok(())
    }

    fn solve(sun_direction: Vec3, turbidity: f32, ground: Ground) -> Self {
        let theta = sun_direction.y.clamp(-1.0, 1.0).acos();
        let phi = sun_direction.x.atan2(sun_direction.z);

        let t = turbidity;
        let t2 = t * t;
        let theta2 = theta * theta;
        let theta3 = theta2 * theta;

        // Zenith luminance, kcd/m² to cd/m².
        let chi = (4.0 / 9.0 - t / 120.0) * (PI - 2.0 * theta);
        let zenith_lum = 1000.0 * ((4.0453 * t - 4.9710) * chi.tan() - 0.2155 * t + 2.4192);

        let zenith_x = (0.00165 * theta3 - 0.00374 * theta2 + 0.00208 * theta) * t2
            + (-0.02902 * theta3 + 0.06377 * theta2 - 0.03202 * theta + 0.00394) * t
            + (0.11693 * theta3 - 0.21196 * theta2 + 0.06052 * theta + 0.25885);
        let zenith_y = (0.00275 * theta3 - 0.00610 * theta2 + 0.00316 * theta) * t2
            + (-0.04214 * theta3 + 0.08970 * theta2 - 0.04153 * theta + 0.00515) * t
            + (0.15346 * theta3 - 0.26756 * theta2 + 0.06669 * theta + 0.26688);

        let perez_lum = [
            0.17872 * t - 1.46303,
            -0.35540 * t + 0.42749,
            -0.02266 * t + 5.32505,
            0.12064 * t - 2.57705,
            -0.06696 * t + 0.37027,
        ];
        let perez_x = [
            -0.01925 * t - 0.25922,
            -0.06651 * t + 0.00081,
            -0.00041 * t + 0.21247,
            -0.06409 * t - 0.89887,
            -0.00325 * t + 0.04517,
        ];
        let perez_y = [
            -0.01669 * t - 0.26078,
            -0.09495 * t + 0.00921,
            -0.00792 * t + 0.21023,
            -0.04405 * t - 1.65369,
            -0.01092 * t + 0.05291,
        ];
        let coefficients = [perez_lum, perez_x, perez_y];

        // The denominator only depends on the sun.
        let cos_theta = theta.cos();
        let denominators = coefficients.map(|c| perez_shape(c, 1.0, theta, cos_theta));

        log::debug!(
            "Configured sky: turbidity={t}, theta={theta:.4}, phi={phi:.4}, \
             zenith=(Y={zenith_lum:.1}, x={zenith_x:.5}, y={zenith_y:.5})"
        );

        Self {
            sun_direction,
            theta,
            phi,
            turbidity,
            zenith: [zenith_lum, zenith_x, zenith_y],
            coefficients,
            denominators,
            ground,
        }
    }

    /// Color of the sky looking along `direction`, in linear RGB. `direction`
    /// must be normalized. Values are unbounded above; scale them by an
    /// exposure before display.
    ///
    /// Directions below the horizon follow the configured [`Ground`].
    pub fn sky_color(&self, direction: Vec3) -> Rgb {
        let direction = if direction.y < 0.0 {
            match self.ground {
                Ground::Color(color) => return color,
                Ground::ExtendSky => Vec3::new(direction.x, -direction.y, direction.z),
            }
        } else {
            direction
        };

        let cos_theta_v = direction.y.max(MIN_COS_THETA);
        let cos_gamma = direction.dot(self.sun_direction).clamp(-1.0, 1.0);
        let gamma = cos_gamma.acos();

        let [lum, x, y] =
            Distribution::ALL.map(|d| self.evaluate(d, cos_theta_v, gamma, cos_gamma));
        spectrum::xyy_to_rgb(x, y, lum)
    }

    /// Evaluates a single Perez distribution. `theta_v` is the zenith angle of
    /// the view direction and `gamma` the angle between the view direction
    /// and the sun, both in radians.
    pub fn perez(&self, distribution: Distribution, theta_v: f32, gamma: f32) -> f32 {
        let cos_theta_v = theta_v.cos().max(MIN_COS_THETA);
        self.evaluate(distribution, cos_theta_v, gamma, gamma.cos())
    }

    fn evaluate(
        &self,
        distribution: Distribution,
        cos_theta_v: f32,
        gamma: f32,
        cos_gamma: f32,
    ) -> f32 {
        let i = distribution as usize;
        let num = perez_shape(self.coefficients[i], cos_theta_v, gamma, cos_gamma);
        self.zenith[i] * (num / self.denominators[i])
    }

    /// Normalized direction toward the sun.
    pub fn sun_direction(&self) -> Vec3 {
        self.sun_direction
    }

    /// Zenith angle of the sun in radians.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Azimuth of the sun in radians, measured from +Z toward +X.
    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn turbidity(&self) -> f32 {
        self.turbidity
    }

    pub fn ground(&self) -> Ground {
        self.ground
    }

    /// Value of `distribution` looking straight up.
    pub fn zenith(&self, distribution: Distribution) -> f32 {
        self.zenith[distribution as usize]
    }

    /// Perez coefficients `A..=E` of `distribution`.
    pub fn coefficients(&self, distribution: Distribution) -> [f32; 5] {
        self.coefficients[distribution as usize]
    }

    /// Returns the internal state in a GPU friendly layout.
    pub fn raw(&self) -> RawSkyState {
        let d = self.sun_direction;
        let mut coefficients = [[0.0; 4]; 5];
        for (k, row) in coefficients.iter_mut().enumerate() {
            for (i, c) in self.coefficients.iter().enumerate() {
                row[i] = c[k];
            }
        }
        RawSkyState {
            sun_direction_theta: [d.x, d.y, d.z, self.theta],
            zenith: [self.zenith[0], self.zenith[1], self.zenith[2], 0.0],
            denominators: [
                self.denominators[0],
                self.denominators[1],
                self.denominators[2],
                0.0,
            ],
            coefficients,
        }
    }
}

/// [`SkyState`] as plain floats, 16-byte aligned rows. Every `vec4` holds the
/// luminance, chromaticity x and chromaticity y terms in `xyz`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Debug, Pod, Zeroable)]
pub struct RawSkyState {
    /// xyz = sun direction, w = sun zenith angle.
    pub sun_direction_theta: [f32; 4],
    pub zenith: [f32; 4],
    pub denominators: [f32; 4],
    /// Rows are the coefficients `A..=E`.
    pub coefficients: [[f32; 4]; 5],
}

// (1 + A e^(B / cos θ)) (1 + C e^(D γ) + E cos²γ)
fn perez_shape(c: [f32; 5], cos_theta: f32, gamma: f32, cos_gamma: f32) -> f32 {
    (1.0 + c[0] * (c[1] / cos_theta).exp())
        * (1.0 + c[2] * (c[3] * gamma).exp() + c[4] * cos_gamma * cos_gamma)
}
