use std::ops::{Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

/// Linear RGB triple. Sky values are not bounded above and must be scaled by
/// an exposure before display.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Default, Debug, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Raises every channel to `1 / gamma`.
    pub fn gamma_correct(self, gamma: f32) -> Self {
        let inv_gamma = 1.0 / gamma;
        Self {
            r: self.r.powf(inv_gamma),
            g: self.g.powf(inv_gamma),
            b: self.b.powf(inv_gamma),
        }
    }

    /// Clamps negative channels to zero. No upper clamp is applied.
    pub fn clamp_negative(self) -> Self {
        Self {
            r: self.r.max(0.0),
            g: self.g.max(0.0),
            b: self.b.max(0.0),
        }
    }

    /// Shifts all channels by the most negative one so the color becomes
    /// representable while keeping channel differences.
    pub fn constrain(self) -> Self {
        let w = -self.r.min(self.g).min(self.b).min(0.0);
        if w > 0.0 {
            Self::new(self.r + w, self.g + w, self.b + w)
        } else {
            self
        }
    }

    /// Rec. 709 luminance of the linear color.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Free-standing form of [`Rgb::gamma_correct`].
pub fn gamma_correct(color: Rgb, gamma: f32) -> Rgb {
    color.gamma_correct(gamma)
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(color: Rgb) -> Self {
        color.to_array()
    }
}

// Exposure scaling.
impl Mul<f32> for Rgb {
    type Output = Self;

    fn mul(self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }
}

impl MulAssign<f32> for Rgb {
    fn mul_assign(&mut self, s: f32) {
        *self = *self * s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Rgb, b: Rgb, eps: f32) {
        for (x, y) in a.to_array().into_iter().zip(b.to_array()) {
            assert!((x - y).abs() <= eps, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn gamma_round_trip() {
        let colors = [
            Rgb::new(1.0, 1.0, 1.0),
            Rgb::new(0.5, 0.25, 0.125),
            Rgb::new(0.01, 0.9, 0.333),
        ];
        for gamma in [0.45, 1.0, 2.2, 2.4] {
            for color in colors {
                let back = gamma_correct(gamma_correct(color, gamma), 1.0 / gamma);
                assert_close(back, color, 1e-5);
            }
        }
    }

    #[test]
    fn gamma_one_is_identity() {
        let color = Rgb::new(0.2, 0.4, 0.8);
        assert_eq!(color.gamma_correct(1.0), color);
    }

    #[test]
    fn gamma_brightens_midtones() {
        let color = Rgb::new(0.25, 0.25, 0.25).gamma_correct(2.0);
        assert_close(color, Rgb::new(0.5, 0.5, 0.5), 1e-6);
    }

    #[test]
    fn clamp_negative() {
        let color = Rgb::new(-0.5, 0.0, 3.0).clamp_negative();
        assert_eq!(color, Rgb::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn constrain() {
        assert_eq!(
            Rgb::new(-0.25, 0.5, 1.0).constrain(),
            Rgb::new(0.0, 0.75, 1.25)
        );
        let positive = Rgb::new(0.1, 0.2, 0.3);
        assert_eq!(positive.constrain(), positive);
    }

    #[test]
    fn exposure() {
        let mut color = Rgb::new(10.0, 20.0, 40.0) * 0.5;
        assert_eq!(color, Rgb::new(5.0, 10.0, 20.0));
        color *= 0.1;
        assert_close(color, Rgb::new(0.5, 1.0, 2.0), 1e-6);
    }

    #[test]
    fn pod_layout() {
        let colors = [Rgb::new(1.0, 2.0, 3.0), Rgb::new(4.0, 5.0, 6.0)];
        let floats: &[f32] = bytemuck::cast_slice(&colors);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let array: [f32; 3] = colors[1].into();
        assert_eq!(Rgb::from(array), colors[1]);
    }
}
