use std::fmt;

use glam::Vec3;

use crate::perez::SkyState;

/// Sky samples a renderer takes per shading point unless told otherwise.
pub const DEFAULT_SAMPLES: u32 = 64;

/// A `sunsky` light block in the renderer's scene description language.
///
/// The model is Y-up with east along +Z, so `up` and `east` are always
/// written as `0 1 0` and `0 0 1`.
///
/// ```
/// use perez_skymodel::export::SunskyLight;
/// use glam::Vec3;
///
/// let light = SunskyLight::new(Vec3::new(0.0, 1.0, 0.0), 4.0, 32);
/// assert!(light.to_string().starts_with("light {\n\ttype sunsky\n"));
/// ```
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SunskyLight {
    /// Direction toward the sun.
    pub sun_direction: Vec3,
    pub turbidity: f32,
    pub samples: u32,
}

impl SunskyLight {
    pub fn new(sun_direction: Vec3, turbidity: f32, samples: u32) -> Self {
        Self {
            sun_direction,
            turbidity,
            samples,
        }
    }

    /// Light block matching a configured model.
    pub fn from_state(state: &SkyState, samples: u32) -> Self {
        Self::new(state.sun_direction(), state.turbidity(), samples)
    }
}

impl From<&SkyState> for SunskyLight {
    fn from(state: &SkyState) -> Self {
        Self::from_state(state, DEFAULT_SAMPLES)
    }
}

impl fmt::Display for SunskyLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.sun_direction;
        writeln!(f, "light {{")?;
        writeln!(f, "\ttype sunsky")?;
        writeln!(f, "\tup 0 1 0")?;
        writeln!(f, "\teast 0 0 1")?;
        writeln!(f, "\tsundir {} {} {}", d.x, d.y, d.z)?;
        writeln!(f, "\tturbidity {}", self.turbidity)?;
        writeln!(f, "\tsamples {}", self.samples)?;
        writeln!(f, "}}")
    }
}
