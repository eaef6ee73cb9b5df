//! # Perez Daylight Model
//!
//! This crate contains a pure Rust implementation of the analytic daylight
//! model from [A Practical Analytic Model for
//! Daylight](https://courses.cs.duke.edu/cps124/spring08/assign/07_papers/p91-preetham.pdf)
//! (Preetham, Shirley & Smits), which builds on the Perez sky luminance
//! distribution. It is the model behind the `sunsky` light of scene
//! exporters: one sun direction and one turbidity value produce a plausible
//! clear sky.
//!
//! Compared to the paper, the implementation makes these choices:
//!
//! - The world is Y-up. Sun and view directions are given as [`glam::Vec3`].
//! - Arithmetic and storage precision is `f32`. Spectral tables are small and
//!   embedded as constants, so evaluating the sky never allocates.
//! - The horizon is handled by the model itself, see [`perez::Ground`].
//!
//! ```
//! use perez_skymodel::{gamma_correct, perez::{SkyParams, SkyState}};
//! use glam::Vec3;
//!
//! let state = SkyState::new(&SkyParams {
//!     sun_direction: Vec3::new(0.3, 0.6, 0.7),
//!     turbidity: 3.0,
//!     ..SkyParams::default()
//! })
//! .unwrap();
//! let color = state.sky_color(Vec3::Y) * 0.05;
//! let display = gamma_correct(color, 2.2);
//! assert!(display.r >= 0.0 && display.g >= 0.0 && display.b >= 0.0);
//! ```
//!

/// RGB color values.
pub mod color;
/// Scene description output for the model's parameters.
pub mod export;
/// The Perez sky model.
pub mod perez;
/// Attenuated sunlight.
pub mod sun;

pub use color::{gamma_correct, Rgb};
