//! Procedural mesh gradients: soft radial color blobs over a background, blurred, color graded,
//! and finished with film grain.
//!
//! ```
//! use meshgrad::config::{EffectParameters, PlacementMode};
//! use meshgrad::rand::Rng;
//!
//! let params = EffectParameters {
//!     width: 64,
//!     height: 36,
//!     blur: 8.0,
//!     ..Default::default()
//! };
//! let mut rng = Rng::from_seed(b"docs");
//! let render = meshgrad::pipeline::render(&params, PlacementMode::Centered, &mut rng, |_, _| {})
//!     .expect("canvas has pixels");
//! assert_eq!(render.raster.width(), 64);
//! ```

pub mod blob;
pub mod color;
pub mod config;
pub mod filter;
pub mod math;
pub mod noise;
pub mod paint;
pub mod pipeline;
pub mod preset;
pub mod rand;
pub mod raster;
