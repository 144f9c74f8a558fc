//! Custom overlay layers for web map renderers.
//!
//! Draws point and sprite geometry directly through WebGL2 instead of
//! the host's declarative styling layer, so geometry can be replaced
//! every frame for smooth animation without re-submitting a style
//! change.
//!
//! The host map drives each layer through the [`CustomLayer`] lifecycle:
//! `attach` once when the layer is added, `prepare` followed by `draw`
//! every rendered frame, `detach` once when it is removed. Applications
//! feed geometry with [`PointLayer::set_coordinates`] at any time in
//! between; all device work is deferred to the next `prepare`, where the
//! underlying vertex buffer grows as needed and pending uploads are
//! flushed.

mod error;
mod geometry;
mod gl;

#[cfg(feature = "js-api")]
pub mod wasm;

pub use crate::{
    error::Error,
    geometry::{COORDS_PER_POINT, PointSet},
    gl::*,
};
