use crate::{error::Error, gl::GL};

/// Component kind tag custom layers register under with the host
/// renderer's style.
pub const LAYER_KIND: &str = "custom";

/// Lifecycle contract for overlay layers driven by a host map renderer.
///
/// The host calls, in order over a layer's lifetime:
/// [`attach`](CustomLayer::attach) once when the layer is added to the
/// map, then for every rendered frame [`prepare`](CustomLayer::prepare)
/// followed immediately by [`draw`](CustomLayer::draw), then
/// [`detach`](CustomLayer::detach) once when the layer is removed. All
/// hooks run on the thread driving the host's render loop.
pub trait CustomLayer {
    /// Identifier the layer is registered under with the host.
    fn id(&self) -> &str;

    /// Component kind tag reported to the host renderer.
    fn kind(&self) -> &'static str {
        LAYER_KIND
    }

    /// Called once when the layer is added to the map. Creates all
    /// device resources the layer needs.
    ///
    /// # Errors
    /// Implementations propagate device failures; on error the layer
    /// must be left without usable device state.
    fn attach(&mut self, gl: &GL) -> Result<(), Error>;

    /// Called once when the layer is removed from the map. Releases
    /// every device resource created by
    /// [`attach`](CustomLayer::attach); skipping it leaks them.
    ///
    /// # Errors
    /// [`Error::InvalidState`] when the layer is not attached.
    fn detach(&mut self, gl: &GL) -> Result<(), Error>;

    /// Called once per frame, before [`draw`](CustomLayer::draw).
    /// Performs deferred device work (reallocation, uploads); never
    /// draws.
    ///
    /// # Errors
    /// Implementations propagate device failures.
    fn prepare(&mut self, gl: &GL) -> Result<(), Error>;

    /// Called once per frame, after [`prepare`](CustomLayer::prepare).
    ///
    /// `matrix` is the host's column-major 4x4 projection matrix,
    /// supplied fresh each frame; implementations must not cache it
    /// across frames.
    ///
    /// # Errors
    /// [`Error::InvalidState`] when called without device state to draw
    /// from.
    fn draw(&mut self, gl: &GL, matrix: &[f32; 16]) -> Result<(), Error>;
}
