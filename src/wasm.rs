//! JavaScript API for driving overlay layers from a web map host.
//!
//! The wrappers map 1:1 onto the host map's custom-layer callbacks:
//! `onAdd` → `attach`, `prerender` → `prepare`, `render` → `draw`,
//! `onRemove` → `detach`.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;
use web_sys::WebGl2RenderingContext;

use crate::{
    ShaderSource,
    gl::{CustomLayer, LAYER_KIND, PointLayer},
};

/// Installs the panic hook so Rust panics surface in the browser
/// console. Call once before constructing any layer.
#[wasm_bindgen(js_name = init)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// JavaScript wrapper for [`PointLayer`].
///
/// Thin `#[wasm_bindgen]` wrapper that delegates to the Rust layer.
#[wasm_bindgen(js_name = PointLayer)]
#[derive(Debug)]
pub struct JsPointLayer {
    layer: PointLayer,
}

#[wasm_bindgen(js_class = PointLayer)]
impl JsPointLayer {
    /// Creates a layer rendering `coordinates` (a flat
    /// `[x, y, z, x, y, z, ..]` array) with the default point shaders.
    ///
    /// # Errors
    /// If the coordinate count is not a multiple of 3.
    #[wasm_bindgen(constructor)]
    pub fn new(id: &str, coordinates: &Float32Array) -> Result<JsPointLayer, JsError> {
        let layer = PointLayer::new(id, coordinates.to_vec())?;
        Ok(Self { layer })
    }

    /// Identifier the layer registers under with the host map.
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.layer.id().to_string()
    }

    /// Component kind tag for the host's style (`"custom"`).
    #[wasm_bindgen(getter, js_name = "type")]
    pub fn kind(&self) -> String {
        LAYER_KIND.to_string()
    }

    /// Replaces the rendered points; takes effect on the next frame.
    ///
    /// # Errors
    /// If the coordinate count is not a multiple of 3; the previous
    /// points stay in place.
    #[wasm_bindgen(js_name = setCoordinates)]
    pub fn set_coordinates(&mut self, coordinates: &Float32Array) -> Result<(), JsError> {
        Ok(self.layer.set_coordinates(coordinates.to_vec())?)
    }

    /// Replaces the shader pair compiled when the layer is added to the
    /// map.
    #[wasm_bindgen(js_name = setShaderSource)]
    pub fn set_shader_source(&mut self, vertex: &str, fragment: &str) {
        self.layer
            .set_shader_source(ShaderSource::new(vertex, fragment));
    }

    /// Host `onAdd` callback.
    ///
    /// # Errors
    /// On shader compile/link failure or device resource failure.
    #[wasm_bindgen(js_name = onAdd)]
    pub fn on_add(&mut self, gl: &WebGl2RenderingContext) -> Result<(), JsError> {
        Ok(self.layer.attach(gl)?)
    }

    /// Host `prerender` callback; flushes pending geometry to the
    /// device.
    ///
    /// # Errors
    /// On device allocation failure; the previous geometry stays
    /// drawable.
    pub fn prerender(&mut self, gl: &WebGl2RenderingContext) -> Result<(), JsError> {
        Ok(self.layer.prepare(gl)?)
    }

    /// Host `render` callback. `matrix` is the 16-element column-major
    /// projection matrix the host supplies each frame.
    ///
    /// # Errors
    /// If the matrix is malformed or the layer was never added.
    pub fn render(
        &mut self,
        gl: &WebGl2RenderingContext,
        matrix: &Float32Array,
    ) -> Result<(), JsError> {
        if matrix.length() != 16 {
            return Err(JsError::new("expected a 16-element column-major matrix"));
        }

        let mut m = [0.0f32; 16];
        matrix.copy_to(&mut m);
        Ok(self.layer.draw(gl, &m)?)
    }

    /// Host `onRemove` callback; releases all device resources.
    ///
    /// # Errors
    /// If the layer was never added.
    #[wasm_bindgen(js_name = onRemove)]
    pub fn on_remove(&mut self, gl: &WebGl2RenderingContext) -> Result<(), JsError> {
        Ok(self.layer.detach(gl)?)
    }
}
