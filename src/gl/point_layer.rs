use compact_str::CompactString;
use web_sys::WebGlUniformLocation;

use crate::{
    error::Error,
    geometry::{COORDS_PER_POINT, PointSet},
    gl::{
        CustomLayer, GL, ShaderProgram, ShaderSource,
        buffer::{CapacityTracker, GeometryBuffer},
    },
};

/// Attribute the position data binds to in the vertex shader.
const POSITION_ATTRIBUTE: &str = "a_position";
/// Uniform carrying the host's projection matrix.
const MATRIX_UNIFORM: &str = "u_matrix";

/// Renders points decoupled from the host map's styling layer, allowing
/// them to update every frame for smooth animation.
///
/// The layer owns a CPU-side [`PointSet`] and a device-side buffer of
/// possibly larger capacity. [`set_coordinates`] replaces the point set
/// and defers all device work to the next [`prepare`]: replacements
/// between two frames coalesce into a single upload, and the device
/// buffer grows to twice the logical size whenever the point set
/// outgrows it, so repeated small appends amortize to O(1)
/// reallocations. Shrinking never shrinks the buffer.
///
/// The host drives the layer through the [`CustomLayer`] hooks: `attach`
/// once, `prepare` + `draw` each frame, `detach` once. `detach` is the
/// only teardown path; dropping an attached layer leaks its device
/// buffer and program.
///
/// [`set_coordinates`]: PointLayer::set_coordinates
/// [`prepare`]: CustomLayer::prepare
#[derive(Debug)]
pub struct PointLayer {
    id: CompactString,
    points: PointSet,
    shader_source: ShaderSource,
    tracker: CapacityTracker,
    /// Vertices resident on the device: what `draw` renders, and what
    /// stays on screen while an upload is pending.
    device_vertex_count: usize,
    gpu: Option<GpuResources>,
}

/// Device resources created in `attach` and released in `detach`.
#[derive(Debug)]
struct GpuResources {
    buffer: GeometryBuffer,
    shader: ShaderProgram,
    position_attribute: u32,
    matrix_location: WebGlUniformLocation,
}

impl GpuResources {
    /// Allocates the initial device buffer sized to the point set,
    /// uploads it in full, and compiles the shader program.
    fn new(gl: &GL, points: &PointSet, source: &ShaderSource) -> Result<Self, Error> {
        let buffer = GeometryBuffer::allocate(gl, points.byte_len())?;
        buffer.upload(gl, points.as_slice());

        match Self::create_program(gl, source) {
            Ok((shader, position_attribute, matrix_location)) => Ok(Self {
                buffer,
                shader,
                position_attribute,
                matrix_location,
            }),
            Err(e) => {
                // a failed attach leaves nothing usable behind
                buffer.delete(gl);
                Err(e)
            },
        }
    }

    fn create_program(
        gl: &GL,
        source: &ShaderSource,
    ) -> Result<(ShaderProgram, u32, WebGlUniformLocation), Error> {
        let shader = ShaderProgram::create(gl, source)?;

        let locations = shader
            .attrib_location(gl, POSITION_ATTRIBUTE)
            .and_then(|attrib| {
                let matrix = shader.uniform_location(gl, MATRIX_UNIFORM)?;
                Ok((attrib, matrix))
            });

        match locations {
            Ok((position_attribute, matrix_location)) => {
                Ok((shader, position_attribute, matrix_location))
            },
            Err(e) => {
                shader.delete(gl);
                Err(e)
            },
        }
    }

    fn delete(self, gl: &GL) {
        self.buffer.delete(gl);
        self.shader.delete(gl);
    }
}

impl PointLayer {
    /// Creates a layer rendering `coordinates` with the default point
    /// shaders.
    ///
    /// No device resources exist until the layer is attached.
    ///
    /// # Errors
    /// [`Error::InvalidGeometry`] if the coordinate count is not a
    /// multiple of 3.
    pub fn new(
        id: impl Into<CompactString>,
        coordinates: impl Into<Vec<f32>>,
    ) -> Result<Self, Error> {
        Self::with_shader_source(id, coordinates, ShaderSource::default())
    }

    /// Creates a layer with a custom shader pair.
    ///
    /// # Errors
    /// [`Error::InvalidGeometry`] if the coordinate count is not a
    /// multiple of 3.
    pub fn with_shader_source(
        id: impl Into<CompactString>,
        coordinates: impl Into<Vec<f32>>,
        shader_source: ShaderSource,
    ) -> Result<Self, Error> {
        let points = PointSet::new(coordinates)?;

        let mut tracker = CapacityTracker::default();
        tracker.record_write(points.byte_len());

        Ok(Self {
            id: id.into(),
            points,
            shader_source,
            tracker,
            device_vertex_count: 0,
            gpu: None,
        })
    }

    /// Creates a builder for a layer registered under `id`.
    pub fn builder(id: impl Into<CompactString>) -> PointLayerBuilder {
        PointLayerBuilder::new(id.into())
    }

    /// Replaces the rendered points, deferring the upload (and any
    /// buffer growth) to the next [`prepare`](CustomLayer::prepare).
    /// CPU-side bookkeeping only; performs no device I/O.
    ///
    /// # Errors
    /// [`Error::InvalidGeometry`] if the coordinate count is not a
    /// multiple of 3; the previous point set and any pending upload are
    /// left untouched.
    pub fn set_coordinates(&mut self, coordinates: impl Into<Vec<f32>>) -> Result<(), Error> {
        let points = PointSet::new(coordinates)?;

        self.tracker.record_write(points.byte_len());
        self.points = points;
        Ok(())
    }

    /// Replaces the shader pair compiled by the next
    /// [`attach`](CustomLayer::attach). Has no effect on an already
    /// compiled program.
    pub fn set_shader_source(&mut self, shader_source: ShaderSource) {
        self.shader_source = shader_source;
    }

    /// Number of points in the current (CPU-side) point set.
    pub fn vertex_count(&self) -> usize {
        self.points.vertex_count()
    }

    /// Number of vertices the device buffer holds; differs from
    /// [`vertex_count`](PointLayer::vertex_count) exactly while an
    /// upload is pending.
    pub fn device_vertex_count(&self) -> usize {
        self.device_vertex_count
    }

    /// Bytes currently allocated on the device; zero while detached.
    pub fn device_capacity(&self) -> usize {
        self.tracker.capacity()
    }

    /// True when the point set has changed since the last upload, i.e.
    /// a draw before the next `prepare` would render stale geometry.
    pub fn has_pending_upload(&self) -> bool {
        self.tracker.is_dirty()
    }

    /// True between a successful `attach` and the matching `detach`.
    pub fn is_attached(&self) -> bool {
        self.gpu.is_some()
    }

    fn require_attached(&self) -> Result<&GpuResources, Error> {
        self.gpu.as_ref().ok_or_else(|| Error::not_attached(&self.id))
    }

    fn mark_uploaded(&mut self) {
        self.tracker.mark_uploaded();
        self.device_vertex_count = self.points.vertex_count();
    }
}

impl CustomLayer for PointLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn attach(&mut self, gl: &GL) -> Result<(), Error> {
        if self.gpu.is_some() {
            return Err(Error::already_attached(&self.id));
        }

        self.gpu = Some(GpuResources::new(gl, &self.points, &self.shader_source)?);
        self.tracker.reset(self.points.byte_len());
        self.device_vertex_count = self.points.vertex_count();
        Ok(())
    }

    fn detach(&mut self, gl: &GL) -> Result<(), Error> {
        let gpu = self
            .gpu
            .take()
            .ok_or_else(|| Error::not_attached(&self.id))?;
        gpu.delete(gl);

        self.tracker.release();
        self.device_vertex_count = 0;
        Ok(())
    }

    fn prepare(&mut self, gl: &GL) -> Result<(), Error> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Err(Error::not_attached(&self.id));
        };

        // step 1: grow the device buffer when the point set outgrew it.
        // Acquire new, upload, swap, release old; a failed allocation
        // leaves the old buffer and its contents untouched, and the
        // host's next prepare attempts the grow afresh.
        if self.tracker.needs_growth() {
            let grown = GeometryBuffer::allocate(gl, self.tracker.target_capacity())?;
            grown.upload(gl, self.points.as_slice());

            let old = std::mem::replace(&mut gpu.buffer, grown);
            old.delete(gl);

            self.tracker.commit_growth();
            self.mark_uploaded();
            return Ok(());
        }

        // step 2: flush a pending upload into the existing buffer
        if self.tracker.is_dirty() {
            gpu.buffer.upload(gl, self.points.as_slice());
            self.mark_uploaded();
        }

        Ok(())
    }

    fn draw(&mut self, gl: &GL, matrix: &[f32; 16]) -> Result<(), Error> {
        let gpu = self.require_attached()?;

        gpu.shader.use_program(gl);
        gl.uniform_matrix4fv_with_f32_array(Some(&gpu.matrix_location), false, matrix);

        gpu.buffer.bind(gl);
        gl.enable_vertex_attrib_array(gpu.position_attribute);
        gl.vertex_attrib_pointer_with_i32(
            gpu.position_attribute,
            COORDS_PER_POINT as i32,
            GL::FLOAT,
            false,
            0,
            0,
        );

        // renders whatever prepare last uploaded; while an upload is
        // pending the previous point set stays on screen
        gl.draw_arrays(GL::POINTS, 0, self.device_vertex_count as i32);
        Ok(())
    }
}

/// Builder for [`PointLayer`].
#[derive(Debug)]
pub struct PointLayerBuilder {
    id: CompactString,
    coordinates: Vec<f32>,
    shader_source: ShaderSource,
}

impl PointLayerBuilder {
    fn new(id: CompactString) -> Self {
        Self {
            id,
            coordinates: Vec::new(),
            shader_source: ShaderSource::default(),
        }
    }

    /// Sets the initial flat `[x, y, z, ..]` coordinate buffer.
    #[must_use]
    pub fn coordinates(mut self, coordinates: impl Into<Vec<f32>>) -> Self {
        self.coordinates = coordinates.into();
        self
    }

    /// Replaces the default shader pair.
    #[must_use]
    pub fn shader_source(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.shader_source = ShaderSource::new(vertex, fragment);
        self
    }

    /// Builds the layer.
    ///
    /// # Errors
    /// [`Error::InvalidGeometry`] if the coordinate count is not a
    /// multiple of 3.
    pub fn build(self) -> Result<PointLayer, Error> {
        PointLayer::with_shader_source(self.id, self.coordinates, self.shader_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(coords: &[f32]) -> PointLayer {
        PointLayer::new("points", coords.to_vec()).unwrap()
    }

    #[test]
    fn test_constructor_rejects_partial_triples() {
        let result = PointLayer::new("points", vec![1.0, 2.0]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_builder_defaults_and_custom_shaders() {
        let layer = PointLayer::builder("points")
            .coordinates(vec![0.0, 0.0, 0.0])
            .shader_source("void main() {}", "void main() {}")
            .build()
            .unwrap();

        assert_eq!(layer.id(), "points");
        assert_eq!(layer.kind(), "custom");
        assert_eq!(layer.vertex_count(), 1);
    }

    #[test]
    fn test_rejected_coordinates_preserve_previous_state() {
        let mut layer = layer(&[0.0, 0.0, 0.0]);
        layer.tracker.mark_uploaded();

        let result = layer.set_coordinates(vec![1.0, 2.0]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));

        // the old point set and the clean dirty flag both survive
        assert_eq!(layer.vertex_count(), 1);
        assert!(!layer.has_pending_upload());
    }

    #[test]
    fn test_replacements_coalesce_to_latest() {
        let mut layer = layer(&[0.0, 0.0, 0.0]);
        let b = [1.0, 1.0, 1.0, 2.0, 2.0, 2.0];

        layer.set_coordinates(vec![9.0, 9.0, 9.0]).unwrap();
        layer.set_coordinates(b.to_vec()).unwrap();

        // one pending upload, containing only the latest set
        assert!(layer.has_pending_upload());
        assert_eq!(layer.points.as_slice(), &b);
    }

    #[test]
    fn test_stale_draw_is_detectable() {
        let mut layer = layer(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

        // simulate the bookkeeping of attach + one prepared frame
        layer.tracker.reset(layer.points.byte_len());
        layer.device_vertex_count = layer.points.vertex_count();

        layer
            .set_coordinates(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0])
            .unwrap();

        // a draw now would render the stale device contents
        assert!(layer.has_pending_upload());
        assert_eq!(layer.device_vertex_count(), 2);
        assert_eq!(layer.vertex_count(), 3);
    }

    #[test]
    fn test_growth_scheduled_when_points_outgrow_capacity() {
        let mut layer = layer(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);

        // attach sizes the buffer to the logical size: 2 points, 24 bytes
        layer.tracker.reset(layer.points.byte_len());
        assert_eq!(layer.device_capacity(), 24);

        layer
            .set_coordinates(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0])
            .unwrap();

        // 3 points = 36 bytes, doubled to 72
        assert!(layer.tracker.needs_growth());
        assert_eq!(layer.tracker.target_capacity(), 72);
    }

    #[test]
    fn test_hooks_require_attachment() {
        let layer = layer(&[0.0, 0.0, 0.0]);

        assert!(!layer.is_attached());
        assert!(matches!(
            layer.require_attached(),
            Err(Error::InvalidState(_))
        ));
    }
}
