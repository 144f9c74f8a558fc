/// Error categories.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Point data whose length is not a multiple of 3 (x, y, z).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Shader compilation failed during `attach`.
    #[error("Shader compile error: {0}")]
    ShaderCompile(String),

    /// Shader program linking failed during `attach`.
    #[error("Shader link error: {0}")]
    ShaderLink(String),

    /// The device rejected a buffer allocation while growing.
    #[error("Out of device memory: {0}")]
    OutOfDeviceMemory(String),

    /// A lifecycle hook was called out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// WebGL resource creation or lookup errors.
    #[error("Resource error: {0}")]
    Resource(String),
}

impl Error {
    // Helper constructors for common error scenarios

    // Geometry errors
    pub(crate) fn coordinate_count_not_triples(len: usize) -> Self {
        Self::InvalidGeometry(format!(
            "each point must contain 3 coordinates (x, y, z), got {len} values"
        ))
    }

    // Shader errors
    pub(crate) fn shader_creation_failed(stage: &str) -> Self {
        Self::ShaderCompile(format!("failed to create {stage} shader object"))
    }

    pub(crate) fn shader_compile_failed(stage: &str, log: String) -> Self {
        Self::ShaderCompile(format!("{stage} shader: {log}"))
    }

    pub(crate) fn program_creation_failed() -> Self {
        Self::ShaderLink("failed to create program object".to_string())
    }

    pub(crate) fn shader_link_failed(log: String) -> Self {
        Self::ShaderLink(log)
    }

    // Resource errors
    pub(crate) fn buffer_creation_failed() -> Self {
        Self::Resource("failed to create geometry buffer".to_string())
    }

    pub(crate) fn buffer_allocation_failed(capacity: usize) -> Self {
        Self::OutOfDeviceMemory(format!(
            "failed to allocate {capacity} byte geometry buffer"
        ))
    }

    pub(crate) fn texture_creation_failed() -> Self {
        Self::Resource("failed to create sprite atlas texture".to_string())
    }

    pub(crate) fn image_upload_failed() -> Self {
        Self::Resource("failed to upload sprite atlas image".to_string())
    }

    pub(crate) fn attribute_location_failed(name: &str) -> Self {
        Self::Resource(format!("failed to get attribute location: {name}"))
    }

    pub(crate) fn uniform_location_failed(name: &str) -> Self {
        Self::Resource(format!("failed to get uniform location: {name}"))
    }

    // Lifecycle errors
    pub(crate) fn already_attached(id: &str) -> Self {
        Self::InvalidState(format!("layer {id:?} is already attached"))
    }

    pub(crate) fn not_attached(id: &str) -> Self {
        Self::InvalidState(format!("layer {id:?} is not attached"))
    }
}
