use web_sys::{WebGlProgram, WebGlShader, WebGlUniformLocation};

use crate::{error::Error, gl::GL};

const DEFAULT_VERTEX_GLSL: &str = include_str!("../shaders/point.vert");
const DEFAULT_FRAGMENT_GLSL: &str = include_str!("../shaders/point.frag");

/// Vertex and fragment shader source pair for a layer's program.
///
/// Plain configuration data; compilation happens during `attach`. The
/// default pair projects a 3-component `a_position` through the host's
/// `u_matrix` and renders fixed-size opaque red points. Custom sources
/// must declare the same `a_position` attribute and `u_matrix` uniform.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Vertex shader source.
    pub vertex: String,
    /// Fragment shader source.
    pub fragment: String,
}

impl ShaderSource {
    /// Creates a source pair from the two shader strings.
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl Default for ShaderSource {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_GLSL, DEFAULT_FRAGMENT_GLSL)
    }
}

/// A compiled and linked shader program.
#[derive(Debug)]
pub(crate) struct ShaderProgram {
    program: WebGlProgram,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a program.
    ///
    /// # Errors
    /// [`Error::ShaderCompile`] with the driver's info log when either
    /// stage fails, [`Error::ShaderLink`] when linking fails. Nothing
    /// usable is left on the device after a failure.
    pub(crate) fn create(gl: &GL, source: &ShaderSource) -> Result<Self, Error> {
        let vertex = compile_shader(gl, GL::VERTEX_SHADER, &source.vertex)?;
        let fragment = match compile_shader(gl, GL::FRAGMENT_SHADER, &source.fragment) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(Some(&vertex));
                return Err(e);
            },
        };

        let linked = link_program(gl, &vertex, &fragment);

        // the program owns the stages once linked; the shader objects
        // are no longer needed either way
        gl.delete_shader(Some(&vertex));
        gl.delete_shader(Some(&fragment));

        Ok(Self { program: linked? })
    }

    /// Makes the program the active one.
    pub(crate) fn use_program(&self, gl: &GL) {
        gl.use_program(Some(&self.program));
    }

    /// Resolves a vertex attribute by name.
    pub(crate) fn attrib_location(&self, gl: &GL, name: &str) -> Result<u32, Error> {
        let location = gl.get_attrib_location(&self.program, name);
        if location < 0 {
            return Err(Error::attribute_location_failed(name));
        }

        Ok(location as u32)
    }

    /// Resolves a uniform by name.
    pub(crate) fn uniform_location(
        &self,
        gl: &GL,
        name: &str,
    ) -> Result<WebGlUniformLocation, Error> {
        gl.get_uniform_location(&self.program, name)
            .ok_or(Error::uniform_location_failed(name))
    }

    /// Releases the program.
    pub(crate) fn delete(&self, gl: &GL) {
        gl.delete_program(Some(&self.program));
    }
}

fn compile_shader(gl: &GL, stage: u32, src: &str) -> Result<WebGlShader, Error> {
    let name = if stage == GL::VERTEX_SHADER {
        "vertex"
    } else {
        "fragment"
    };

    let shader = gl
        .create_shader(stage)
        .ok_or(Error::shader_creation_failed(name))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if !compiled {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(Error::shader_compile_failed(name, log));
    }

    Ok(shader)
}

fn link_program(
    gl: &GL,
    vertex: &WebGlShader,
    fragment: &WebGlShader,
) -> Result<WebGlProgram, Error> {
    let program = gl.create_program().ok_or(Error::program_creation_failed())?;
    gl.attach_shader(&program, vertex);
    gl.attach_shader(&program, fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if !linked {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        return Err(Error::shader_link_failed(log));
    }

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_declare_layer_contract() {
        let source = ShaderSource::default();
        assert!(source.vertex.contains("a_position"));
        assert!(source.vertex.contains("u_matrix"));
        assert!(source.fragment.contains("gl_FragColor"));
    }
}
