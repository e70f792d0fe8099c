//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Uniform locations are resolved once when a program is linked and kept in a
//! [`UniformCache`]; the [`Uniform`] trait uploads a value to a cached location.

use std::{fmt, path::Path, sync::Arc};

use fxhash::FxHashMap;
use glam::Mat4;
use glow::HasContext;

use crate::error::{Error, Result};

/// The pipeline stage a [`Shader`] is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Fragment,
}

impl ShaderType {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderType::Vertex => glow::VERTEX_SHADER,
            ShaderType::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderType::Vertex => write!(f, "vertex"),
            ShaderType::Fragment => write!(f, "fragment"),
        }
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
    declared_uniforms: Vec<String>,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    pub fn new(gl: &Arc<glow::Context>, shader_type: ShaderType, source: &str) -> Result<Self> {
        unsafe {
            let shader = gl.create_shader(shader_type.gl_enum()).map_err(Error::Gl)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                log::error!("{shader_type} shader failed to compile:\n{log}");
                return Err(Error::Compile {
                    stage: shader_type,
                    log,
                });
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
                declared_uniforms: declared_uniforms(source),
            })
        }
    }

    /// Reads the source file at `path` and compiles it.
    pub fn from_path(
        gl: &Arc<glow::Context>,
        shader_type: ShaderType,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("compiling {shader_type} shader {}", path.display());
        Self::new(gl, shader_type, &source)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Scans GLSL source for the names of the `uniform` variables it declares.
///
/// Uniform blocks are skipped, array suffixes are stripped and comma-separated
/// declarations yield one name each.
pub fn declared_uniforms(source: &str) -> Vec<String> {
    let mut stripped = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        stripped.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    stripped.push_str(rest);

    let code: String = stripped
        .lines()
        .map(|line| line.split("//").next().unwrap_or(""))
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut names = Vec::new();
    for statement in code.split(';') {
        // Anything before the last brace belongs to a function body or a block.
        let statement = statement.rsplit(['{', '}']).next().unwrap_or("").trim();
        let statement = match statement.strip_prefix("layout") {
            Some(qualified) => match qualified.find(')') {
                Some(end) => qualified[end + 1..].trim_start(),
                None => continue,
            },
            None => statement,
        };
        let Some(declaration) = statement.strip_prefix("uniform") else {
            continue;
        };
        if !declaration.starts_with(char::is_whitespace) {
            continue;
        }

        for (i, declarator) in declaration.split(',').enumerate() {
            let declarator = declarator.split('=').next().unwrap_or("").trim();
            // Only the first declarator carries the type.
            let name = if i == 0 {
                declarator.split_whitespace().last()
            } else {
                declarator.split_whitespace().next()
            };
            if let Some(name) = name {
                let name = name.split('[').next().unwrap_or(name);
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}

/// Maps uniform names to their locations in a linked program.
///
/// Built once after linking and never modified afterwards. Array uniforms that
/// the driver reports as `name[0]` can also be looked up as `name`.
#[derive(Debug, Clone)]
pub struct UniformCache<L> {
    locations: FxHashMap<String, L>,
}

impl<L: Clone> UniformCache<L> {
    /// Builds the cache from `(name, location)` pairs.
    pub fn from_locations(locations: impl IntoIterator<Item = (String, L)>) -> Self {
        let mut map = FxHashMap::default();
        for (name, location) in locations {
            if let Some(base) = name.strip_suffix("[0]") {
                map.insert(base.to_string(), location.clone());
            }
            map.insert(name, location);
        }
        Self { locations: map }
    }

    /// Returns the cached location of `name`.
    pub fn get(&self, name: &str) -> Result<&L> {
        self.locations
            .get(name)
            .ok_or_else(|| Error::UnknownUniform(name.to_string()))
    }

    /// Returns whether `name` has a cached location.
    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Returns the number of cached names, array base names included.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns whether no uniform locations were cached.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Uploads the value to the given location of the currently bound program.
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_1_i32(Some(location), *self) }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe { gl.uniform_matrix_4_f32_slice(Some(location), false, &self.to_cols_array()) }
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    uniforms: UniformCache<glow::UniformLocation>,
    disposed: bool,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders and caches its uniform locations.
    pub fn new(gl: &Arc<glow::Context>, shaders: &[&Shader]) -> Result<Self> {
        unsafe {
            let program = gl.create_program().map_err(Error::Gl)?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                log::error!("shader program failed to link:\n{log}");
                return Err(Error::Link(log));
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            let count = gl.get_active_uniforms(program);
            let mut locations = Vec::with_capacity(count as usize);
            for index in 0..count {
                let Some(active) = gl.get_active_uniform(program, index) else {
                    continue;
                };
                match gl.get_uniform_location(program, &active.name) {
                    Some(location) => locations.push((active.name, location)),
                    // Members of uniform blocks have no location of their own.
                    None => log::debug!("active uniform `{}` has no location", active.name),
                }
            }
            let uniforms = UniformCache::from_locations(locations);
            if uniforms.is_empty() {
                log::warn!("shader program has no active uniforms");
            }

            for name in shaders.iter().flat_map(|s| s.declared_uniforms.iter()) {
                if !uniforms.contains(name) {
                    log::warn!("uniform `{name}` is declared but not active after linking");
                }
            }
            log::debug!("linked shader program with {} active uniforms", count);

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                uniforms,
                disposed: false,
            })
        }
    }

    /// Compiles the vertex and fragment shader at the given paths and links them.
    pub fn from_paths(
        gl: &Arc<glow::Context>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let vert = Shader::from_path(gl, ShaderType::Vertex, vertex_path)?;
        let frag = Shader::from_path(gl, ShaderType::Fragment, fragment_path)?;
        Self::new(gl, &[&vert, &frag])
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets a uniform variable through the location cache.
    ///
    /// The program is bound before the upload.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) -> Result<()> {
        let location = self.uniforms.get(name)?;
        self.use_program();
        value.set_uniform(&self.gl, location);
        Ok(())
    }

    pub fn set_int(&self, name: &str, value: i32) -> Result<()> {
        self.set_uniform(name, value)
    }

    pub fn set_matrix4(&self, name: &str, value: Mat4) -> Result<()> {
        self.set_uniform(name, value)
    }

    /// Returns the input slot of the named vertex attribute.
    pub fn attrib_location(&self, name: &str) -> Result<u32> {
        unsafe { self.gl.get_attrib_location(self.id, name) }
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    pub fn uniforms(&self) -> &UniformCache<glow::UniformLocation> {
        &self.uniforms
    }

    /// Releases the GPU program. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if !self.disposed {
            unsafe {
                self.gl.delete_program(self.id);
            }
            self.disposed = true;
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_uniforms_in_shipped_shaders() {
        let vert = declared_uniforms(include_str!("../../shaders/shader.vert"));
        assert_eq!(vert, vec!["model", "view", "projection"]);

        let frag = declared_uniforms(include_str!("../../shaders/shader.frag"));
        assert_eq!(frag, vec!["texture0", "texture1"]);
    }

    #[test]
    fn test_declared_uniforms_declarator_forms() {
        let source = r#"
            #version 330 core
            // uniform float commented;
            /* uniform float blocked; */
            layout(location = 2) uniform mat4 transform;
            uniform highp vec3 lights[4];
            uniform float near, far = 100.0;
            uniform Matrices {
                mat4 inner;
            };
            in vec3 uniformity;
            void main() { gl_Position = vec4(0.0); }
            uniform int after_body;
        "#;
        assert_eq!(
            declared_uniforms(source),
            vec!["transform", "lights", "near", "far", "after_body"]
        );
    }

    #[test]
    fn test_uniform_cache_lookup() {
        let cache = UniformCache::from_locations(vec![
            ("model".to_string(), 0),
            ("view".to_string(), 1),
            ("lights[0]".to_string(), 4),
        ]);

        assert_eq!(*cache.get("model").unwrap(), 0);
        assert_eq!(*cache.get("view").unwrap(), 1);
        assert_eq!(*cache.get("lights").unwrap(), 4);
        assert_eq!(*cache.get("lights[0]").unwrap(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_uniform_cache_unknown_name() {
        let cache = UniformCache::from_locations(vec![("model".to_string(), 0)]);
        match cache.get("projection") {
            Err(Error::UnknownUniform(name)) => assert_eq!(name, "projection"),
            other => panic!("expected UnknownUniform, got {other:?}"),
        }
    }

    #[test]
    fn test_every_declared_uniform_is_cached() {
        let mut declared = declared_uniforms(include_str!("../../shaders/shader.vert"));
        declared.extend(declared_uniforms(include_str!("../../shaders/shader.frag")));

        let cache = UniformCache::from_locations(
            declared.iter().cloned().enumerate().map(|(i, name)| (name, i as i32)),
        );
        for name in &declared {
            assert!(cache.get(name).is_ok(), "{name} should be cached");
        }
    }
}
