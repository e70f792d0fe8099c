//! The cube mesh: six faces of two triangles each, with interleaved
//! position and texture coordinates.

use glow::HasContext;

use crate::{
    abs::{ShaderProgram, Vertex},
    error::Result,
};

/// Shader input names for the two vertex attributes.
pub const POSITION_ATTRIBUTE: &str = "aPosition";
pub const TEX_COORD_ATTRIBUTE: &str = "aTexCoord";

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

const fn v(x: f32, y: f32, z: f32, u: f32, t: f32) -> CubeVertex {
    CubeVertex {
        position: [x, y, z],
        tex_coord: [u, t],
    }
}

pub const CUBE_VERTICES: [CubeVertex; 36] = [
    // back
    v(-0.5, -0.5, -0.5, 0.0, 0.0),
    v(0.5, -0.5, -0.5, 1.0, 0.0),
    v(0.5, 0.5, -0.5, 1.0, 1.0),
    v(0.5, 0.5, -0.5, 1.0, 1.0),
    v(-0.5, 0.5, -0.5, 0.0, 1.0),
    v(-0.5, -0.5, -0.5, 0.0, 0.0),
    // front
    v(-0.5, -0.5, 0.5, 0.0, 0.0),
    v(0.5, -0.5, 0.5, 1.0, 0.0),
    v(0.5, 0.5, 0.5, 1.0, 1.0),
    v(0.5, 0.5, 0.5, 1.0, 1.0),
    v(-0.5, 0.5, 0.5, 0.0, 1.0),
    v(-0.5, -0.5, 0.5, 0.0, 0.0),
    // left
    v(-0.5, 0.5, 0.5, 1.0, 0.0),
    v(-0.5, 0.5, -0.5, 1.0, 1.0),
    v(-0.5, -0.5, -0.5, 0.0, 1.0),
    v(-0.5, -0.5, -0.5, 0.0, 1.0),
    v(-0.5, -0.5, 0.5, 0.0, 0.0),
    v(-0.5, 0.5, 0.5, 1.0, 0.0),
    // right
    v(0.5, 0.5, 0.5, 1.0, 0.0),
    v(0.5, 0.5, -0.5, 1.0, 1.0),
    v(0.5, -0.5, -0.5, 0.0, 1.0),
    v(0.5, -0.5, -0.5, 0.0, 1.0),
    v(0.5, -0.5, 0.5, 0.0, 0.0),
    v(0.5, 0.5, 0.5, 1.0, 0.0),
    // bottom
    v(-0.5, -0.5, -0.5, 0.0, 1.0),
    v(0.5, -0.5, -0.5, 1.0, 1.0),
    v(0.5, -0.5, 0.5, 1.0, 0.0),
    v(0.5, -0.5, 0.5, 1.0, 0.0),
    v(-0.5, -0.5, 0.5, 0.0, 0.0),
    v(-0.5, -0.5, -0.5, 0.0, 1.0),
    // top
    v(-0.5, 0.5, -0.5, 0.0, 1.0),
    v(0.5, 0.5, -0.5, 1.0, 1.0),
    v(0.5, 0.5, 0.5, 1.0, 0.0),
    v(0.5, 0.5, 0.5, 1.0, 0.0),
    v(-0.5, 0.5, 0.5, 0.0, 0.0),
    v(-0.5, 0.5, -0.5, 0.0, 1.0),
];

// SAFETY: `#[repr(C)]` with five `f32`s and no padding.
unsafe impl Vertex for CubeVertex {
    fn vertex_attribs(gl: &glow::Context, program: &ShaderProgram) -> Result<()> {
        let stride = std::mem::size_of::<CubeVertex>() as i32;
        let position = program.attrib_location(POSITION_ATTRIBUTE)?;
        let tex_coord = program.attrib_location(TEX_COORD_ATTRIBUTE)?;
        unsafe {
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_f32(position, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(tex_coord);
            gl.vertex_attrib_pointer_f32(
                tex_coord,
                2,
                glow::FLOAT,
                false,
                stride,
                std::mem::offset_of!(CubeVertex, tex_coord) as i32,
            );
        }
        Ok(())
    }
}
