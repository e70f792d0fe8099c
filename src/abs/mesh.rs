//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing static mesh data on the GPU side.
//! Vertices should implement the [`Vertex`] trait.

use std::sync::Arc;

use glow::HasContext;

use crate::{
    abs::ShaderProgram,
    error::{Error, Result},
};

/// Trait that defines the necessary methods for a vertex.
///
/// # Safety
///
/// [`Mesh::new`] uploads vertices as raw bytes, so implementors must be
/// `#[repr(C)]` with no padding bytes.
pub unsafe trait Vertex {
    /// Sets up the vertex attribute pointers, resolving input slots from `program`.
    fn vertex_attribs(gl: &glow::Context, program: &ShaderProgram) -> Result<()>;
}

/// Represents a mesh stored on the GPU side.
///
/// Meshes without an index buffer are drawn with `glDrawArrays`.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: Option<glow::Buffer>,
    vertex_count: usize,
    index_count: usize,
}

impl Mesh {
    /// Uploads the given vertex and optional index data.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        program: &ShaderProgram,
        vertices: &[V],
        indices: Option<&[u32]>,
        draw_mode: u32,
    ) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::Gl)?;
            let vbo = gl.create_buffer().map_err(Error::Gl)?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            // `V: Vertex` guarantees every byte of the slice is initialized.
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    std::mem::size_of_val(vertices),
                ),
                glow::STATIC_DRAW,
            );

            let ebo = match indices {
                Some(indices) => {
                    let ebo = gl.create_buffer().map_err(Error::Gl)?;
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
                    gl.buffer_data_u8_slice(
                        glow::ELEMENT_ARRAY_BUFFER,
                        std::slice::from_raw_parts(
                            indices.as_ptr() as *const u8,
                            std::mem::size_of_val(indices),
                        ),
                        glow::STATIC_DRAW,
                    );
                    Some(ebo)
                }
                None => None,
            };

            V::vertex_attribs(gl, program)?;

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo,
                ebo,
                vertex_count: vertices.len(),
                index_count: indices.map_or(0, <[u32]>::len),
            })
        }
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            if self.ebo.is_some() {
                self.gl
                    .draw_elements(self.draw_mode, self.index_count as i32, glow::UNSIGNED_INT, 0);
            } else {
                self.gl
                    .draw_arrays(self.draw_mode, 0, self.vertex_count as i32);
            }
            self.gl.bind_vertex_array(None);
        }
    }

    /// Returns the number of vertices uploaded.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            if let Some(ebo) = self.ebo {
                self.gl.delete_buffer(ebo);
            }
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
