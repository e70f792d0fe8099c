//! The [`Scene`] trait driven by [`crate::abs::App`], and the rotating cube scene.

use std::sync::Arc;

use glam::Mat4;
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, Texture},
    cube::CUBE_VERTICES,
    error::Result,
    lifecycle::{Lifecycle, LifecycleEvent, WindowState},
    other::UpdateContext,
    settings::Settings,
    transform::{self, RotationClock, Viewport},
};

pub enum SceneSwitch {
    None,
    Quit,
}

/// Window lifecycle callbacks, called in the order load, then per frame
/// events, update and render, then unload.
pub trait Scene {
    /// Creates the scene's GPU objects.
    fn load(&mut self, gl: &Arc<glow::Context>) -> Result<()>;

    /// Handles an event.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}

    /// Called when the drawable area changes size.
    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32);

    /// Updates the scene state.
    fn update(&mut self, _ctx: &UpdateContext) -> SceneSwitch {
        SceneSwitch::None
    }

    /// Renders the scene. `delta_time` is the time since the last frame in seconds.
    fn render(&mut self, gl: &glow::Context, delta_time: f64) -> Result<()>;

    /// Releases the scene's GPU objects.
    fn unload(&mut self);
}

/// GPU objects owned by a loaded [`CubeScene`].
struct CubeResources {
    program: ShaderProgram,
    mesh: Mesh,
    textures: [Texture; 2],
}

/// A textured unit cube spinning about the X axis.
pub struct CubeScene {
    settings: Settings,
    lifecycle: Lifecycle,
    resources: Option<CubeResources>,
    clock: RotationClock,
    size: (u32, u32),
    view: Mat4,
    projection: Mat4,
}

impl CubeScene {
    /// Creates an unloaded scene for a drawable area of `width` x `height`.
    pub fn new(settings: Settings, width: u32, height: u32) -> Self {
        Self {
            clock: RotationClock::new(settings.degrees_per_second),
            settings,
            lifecycle: Lifecycle::default(),
            resources: None,
            size: (width, height),
            view: transform::view_matrix(),
            projection: transform::projection_matrix(width, height),
        }
    }

    pub fn state(&self) -> WindowState {
        self.lifecycle.state()
    }

    /// Records the new drawable size and recomputes the projection, returning
    /// the viewport that covers it.
    fn set_size(&mut self, width: u32, height: u32) -> Viewport {
        self.size = (width, height);
        self.projection = transform::projection_matrix(width, height);
        Viewport::from_size(width, height)
    }

    fn load_resources(&self, gl: &Arc<glow::Context>) -> Result<CubeResources> {
        let settings = &self.settings;
        let program = ShaderProgram::from_paths(
            gl,
            settings.asset_path(&settings.vertex_shader),
            settings.asset_path(&settings.fragment_shader),
        )?;
        program.use_program();

        let mesh = Mesh::new(gl, &program, &CUBE_VERTICES, None, glow::TRIANGLES)?;
        log::debug!("uploaded cube mesh with {} vertices", mesh.vertex_count());

        let textures = [
            Texture::from_path(gl, settings.asset_path(&settings.textures[0]), 0)?,
            Texture::from_path(gl, settings.asset_path(&settings.textures[1]), 1)?,
        ];
        program.set_int("texture0", 0)?;
        program.set_int("texture1", 1)?;
        log::debug!("cached {} uniform locations", program.uniforms().len());

        Ok(CubeResources {
            program,
            mesh,
            textures,
        })
    }
}

impl Scene for CubeScene {
    fn load(&mut self, gl: &Arc<glow::Context>) -> Result<()> {
        let [r, g, b, a] = self.settings.clear_color;
        unsafe {
            gl.clear_color(r, g, b, a);
        }

        self.resources = Some(self.load_resources(gl)?);

        let (width, height) = self.size;
        self.resize(gl, width, height);
        unsafe {
            gl.enable(glow::DEPTH_TEST);
        }
        self.lifecycle.handle(LifecycleEvent::Load);
        Ok(())
    }

    fn handle_event(&mut self, event: &sdl2::event::Event) {
        if let sdl2::event::Event::Quit { .. } = event {
            self.lifecycle.handle(LifecycleEvent::CloseRequested);
        }
    }

    fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) {
        self.set_size(width, height).apply(gl);
        log::debug!("resized to {width}x{height}");
    }

    fn update(&mut self, ctx: &UpdateContext) -> SceneSwitch {
        self.lifecycle.update(ctx.keyboard);
        if self.lifecycle.should_close() {
            SceneSwitch::Quit
        } else {
            SceneSwitch::None
        }
    }

    fn render(&mut self, gl: &glow::Context, delta_time: f64) -> Result<()> {
        let Some(resources) = &self.resources else {
            return Ok(());
        };
        self.lifecycle.handle(LifecycleEvent::Frame);

        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.clock.advance(delta_time);
        let model = self.clock.model_matrix();

        resources.textures[0].bind(0);
        resources.textures[1].bind(1);

        let program = &resources.program;
        program.set_matrix4("model", model)?;
        program.set_matrix4("view", self.view)?;
        program.set_matrix4("projection", self.projection)?;
        program.use_program();

        resources.mesh.draw();
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(mut resources) = self.resources.take() {
            resources.program.dispose();
        }
        self.lifecycle.handle(LifecycleEvent::Unload);
        log::info!(
            "scene unloaded after rotating {:.1} degrees",
            self.clock.degrees()
        );
    }
}
