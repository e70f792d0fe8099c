//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application, and
//! drives a [`Scene`] through its lifecycle.

use std::{sync::Arc, time::Instant};

use crate::{
    error::{Error, Result},
    other::{KeyboardState, UpdateContext},
    scene::{Scene, SceneSwitch},
};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

fn window_error(e: impl ToString) -> Error {
    Error::Window(e.to_string())
}

impl App {
    /// Creates a new [`App`] instance with the specified title, width, and height.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    pub fn new(title: &str, width: u32, height: u32, fullscreen: bool) -> Result<Self> {
        let sdl = sdl2::init().map_err(window_error)?;
        let video_subsystem = sdl.video().map_err(window_error)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        let (width, height) = if fullscreen {
            let display_mode = video_subsystem
                .current_display_mode(0)
                .map_err(window_error)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (width, height)
        };
        let mut window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(window_error)?;
        if fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(window_error)?;
        }
        let gl_context = window.gl_create_context().map_err(window_error)?;
        window.gl_make_current(&gl_context).map_err(window_error)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(window_error)?;
        log::info!("opened {width}x{height} window \"{title}\" with an OpenGL 3.3 core context");

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl: Arc::new(gl),
            event_pump,
        })
    }

    /// Loads `scene`, runs update and render once per frame until it asks to quit,
    /// then unloads it. The scene is unloaded even if loading or a frame fails.
    pub fn run<S: Scene>(&mut self, scene: &mut S) -> Result<()> {
        let result = self.run_frames(scene);
        scene.unload();
        result
    }

    fn run_frames<S: Scene>(&mut self, scene: &mut S) -> Result<()> {
        scene.load(&self.gl)?;

        let mut keyboard_state = KeyboardState::default();
        let mut last_frame_time = Instant::now();

        'running: loop {
            let now = Instant::now();
            let delta_time = now.duration_since(last_frame_time).as_secs_f64();
            last_frame_time = now;

            keyboard_state.pressed.clear();

            for event in self.event_pump.poll_iter() {
                scene.handle_event(&event);
                match event {
                    sdl2::event::Event::Window {
                        win_event: sdl2::event::WindowEvent::SizeChanged(width, height),
                        ..
                    } => {
                        scene.resize(&self.gl, width.max(0) as u32, height.max(0) as u32);
                    }
                    sdl2::event::Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => {
                        keyboard_state.down.insert(keycode);
                        keyboard_state.pressed.insert(keycode);
                    }
                    sdl2::event::Event::KeyUp {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => {
                        keyboard_state.down.remove(&keycode);
                    }
                    _ => {}
                }
            }

            let update_ctx = UpdateContext::new(&keyboard_state);
            if let SceneSwitch::Quit = scene.update(&update_ctx) {
                break 'running;
            }

            scene.render(&self.gl, delta_time)?;
            self.window.gl_swap_window();
        }

        Ok(())
    }
}
