//! Model, view and projection matrices for the cube, and the viewport rectangle.

use glam::{Mat4, Vec3};
use glow::HasContext;

pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;
pub const CAMERA_DISTANCE: f32 = 3.0;

/// Accumulates the cube's rotation angle from elapsed frame time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationClock {
    degrees: f64,
    degrees_per_second: f64,
}

impl RotationClock {
    pub fn new(degrees_per_second: f64) -> Self {
        Self {
            degrees: 0.0,
            degrees_per_second,
        }
    }

    /// Advances the angle by `delta_time` seconds.
    pub fn advance(&mut self, delta_time: f64) {
        self.degrees += self.degrees_per_second * delta_time;
    }

    /// Accumulated angle in degrees.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Rotation about the X axis by the accumulated angle.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.degrees.to_radians() as f32)
    }
}

/// Camera pulled back along -Z so the unit cube at the origin is in view.
pub fn view_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, -CAMERA_DISTANCE))
}

/// Width over height. A zero height (minimised window) counts as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

pub fn projection_matrix(width: u32, height: u32) -> Mat4 {
    Mat4::perspective_rh_gl(
        FIELD_OF_VIEW_DEGREES.to_radians(),
        aspect_ratio(width, height),
        Z_NEAR,
        Z_FAR,
    )
}

/// The GL viewport rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    /// A viewport covering a whole window of the given size.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }

    pub fn apply(&self, gl: &glow::Context) {
        unsafe {
            gl.viewport(self.x, self.y, self.width, self.height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_matrix_is_rotation_about_x() {
        let mut clock = RotationClock::new(4.0);
        clock.advance(22.5);
        assert_eq!(clock.degrees(), 90.0);

        let model = clock.model_matrix();
        assert!(model.abs_diff_eq(Mat4::from_rotation_x(90.0f32.to_radians()), 1e-6));
        assert!(model.transform_vector3(Vec3::Y).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(model.transform_vector3(Vec3::X).abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_model_matrix_depends_only_on_elapsed_time() {
        let mut stepped = RotationClock::new(4.0);
        for _ in 0..10 {
            stepped.advance(0.25);
        }
        let mut once = RotationClock::new(4.0);
        once.advance(2.5);

        assert!((stepped.degrees() - 10.0).abs() < 1e-9);
        assert!(stepped.model_matrix().abs_diff_eq(once.model_matrix(), 1e-6));
    }

    #[test]
    fn test_fresh_clock_is_identity() {
        let clock = RotationClock::new(4.0);
        assert_eq!(clock.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_projection_aspect_matches_window() {
        for (width, height) in [(800, 600), (1280, 720), (600, 900)] {
            let projection = projection_matrix(width, height);
            // x scale is the y scale divided by the aspect ratio
            let aspect = projection.y_axis.y / projection.x_axis.x;
            assert!((aspect - width as f32 / height as f32).abs() < 1e-5);
        }
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        assert_eq!(aspect_ratio(640, 0), 640.0);
    }

    #[test]
    fn test_view_matrix_moves_camera_back() {
        let view = view_matrix();
        assert!(view.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-6));
    }

    #[test]
    fn test_viewport_from_size() {
        assert_eq!(
            Viewport::from_size(1024, 768),
            Viewport {
                x: 0,
                y: 0,
                width: 1024,
                height: 768,
            }
        );
    }
}
