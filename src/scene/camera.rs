//! A first person camera.

use glam::{Mat4, Vec3};

/// Degrees of rotation per pixel of mouse movement.
const ROTATION_SPEED: f32 = 0.15;
/// Vertical translation per pixel of mouse movement.
const PAN_SPEED: f32 = 0.05;
const MAX_PITCH: f32 = 89.0;

/// Directions the camera can move in with the keyboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct MovementKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

/// First person camera. Pitch and yaw are in degrees. A pitch of zero looks along -Z, negative pitch looks down.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    pitch: f32,
    yaw: f32,
    fov: f32,
    aspect: f32,
    z_near: f32,
    z_far: f32,
    /// Movement speed in units per second.
    speed: f32,
    keys: MovementKeys,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.6, -9.5, 14.0),
            pitch: -30.0,
            yaw: 0.0,
            fov: 70.0,
            aspect: 800.0 / 600.0,
            z_near: 1.0,
            z_far: 256.0,
            speed: 5.0,
            keys: MovementKeys::default(),
        }
    }
}

impl Camera {
    /// The default camera, looking down at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(width, height);
        camera
    }

    /// Update the aspect ratio. Zero-sized extents are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// World space up vector. +Y points down.
    pub fn up() -> Vec3 {
        Vec3::NEG_Y
    }

    /// Unit vector the camera looks along.
    pub fn front(&self) -> Vec3 {
        let (pitch, yaw) = (self.pitch.to_radians(), self.yaw.to_radians());
        Vec3::new(-pitch.cos() * yaw.sin(), -pitch.sin(), -pitch.cos() * yaw.cos()).normalize()
    }

    /// Unit vector pointing to the right of the view direction.
    pub fn right(&self) -> Vec3 {
        self.front().cross(Self::up()).normalize()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Self::up())
    }

    /// Perspective projection with depth in [0, 1] and Y flipped for Vulkan clip space.
    pub fn projection(&self) -> Mat4 {
        let mut projection = Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.z_near, self.z_far);
        projection.y_axis.y *= -1.0;
        projection
    }

    pub fn set_key(&mut self, movement: Movement, pressed: bool) {
        match movement {
            Movement::Forward => self.keys.forward = pressed,
            Movement::Backward => self.keys.backward = pressed,
            Movement::Left => self.keys.left = pressed,
            Movement::Right => self.keys.right = pressed,
        }
    }

    /// Whether any movement key is held.
    pub fn is_moving(&self) -> bool {
        self.keys != MovementKeys::default()
    }

    /// Apply held movement keys for a frame that took `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let distance = self.speed * dt;
        let (front, right) = (self.front(), self.right());
        if self.keys.forward {
            self.position += front * distance;
        }
        if self.keys.backward {
            self.position -= front * distance;
        }
        if self.keys.left {
            self.position -= right * distance;
        }
        if self.keys.right {
            self.position += right * distance;
        }
    }

    /// Look around after the mouse moved `dx`, `dy` pixels with the left button held.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * ROTATION_SPEED;
        self.pitch = (self.pitch - dy * ROTATION_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Translate after the mouse moved `dx`, `dy` pixels with the right button held. Dragging down lowers the
    /// camera, dragging sideways strafes.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.position -= Self::up() * (dy * PAN_SPEED);
        self.position += self.right() * (self.speed * dx / 100.0);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_camera_looks_down_at_the_scene() {
        let camera = Camera::default();
        // +Y is down, so looking down means a positive Y component.
        assert!(camera.front().y > 0.0);
        assert!(camera.front().z < 0.0);
    }

    #[test]
    fn right_is_perpendicular_and_horizontal() {
        let mut camera = Camera::default();
        camera.rotate(120.0, 40.0);
        let (front, right) = (camera.front(), camera.right());
        assert!(front.dot(right).abs() < 1e-5);
        assert!(right.y.abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.rotate(0.0, -10_000.0);
        assert_eq!(camera.pitch(), MAX_PITCH);
        camera.rotate(0.0, 10_000.0);
        assert_eq!(camera.pitch(), -MAX_PITCH);
    }

    #[test]
    fn movement_follows_held_keys() {
        let mut camera = Camera::default();
        let start = camera.position();
        camera.set_key(Movement::Forward, true);
        camera.update(1.0);
        assert!(approx(camera.position(), start + camera.front() * 5.0));
        camera.set_key(Movement::Forward, false);
        assert!(!camera.is_moving());
        let stopped = camera.position();
        camera.update(1.0);
        assert_eq!(camera.position(), stopped);
    }

    #[test]
    fn dragging_down_lowers_the_camera() {
        let mut camera = Camera::default();
        let start = camera.position();
        camera.pan(0.0, 20.0);
        assert!(approx(camera.position(), start + Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn projection_flips_y() {
        let camera = Camera::new(800, 600);
        // A point above the view center ends up with a negative clip space Y, which is the top in Vulkan.
        let view_space = Vec4::new(0.0, 1.0, -10.0, 1.0);
        let clip = camera.projection() * view_space;
        assert!(clip.y < 0.0);
    }

    #[test]
    fn zero_sized_extent_keeps_aspect() {
        let mut camera = Camera::new(1920, 1080);
        camera.set_aspect(0, 1080);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
    }
}
