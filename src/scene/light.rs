//! The animated light and the light-space transform of the shadow map.

use glam::{Mat4, Vec3};

/// Advance an animation timer in `[0, 1)` by `increment`, wrapping around.
pub fn advance_timer(timer: f32, increment: f32) -> f32 {
    let wrapped = (timer + increment).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Position of the light at a point `timer` in `[0, 1)` of its orbit above the scene.
pub fn light_position(timer: f32) -> Vec3 {
    let angle = (timer * 360.0).to_radians();
    Vec3::new(angle.cos() * 40.0, -50.0 + angle.sin() * 20.0, 25.0 + angle.sin() * 5.0)
}

/// Perspective frustum of the light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightFrustum {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for LightFrustum {
    fn default() -> Self {
        Self {
            fov: 45.0,
            z_near: 1.0,
            z_far: 96.0,
        }
    }
}

impl LightFrustum {
    /// Transform from model space to the clip space of a light at `light_pos` looking at the origin.
    /// The model matrix is the identity.
    pub fn light_space_matrix(&self, light_pos: Vec3) -> Mat4 {
        let projection = Mat4::perspective_rh(self.fov.to_radians(), 1.0, self.z_near, self.z_far);
        let view = Mat4::look_at_rh(light_pos, Vec3::ZERO, Vec3::Y);
        projection * view * Mat4::IDENTITY
    }
}

/// Light orbit animation. The timer only advances while not paused.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightAnimation {
    timer: f32,
    /// Orbits per second.
    speed: f32,
    paused: bool,
}

impl LightAnimation {
    /// Start at `timer`, which is wrapped into `[0, 1)`.
    pub fn new(speed: f32, timer: f32, paused: bool) -> Self {
        Self {
            timer: advance_timer(timer, 0.0),
            speed,
            paused,
        }
    }

    /// Advance the animation for a frame that took `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if !self.paused {
            self.timer = advance_timer(self.timer, self.speed * dt);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!("Light animation {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn position(&self) -> Vec3 {
        light_position(self.timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_wraps_instead_of_overflowing() {
        let timer = advance_timer(0.95, 0.10);
        assert!((timer - 0.05).abs() < 1e-5, "timer = {timer}");
    }

    #[test]
    fn timer_stays_in_unit_range() {
        let mut timer = 0.0;
        for step in 0..10_000 {
            timer = advance_timer(timer, 0.0123 * (step % 7) as f32);
            assert!((0.0..1.0).contains(&timer));
        }
        assert!((advance_timer(0.25, -0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn light_space_matrix_is_deterministic() {
        let frustum = LightFrustum::default();
        let position = light_position(0.37);
        let first = frustum.light_space_matrix(position);
        let second = frustum.light_space_matrix(position);
        assert_eq!(first.to_cols_array(), second.to_cols_array());
    }

    #[test]
    fn origin_is_inside_light_frustum() {
        let frustum = LightFrustum::default();
        let clip = frustum.light_space_matrix(light_position(0.0)) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn light_orbits_above_the_ground() {
        for step in 0..100 {
            assert!(light_position(step as f32 / 100.0).y < 0.0);
        }
        let start = light_position(0.0);
        assert!((start - Vec3::new(40.0, -50.0, 25.0)).length() < 1e-4);
    }

    #[test]
    fn paused_animation_does_not_move() {
        let mut animation = LightAnimation::new(0.25, 0.0, false);
        animation.advance(1.0);
        assert!((animation.timer() - 0.25).abs() < 1e-6);
        animation.toggle_pause();
        animation.advance(1.0);
        assert!((animation.timer() - 0.25).abs() < 1e-6);
        assert!(animation.is_paused());
    }
}
