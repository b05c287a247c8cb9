use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use vista_input::ControlAction;
use vista_render::RenderView;

/// Perspective camera looking at a point. The look-at point is owned by
/// [`OrbitControls`] and copied in on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 1.0, 2.0),
            look_at: Vec3::ZERO,
            fov: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    /// Width over height; a zero height leaves the aspect unchanged.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Camera-space +X in world space.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    /// Camera-space +Y in world space.
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position,
            target: self.look_at,
            fov_degrees: self.fov,
            aspect: self.aspect,
        }
    }
}

/// Offset from the target in spherical coordinates: `phi` from +Y,
/// `theta` around +Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    const EPS: f32 = 1e-6;

    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(ring * self.theta.sin(), self.phi.cos() * self.radius, ring * self.theta.cos())
    }
}

/// Orbit, pan and dolly around a target with optional inertia.
///
/// Gestures accumulate into pending deltas. Each [`OrbitControls::update`]
/// applies `damping_factor` of the pending rotation and pan, then decays what
/// is left by `1 - damping_factor`, so motion eases out over later frames.
/// Dolly applies in full on the next update.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits, radians from +Y.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, camera: &mut PerspectiveCamera) -> Self {
        camera.look_at = target;
        Self {
            target,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Queue a gesture. `viewport_height` is in the same pixels as the
    /// action's deltas.
    pub fn apply(&mut self, action: ControlAction, camera: &PerspectiveCamera, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        match action {
            ControlAction::Rotate(delta) => {
                let d = delta * self.rotate_speed;
                self.delta_theta -= TAU * d.x / height;
                self.delta_phi -= TAU * d.y / height;
            }
            ControlAction::Pan(delta) => self.pan(delta * self.pan_speed, camera, height),
            ControlAction::Dolly(steps) => {
                let zoom = 0.95_f32.powf(self.zoom_speed);
                // Positive steps move away: the radius grows.
                self.scale /= zoom.powf(steps);
            }
        }
    }

    fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, height: f32) {
        let distance = (camera.position - self.target).length() * (camera.fov.to_radians() / 2.0).tan();
        let left = -2.0 * delta.x * distance / height;
        let up = 2.0 * delta.y * distance / height;
        self.pan_offset += camera.right() * left + camera.up() * up;
    }

    /// Advance one frame and reposition `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let mut spherical = Spherical::from_offset(camera.position - self.target);
        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };

        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(Spherical::EPS, PI - Spherical::EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * factor;

        camera.position = self.target + spherical.to_offset();
        camera.look_at = self.target;

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.delta_theta *= keep;
            self.delta_phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled(controls: &OrbitControls) -> bool {
        controls.delta_theta.abs() < 1e-6
            && controls.delta_phi.abs() < 1e-6
            && controls.pan_offset.length_squared() < 1e-12
    }

    fn setup() -> (PerspectiveCamera, OrbitControls) {
        let mut camera = PerspectiveCamera::default();
        let controls = OrbitControls::new(Vec3::ZERO, &mut camera);
        (camera, controls)
    }

    #[test]
    fn default_camera_matrices_are_finite() {
        let mut cam = PerspectiveCamera::default();
        cam.set_aspect(1280, 720);
        assert!((cam.aspect - 1280.0 / 720.0).abs() < 1e-6);
        cam.set_aspect(10, 0);
        assert!((cam.aspect - 1280.0 / 720.0).abs() < 1e-6);
        assert!(cam.view_projection().is_finite());
        assert_eq!(cam.render_view().eye, Vec3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn spherical_round_trips_offset() {
        let v = Vec3::new(1.0, 1.0, 2.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!((back - v).length() < 1e-5);
    }

    #[test]
    fn idle_update_keeps_camera_still() {
        let (mut cam, mut controls) = setup();
        let start = cam.position;
        for _ in 0..10 {
            controls.update(&mut cam);
        }
        assert!((cam.position - start).length() < 1e-5);
        assert!(settled(&controls));
    }

    #[test]
    fn damped_rotation_converges_to_full_delta() {
        let (mut cam, mut controls) = setup();
        let height = 720.0;
        let theta0 = Spherical::from_offset(cam.position).theta;
        let dx = 0.3 * height / TAU;
        controls.apply(ControlAction::Rotate(Vec2::new(dx, 0.0)), &cam, height);

        controls.update(&mut cam);
        let first = Spherical::from_offset(cam.position).theta;
        assert!((first - (theta0 - 0.3 * 0.05)).abs() < 1e-4);

        for _ in 0..1000 {
            controls.update(&mut cam);
        }
        let s = Spherical::from_offset(cam.position);
        assert!((s.theta - (theta0 - 0.3)).abs() < 1e-3);
        assert!((s.radius - 6.0_f32.sqrt()).abs() < 1e-4);
        assert!(settled(&controls));
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let (mut cam, mut controls) = setup();
        controls.enable_damping = false;
        let theta0 = Spherical::from_offset(cam.position).theta;
        controls.apply(ControlAction::Rotate(Vec2::new(720.0 / TAU * 0.5, 0.0)), &cam, 720.0);
        controls.update(&mut cam);
        assert!((Spherical::from_offset(cam.position).theta - (theta0 - 0.5)).abs() < 1e-4);
        assert!(settled(&controls));
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let (mut cam, mut controls) = setup();
        controls.enable_damping = false;
        controls.apply(ControlAction::Rotate(Vec2::new(0.0, 100_000.0)), &cam, 720.0);
        controls.update(&mut cam);
        let s = Spherical::from_offset(cam.position);
        assert!(s.phi < 0.01);
        assert!(cam.position.x != 0.0 || cam.position.z != 0.0);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn dolly_scales_radius() {
        let (mut cam, mut controls) = setup();
        let r0 = cam.position.length();
        controls.apply(ControlAction::Dolly(-1.0), &cam, 720.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - r0 * 0.95).abs() < 1e-4);

        controls.apply(ControlAction::Dolly(1.0), &cam, 720.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - r0).abs() < 1e-4);
    }

    #[test]
    fn distance_limits_hold() {
        let (mut cam, mut controls) = setup();
        controls.max_distance = 3.0;
        for _ in 0..50 {
            controls.apply(ControlAction::Dolly(1.0), &cam, 720.0);
        }
        controls.update(&mut cam);
        assert!((cam.position.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_against_drag() {
        let (mut cam, mut controls) = setup();
        controls.enable_damping = false;
        let right = cam.right();
        let offset = cam.position - controls.target;
        controls.apply(ControlAction::Pan(Vec2::new(100.0, 0.0)), &cam, 720.0);
        controls.update(&mut cam);
        assert!(controls.target.dot(right) < 0.0);
        assert_eq!(cam.look_at, controls.target);
        assert!(((cam.position - controls.target) - offset).length() < 1e-4);
    }
}
