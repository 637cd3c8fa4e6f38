//! First-person camera: placement, view and projection matrices.
//!
//! The camera keeps its own [`TransformComponent`] describing where it sits in
//! the world. Rendering consumes the inverse of that placement (the view
//! matrix), which is recomputed together with the placement on every change.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use winit::keyboard::KeyCode;

use crate::{
    config::CameraConfig,
    input::InputState,
    render::{RenderBackend, ShaderProgram, UniformValue, set_uniform, uniforms},
    transform::{EulerAngles, TransformComponent, YawPitchRoll},
};

/// Perspective projection, recomputed whenever one of its inputs changes.
#[derive(Clone, Debug)]
pub struct Projection {
    fovy: Rad<f32>,
    aspect: f32,
    znear: f32,
    zfar: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: impl Into<Rad<f32>>, znear: f32, zfar: f32) -> Self {
        Self::with_aspect(aspect_ratio(width, height), fovy, znear, zfar)
    }

    /// An unusable `aspect` (zero, negative, NaN) falls back to square.
    pub fn with_aspect(aspect: f32, fovy: impl Into<Rad<f32>>, znear: f32, zfar: f32) -> Self {
        let fovy = fovy.into();
        let aspect = if is_usable_aspect(aspect) {
            aspect
        } else {
            log::warn!("Unusable aspect ratio {aspect}, using 1.0 instead.");
            1.0
        };
        Self {
            fovy,
            aspect,
            znear,
            zfar,
            matrix: cgmath::perspective(fovy, aspect, znear, zfar),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_aspect(aspect_ratio(width, height));
    }

    /// Ignores an unusable `aspect` and keeps the current projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        if !is_usable_aspect(aspect) {
            log::warn!("Ignoring unusable aspect ratio {aspect}.");
            return;
        }
        self.aspect = aspect;
        self.matrix = cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

fn is_usable_aspect(aspect: f32) -> bool {
    aspect.is_finite() && aspect > 0.0
}

#[derive(Clone, Debug)]
pub struct Camera {
    transform: TransformComponent<YawPitchRoll>,
    view: Matrix4<f32>,
    pub projection: Projection,
    pitch_limit: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            transform: TransformComponent::new(config.start_position),
            view: Matrix4::identity(),
            projection: Projection::with_aspect(aspect, config.fov_y, config.near, config.far),
            pitch_limit: FRAC_PI_2 - config.pitch_epsilon,
        };
        camera.update_view_matrix();
        camera
    }

    pub fn position(&self) -> Vector3<f32> {
        self.transform.position()
    }

    /// `[yaw, pitch, roll]` in radians.
    pub fn rotation(&self) -> EulerAngles {
        self.transform.rotation()
    }

    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    /// Where the camera sits in the world: `T(position) · Ry(yaw) · Rx(pitch) · Rz(roll)`.
    pub fn placement_matrix(&self) -> Matrix4<f32> {
        self.transform.world_matrix()
    }

    /// Inverse of [`placement_matrix`](Self::placement_matrix).
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.calc_matrix()
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.projection.set_aspect(aspect);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    pub fn set_position(&mut self, position: impl Into<Vector3<f32>>) {
        self.transform.set_position(position);
        self.update_view_matrix();
    }

    /// Moves the camera in world space.
    pub fn move_by(&mut self, delta: impl Into<Vector3<f32>>) {
        self.transform.translate(delta);
        self.update_view_matrix();
    }

    /// Adds to the current rotation. Pitch is clamped to the configured limit
    /// afterwards so the camera never flips over the vertical.
    pub fn rotate(&mut self, yaw: f32, pitch: f32, roll: f32) {
        let rotation = self.transform.rotation() + EulerAngles::new(yaw, pitch, roll);
        self.set_rotation(rotation);
    }

    pub fn set_rotation(&mut self, mut rotation: EulerAngles) {
        rotation.pitch = rotation.pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self.transform.set_rotation(rotation);
        self.update_view_matrix();
    }

    // Movement is derived from yaw only so strafing stays level while looking up or down.

    pub fn move_forward(&mut self, dist: f32) {
        let yaw = self.transform.rotation().yaw;
        self.move_by([-yaw.sin() * dist, 0.0, -yaw.cos() * dist]);
    }

    pub fn move_backward(&mut self, dist: f32) {
        self.move_forward(-dist);
    }

    pub fn move_right(&mut self, dist: f32) {
        let yaw = self.transform.rotation().yaw;
        self.move_by([yaw.cos() * dist, 0.0, -yaw.sin() * dist]);
    }

    pub fn move_left(&mut self, dist: f32) {
        self.move_right(-dist);
    }

    pub fn move_up(&mut self, dist: f32) {
        self.move_by([0.0, dist, 0.0]);
    }

    pub fn move_down(&mut self, dist: f32) {
        self.move_up(-dist);
    }

    /// Uploads view, projection and eye position to `shader`.
    pub fn bind(&self, backend: &mut dyn RenderBackend, shader: &dyn ShaderProgram) {
        set_uniform(backend, shader, uniforms::VIEW, UniformValue::Mat4(self.view));
        set_uniform(
            backend,
            shader,
            uniforms::PROJECTION,
            UniformValue::Mat4(self.projection_matrix()),
        );
        set_uniform(
            backend,
            shader,
            uniforms::CAMERA_POSITION,
            UniformValue::Vec3(self.position().into()),
        );
    }

    fn update_view_matrix(&mut self) {
        // A placement without scale is always invertible; keep the last view otherwise.
        match self.transform.world_matrix().invert() {
            Some(view) => self.view = view,
            None => log::warn!("Camera placement is singular, keeping previous view matrix."),
        }
    }
}

/// The raw camera data stored in a GPU uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Homogeneous so the struct keeps 16 byte alignment.
    pub view_position: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        Self {
            view_position: [0.0, 0.0, 0.0, 1.0],
            view: identity,
            proj: identity,
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_position = camera.position().extend(1.0).into();
        self.view = camera.view_matrix().into();
        self.proj = camera.projection_matrix().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns held keys and pointer movement into camera motion.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub mouse_sensitivity: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, rotation_speed: f32, mouse_sensitivity: f32) -> Self {
        Self {
            move_speed,
            rotation_speed,
            mouse_sensitivity,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            config.move_speed,
            config.rotation_speed,
            config.mouse_sensitivity,
        )
    }

    /// Applies one frame of input. The accumulated pointer delta is consumed.
    pub fn update_camera(&self, camera: &mut Camera, input: &mut InputState) {
        let speed = self.rotation_speed;
        if input.is_pressed(KeyCode::ArrowLeft) {
            camera.rotate(speed, 0.0, 0.0);
        }
        if input.is_pressed(KeyCode::ArrowRight) {
            camera.rotate(-speed, 0.0, 0.0);
        }
        if input.is_pressed(KeyCode::ArrowUp) {
            camera.rotate(0.0, speed, 0.0);
        }
        if input.is_pressed(KeyCode::ArrowDown) {
            camera.rotate(0.0, -speed, 0.0);
        }

        let dist = self.move_speed;
        if input.is_pressed(KeyCode::KeyW) {
            camera.move_forward(dist);
        }
        if input.is_pressed(KeyCode::KeyS) {
            camera.move_backward(dist);
        }
        if input.is_pressed(KeyCode::KeyA) {
            camera.move_left(dist);
        }
        if input.is_pressed(KeyCode::KeyD) {
            camera.move_right(dist);
        }
        if input.is_pressed(KeyCode::Space) {
            camera.move_up(dist);
        }
        if input.is_pressed(KeyCode::ShiftLeft) {
            camera.move_down(dist);
        }

        let (dx, dy) = input.take_mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            camera.rotate(
                -dx as f32 * self.mouse_sensitivity,
                -dy as f32 * self.mouse_sensitivity,
                0.0,
            );
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}
