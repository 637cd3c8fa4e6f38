//! Position / rotation / scale state shared by everything that can be placed
//! in the world.
//!
//! A [`TransformComponent`] is owned by composition (props, view models and the
//! camera each hold one). Every mutator recomputes the world matrix right away,
//! so [`TransformComponent::world_matrix`] is always the exact image of the
//! current position, rotation and scale.
//!
//! The Euler composition order is a type parameter because it differs per
//! entity kind: props and view models rotate X (pitch), then Y (yaw), then Z
//! (roll); the camera rotates yaw first so that pitch never tilts the yaw axis.

use std::marker::PhantomData;

use cgmath::{Matrix4, Rad, Vector3};

/// Euler angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerAngles {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}

impl std::ops::Add for EulerAngles {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            yaw: self.yaw + rhs.yaw,
            pitch: self.pitch + rhs.pitch,
            roll: self.roll + rhs.roll,
        }
    }
}

/// Order in which Euler angles are turned into a rotation matrix.
pub trait RotationOrder {
    fn rotation_matrix(angles: &EulerAngles) -> Matrix4<f32>;
}

/// `Rx(pitch) · Ry(yaw) · Rz(roll)`, used by props and view models.
#[derive(Clone, Copy, Debug, Default)]
pub struct PitchYawRoll;

impl RotationOrder for PitchYawRoll {
    fn rotation_matrix(angles: &EulerAngles) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(angles.pitch))
            * Matrix4::from_angle_y(Rad(angles.yaw))
            * Matrix4::from_angle_z(Rad(angles.roll))
    }
}

/// `Ry(yaw) · Rx(pitch) · Rz(roll)`, used by the camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct YawPitchRoll;

impl RotationOrder for YawPitchRoll {
    fn rotation_matrix(angles: &EulerAngles) -> Matrix4<f32> {
        Matrix4::from_angle_y(Rad(angles.yaw))
            * Matrix4::from_angle_x(Rad(angles.pitch))
            * Matrix4::from_angle_z(Rad(angles.roll))
    }
}

#[derive(Clone, Debug)]
pub struct TransformComponent<O: RotationOrder = PitchYawRoll> {
    position: Vector3<f32>,
    rotation: EulerAngles,
    scale: Vector3<f32>,
    world: Matrix4<f32>,
    order: PhantomData<O>,
}

impl<O: RotationOrder> TransformComponent<O> {
    /// Placed at `position` with no rotation and unit scale.
    pub fn new(position: impl Into<Vector3<f32>>) -> Self {
        Self::from_parts(
            position,
            EulerAngles::default(),
            Vector3::new(1.0, 1.0, 1.0),
        )
    }

    pub fn from_parts(
        position: impl Into<Vector3<f32>>,
        rotation: EulerAngles,
        scale: impl Into<Vector3<f32>>,
    ) -> Self {
        let mut transform = Self {
            position: position.into(),
            rotation,
            scale: scale.into(),
            world: Matrix4::from_scale(1.0),
            order: PhantomData,
        };
        transform.update_world_matrix();
        transform
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn rotation(&self) -> EulerAngles {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    /// `T(position) · R(rotation) · S(scale)` with `R` composed in `O`'s order.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    pub fn set_position(&mut self, position: impl Into<Vector3<f32>>) {
        self.position = position.into();
        self.update_world_matrix();
    }

    pub fn translate(&mut self, delta: impl Into<Vector3<f32>>) {
        self.position += delta.into();
        self.update_world_matrix();
    }

    pub fn set_rotation(&mut self, rotation: EulerAngles) {
        self.rotation = rotation;
        self.update_world_matrix();
    }

    pub fn rotate(&mut self, delta: EulerAngles) {
        self.rotation = self.rotation + delta;
        self.update_world_matrix();
    }

    pub fn set_scale(&mut self, scale: impl Into<Vector3<f32>>) {
        self.scale = scale.into();
        self.update_world_matrix();
    }

    pub fn adjust_scale(&mut self, delta: impl Into<Vector3<f32>>) {
        self.scale += delta.into();
        self.update_world_matrix();
    }

    /// World matrix of this transform when it is expressed relative to `parent`.
    pub fn relative_to(&self, parent: &Matrix4<f32>) -> Matrix4<f32> {
        parent * self.world
    }

    fn update_world_matrix(&mut self) {
        self.world = Matrix4::from_translation(self.position)
            * O::rotation_matrix(&self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
    }
}

impl<O: RotationOrder> Default for TransformComponent<O> {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0))
    }
}
