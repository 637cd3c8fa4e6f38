use std::f32::consts::FRAC_PI_2;

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};
use vista_ngin::{
    camera::{Camera, CameraController, CameraUniform},
    config::CameraConfig,
    input::InputState,
    render::{UniformValue, uniforms},
};
use winit::keyboard::KeyCode;

mod common;
use common::test_utils::{FakeShader, RecordingBackend, assert_matrix_eq};

fn camera() -> Camera {
    Camera::new(&CameraConfig::default(), 16.0 / 9.0)
}

fn assert_vec_eq(actual: Vector3<f32>, expected: Vector3<f32>) {
    let diff = actual - expected;
    assert!(
        diff.x.abs() < 1e-5 && diff.y.abs() < 1e-5 && diff.z.abs() < 1e-5,
        "{actual:?} != {expected:?}"
    );
}

#[test]
fn pitch_stays_within_limit_after_any_rotation() {
    let mut camera = camera();
    let limit = FRAC_PI_2 - CameraConfig::default().pitch_epsilon;
    assert!((camera.pitch_limit() - limit).abs() < f32::EPSILON);

    for step in [0.3, 0.7, 1.1, -2.5, 4.0, -0.01, 10.0, -10.0] {
        for _ in 0..20 {
            camera.rotate(step * 0.1, step, 0.0);
            let pitch = camera.rotation().pitch;
            assert!((-limit..=limit).contains(&pitch), "pitch {pitch} escaped the clamp");
        }
    }

    let mut input = InputState::new();
    input.set_pointer_locked(true);
    let controller = CameraController::default();
    for _ in 0..50 {
        input.add_mouse_delta(0.0, -5000.0);
        controller.update_camera(&mut camera, &mut input);
        assert!(camera.rotation().pitch <= limit);
    }
    assert!((camera.rotation().pitch - limit).abs() < 1e-6);
}

#[test]
fn view_is_the_inverse_of_the_placement() {
    let mut camera = camera();
    camera.set_position([3.0, 1.5, -2.0]);
    camera.rotate(0.8, -0.3, 0.1);

    let placement = camera.placement_matrix();
    assert_matrix_eq(camera.view_matrix() * placement, Matrix4::identity());

    let expected_placement = Matrix4::from_translation(Vector3::new(3.0, 1.5, -2.0))
        * Matrix4::from_angle_y(Rad(0.8))
        * Matrix4::from_angle_x(Rad(-0.3))
        * Matrix4::from_angle_z(Rad(0.1));
    assert_matrix_eq(placement, expected_placement);
}

#[test]
fn movement_follows_yaw_and_stays_level() {
    let mut camera = camera();
    camera.move_forward(1.0);
    assert_vec_eq(camera.position(), Vector3::new(0.0, 0.0, -1.0));

    camera.set_position([0.0, 0.0, 0.0]);
    camera.rotate(FRAC_PI_2, 1.2, 0.0);
    camera.move_forward(2.0);
    assert_vec_eq(camera.position(), Vector3::new(-2.0, 0.0, 0.0));

    camera.move_right(1.0);
    assert_vec_eq(camera.position(), Vector3::new(-2.0, 0.0, -1.0));

    camera.move_up(0.5);
    camera.move_left(1.0);
    camera.move_backward(2.0);
    camera.move_down(0.5);
    assert_vec_eq(camera.position(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn resize_recomputes_projection() {
    let mut camera = camera();
    let before = camera.projection_matrix();
    camera.resize(800, 800);
    assert_eq!(camera.projection.aspect(), 1.0);
    assert_ne!(camera.projection_matrix(), before);
    assert_eq!(
        camera.projection_matrix(),
        cgmath::perspective(CameraConfig::default().fov_y, 1.0, 0.1, 1000.0)
    );
}

#[test]
fn unusable_aspect_ratios_never_reach_the_projection() {
    let square = Camera::new(&CameraConfig::default(), 0.0);
    assert_eq!(square.projection.aspect(), 1.0);
    assert_eq!(
        square.projection_matrix(),
        cgmath::perspective(CameraConfig::default().fov_y, 1.0, 0.1, 1000.0)
    );

    let mut camera = camera();
    let before = camera.projection_matrix();
    for aspect in [0.0, -2.0, f32::NAN, f32::INFINITY] {
        camera.set_aspect_ratio(aspect);
    }
    assert_eq!(camera.projection.aspect(), 16.0 / 9.0);
    assert_eq!(camera.projection_matrix(), before);
}

#[test]
fn controller_applies_keys_and_consumes_pointer_delta() {
    let config = CameraConfig::default();
    let mut camera = camera();
    let controller = CameraController::from_config(&config);
    let mut input = InputState::new();

    input.press(KeyCode::KeyW);
    input.press(KeyCode::ArrowLeft);
    controller.update_camera(&mut camera, &mut input);
    assert!((camera.rotation().yaw - config.rotation_speed).abs() < 1e-6);
    assert!(camera.position().z < 0.0);

    input.release(KeyCode::KeyW);
    input.release(KeyCode::ArrowLeft);
    // Pointer movement is ignored until the pointer is locked.
    input.add_mouse_delta(100.0, 0.0);
    controller.update_camera(&mut camera, &mut input);
    assert!((camera.rotation().yaw - config.rotation_speed).abs() < 1e-6);

    input.set_pointer_locked(true);
    input.add_mouse_delta(100.0, 50.0);
    controller.update_camera(&mut camera, &mut input);
    let rotation = camera.rotation();
    assert!((rotation.yaw - (config.rotation_speed - 100.0 * config.mouse_sensitivity)).abs() < 1e-6);
    assert!((rotation.pitch + 50.0 * config.mouse_sensitivity).abs() < 1e-6);
    assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
}

#[test]
fn bind_uploads_view_projection_and_eye() {
    let mut camera = camera();
    camera.set_position([1.0, 2.0, 3.0]);
    let shader = FakeShader::complete();
    let mut backend = RecordingBackend::new();

    camera.bind(&mut backend, &shader);

    assert_eq!(
        backend.last_value_of(&shader, uniforms::VIEW),
        Some(UniformValue::Mat4(camera.view_matrix()))
    );
    assert_eq!(
        backend.last_value_of(&shader, uniforms::PROJECTION),
        Some(UniformValue::Mat4(camera.projection_matrix()))
    );
    assert_eq!(
        backend.last_value_of(&shader, uniforms::CAMERA_POSITION),
        Some(UniformValue::Vec3([1.0, 2.0, 3.0]))
    );
}

#[test]
fn uniform_packs_eye_and_matrices() {
    let mut camera = camera();
    camera.set_position([1.0, 2.0, 3.0]);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera);

    assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
    let view: [[f32; 4]; 4] = camera.view_matrix().into();
    assert_eq!(uniform.view, view);
    assert_eq!(bytemuck::bytes_of(&uniform).len(), 4 * (4 + 16 + 16));
}
