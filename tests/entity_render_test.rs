use std::sync::Arc;

use cgmath::{Matrix4, Rad, Vector3};
use vista_ngin::{
    data_structures::{
        entity::{LoadState, Model, ViewModel},
        material::Material,
        mesh::{IndexedMesh, VertexLayout},
        scene_graph::Renderable,
    },
    error::LoadError,
    render::{TextureHandle, UniformValue, uniforms},
    resources::ModelSource,
    transform::EulerAngles,
};

mod common;
use common::test_utils::{FakeShader, RecordingBackend};

fn renderable(name: &str, model_space_matrix: Matrix4<f32>) -> Renderable {
    let mesh = IndexedMesh::interleaved(
        name,
        VertexLayout::PositionNormalUv,
        vec![
            0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
        ],
        vec![0, 1, 2],
    );
    Renderable::new(
        Arc::new(mesh),
        Arc::new(Material::new(name, TextureHandle(0))),
        model_space_matrix,
    )
}

#[test]
fn unloaded_model_draws_nothing() {
    let model = Model::new(ModelSource::Obj("crate".into()), [0.0, 0.0, 0.0]);
    let shader = FakeShader::complete();
    let mut backend = RecordingBackend::new();

    assert!(!model.is_loaded());
    model.render(&mut backend, &shader);

    assert!(backend.draws.is_empty());
    assert!(backend.uniforms.is_empty());
}

#[test]
fn failed_model_keeps_its_error_and_draws_nothing() {
    let mut model = Model::new(ModelSource::Obj("crate".into()), [0.0, 0.0, 0.0]);
    model.finish_loading(Err(LoadError::MissingBuffer {
        path: "crate".into(),
        index: 0,
    }
    .into()));

    let shader = FakeShader::complete();
    let mut backend = RecordingBackend::new();
    model.render(&mut backend, &shader);

    assert!(!model.is_loaded());
    assert!(matches!(model.state(), LoadState::Failed(_)));
    let error = model.state().error().and_then(|e| e.downcast_ref::<LoadError>());
    assert!(matches!(error, Some(LoadError::MissingBuffer { index: 0, .. })));
    assert!(backend.draws.is_empty());
}

#[test]
fn uploaded_world_is_owner_times_model_space() {
    let offset = Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0)) * Matrix4::from_angle_z(Rad(0.4));
    let mut model = Model::new(ModelSource::Gltf("hut.gltf".into()), [3.0, 0.0, -1.0]);
    model.transform.rotate(EulerAngles::new(0.6, 0.1, 0.0));
    model.transform.set_scale([2.0, 2.0, 2.0]);
    model.finish_loading(Ok(vec![renderable("roof", offset), renderable("walls", Matrix4::from_scale(1.0))]));

    let shader = FakeShader::complete();
    let mut backend = RecordingBackend::new();
    model.render(&mut backend, &shader);

    let owner = model.transform.world_matrix();
    assert_eq!(
        backend.values_of(&shader, uniforms::WORLD),
        vec![UniformValue::Mat4(owner * offset), UniformValue::Mat4(owner * Matrix4::from_scale(1.0))]
    );
    let drawn: Vec<_> = backend.draws.iter().map(|d| (d.mesh.as_str(), d.index_count)).collect();
    assert_eq!(drawn, [("roof", 3), ("walls", 3)]);
    assert_eq!(backend.draws[0].attributes.len(), 3);
}

#[test]
fn view_model_follows_the_camera() {
    let mut view_model = ViewModel::new(ModelSource::Obj("lantern".into()), [0.3, -0.2, -0.5]);
    view_model.finish_loading(Ok(vec![renderable("lantern", Matrix4::from_scale(1.0))]));

    let placement = Matrix4::from_translation(Vector3::new(10.0, 1.0, 0.0)) * Matrix4::from_angle_y(Rad(1.0));
    view_model.follow(&placement);
    let expected = placement * Matrix4::from_translation(Vector3::new(0.3, -0.2, -0.5));
    assert_eq!(view_model.world_matrix(), expected);

    let shader = FakeShader::complete();
    let mut backend = RecordingBackend::new();
    view_model.render(&mut backend, &shader);
    assert_eq!(
        backend.values_of(&shader, uniforms::WORLD),
        vec![UniformValue::Mat4(expected * Matrix4::from_scale(1.0))]
    );
}

#[test]
fn view_model_draws_its_current_offset() {
    let mut view_model = ViewModel::new(ModelSource::Obj("lantern".into()), [0.3, -0.2, -0.5]);
    view_model.finish_loading(Ok(vec![renderable("lantern", Matrix4::from_scale(1.0))]));
    let shader = FakeShader::complete();

    let mut backend = RecordingBackend::new();
    view_model.render(&mut backend, &shader);
    assert_eq!(
        backend.last_value_of(&shader, uniforms::WORLD),
        Some(UniformValue::Mat4(Matrix4::from_translation(Vector3::new(0.3, -0.2, -0.5))))
    );

    let placement = Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0));
    view_model.follow(&placement);
    view_model.transform.set_position([0.0, 0.0, -1.0]);

    let mut backend = RecordingBackend::new();
    view_model.render(&mut backend, &shader);
    let expected = placement * Matrix4::from_translation(Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(view_model.world_matrix(), expected);
    assert_eq!(backend.last_value_of(&shader, uniforms::WORLD), Some(UniformValue::Mat4(expected)));
}
