// tests/test_shader_compose.rs
// Shader composition contract: injection ordering, per-mode uniform sets,
// and the fixed names hosts rely on when composing their own pipelines.

use drape3d::clamping::shader::{
    clamp_composer, clamp_fragment_source, clamp_vertex_source, overlay_shader_source,
    InjectionPoint, ShaderComposer, CLAMP_FRAGMENT_FUNCTION, CLAMP_VERTEX_FUNCTION,
};
use drape3d::ClampMode;

#[test]
fn test_functions_emit_ahead_of_base() {
    let source = overlay_shader_source(ClampMode::Direct);
    let vertex_fn = source.find("fn oe_clamp_vertex").unwrap();
    let fragment_fn = source.find("fn oe_clamp_fragment").unwrap();
    let base_vs = source.find("fn vs_main").unwrap();
    assert!(vertex_fn < fragment_fn);
    assert!(fragment_fn < base_vs);
}

#[test]
fn test_composer_carries_both_clamp_functions() {
    for mode in [ClampMode::Direct, ClampMode::GroundOffset] {
        let composer = clamp_composer(mode);
        let names: Vec<&str> = composer.functions().iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&CLAMP_VERTEX_FUNCTION));
        assert!(names.contains(&CLAMP_FRAGMENT_FUNCTION));
    }
}

#[test]
fn test_ground_offset_mode_declares_depth_view_stage() {
    let source = clamp_vertex_source(ClampMode::GroundOffset);
    assert!(source.contains("depthClip2depthView"));
    assert!(source.contains("depthView2cameraView"));
}

#[test]
fn test_direct_mode_uses_single_inverse() {
    let source = clamp_vertex_source(ClampMode::Direct);
    assert!(source.contains("depthClip2cameraView"));
    assert!(!source.contains("depthClip2depthView"));
    assert!(!source.contains("depthView2cameraView"));
}

#[test]
fn test_fragment_source_is_mode_independent() {
    let source = clamp_fragment_source();
    assert!(source.contains("fn oe_clamp_fragment"));
    assert!(!source.contains("depthClip2"));
}

#[test]
fn test_contract_binding_names_present() {
    for mode in [ClampMode::Direct, ClampMode::GroundOffset] {
        let source = clamp_vertex_source(mode);
        assert!(source.contains("oe_clamp_depthTex"));
        assert!(source.contains("oe_clamp_depthSampler"));
        assert!(source.contains("oe_clamp_frame"));
        assert!(source.contains("cameraView2depthClip"));
        assert!(source.contains("horizonDistance"));
        // per-object bias/range windows
        assert!(source.contains("oe_clamp_object"));
        assert!(source.contains("bias"));
        assert!(source.contains("range"));
    }
}

#[test]
fn test_host_base_shader_composition() {
    // A host composing its own overlay shader registers the clamp functions
    // and appends its base last.
    let mut composer = ShaderComposer::new();
    composer.set_function(
        CLAMP_VERTEX_FUNCTION,
        clamp_vertex_source(ClampMode::Direct),
        InjectionPoint::VertexView,
    );
    composer.set_function(
        CLAMP_FRAGMENT_FUNCTION,
        clamp_fragment_source(),
        InjectionPoint::FragmentColoring,
    );
    let merged = composer.compose("// host base shader\n");
    assert!(merged.contains("fn oe_clamp_vertex"));
    assert!(merged.ends_with("// host base shader\n"));
}

#[test]
fn test_reregistering_function_does_not_duplicate() {
    let mut composer = clamp_composer(ClampMode::Direct);
    composer.set_function(
        CLAMP_VERTEX_FUNCTION,
        clamp_vertex_source(ClampMode::Direct),
        InjectionPoint::VertexView,
    );
    assert_eq!(composer.functions().len(), 2);
}
