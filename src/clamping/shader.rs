//! Shader composition for the clamp program
//!
//! WGSL has no preprocessor and no program linker, so composition is
//! concatenation in stage order: named functions tagged with an injection
//! point are emitted ahead of the base shader that calls them. Hosts with
//! their own overlay shaders can run the same composer with their own base
//! source.

use super::uniforms::ClampMode;

/// Pipeline stage a composed function injects into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InjectionPoint {
    /// Vertex stage, operating on view-space positions
    VertexView,
    /// Fragment stage, color output
    FragmentColoring,
}

/// A named WGSL function destined for one injection point.
#[derive(Debug, Clone)]
pub struct ShaderFunction {
    pub name: String,
    pub point: InjectionPoint,
    pub source: String,
}

/// Orders tagged functions ahead of a base shader.
#[derive(Debug, Default)]
pub struct ShaderComposer {
    functions: Vec<ShaderFunction>,
}

impl ShaderComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function; a function with the same name replaces the
    /// previous registration.
    pub fn set_function(&mut self, name: &str, source: &str, point: InjectionPoint) {
        self.functions.retain(|f| f.name != name);
        self.functions.push(ShaderFunction {
            name: name.to_string(),
            point,
            source: source.to_string(),
        });
    }

    pub fn functions(&self) -> &[ShaderFunction] {
        &self.functions
    }

    /// Merge registered functions with `base`: vertex-stage functions first,
    /// then fragment-stage, then the base source.
    pub fn compose(&self, base: &str) -> String {
        let mut ordered: Vec<&ShaderFunction> = self.functions.iter().collect();
        ordered.sort_by_key(|f| f.point);

        let mut out = String::new();
        for function in ordered {
            out.push_str(&function.source);
            out.push('\n');
        }
        out.push_str(base);
        out
    }
}

/// Injected vertex function name (fixed contract).
pub const CLAMP_VERTEX_FUNCTION: &str = "oe_clamp_vertex";
/// Injected fragment function name (fixed contract).
pub const CLAMP_FRAGMENT_FUNCTION: &str = "oe_clamp_fragment";

/// WGSL source of the clamp vertex function for `mode`, bindings included.
pub fn clamp_vertex_source(mode: ClampMode) -> &'static str {
    match mode {
        ClampMode::GroundOffset => include_str!("../shaders/clamp_vertex_ground_offset.wgsl"),
        ClampMode::Direct => include_str!("../shaders/clamp_vertex_direct.wgsl"),
    }
}

/// WGSL source of the clamp fragment function (mode-independent).
pub fn clamp_fragment_source() -> &'static str {
    include_str!("../shaders/clamp_fragment.wgsl")
}

/// Build the composer pre-loaded with the clamp functions for `mode`.
pub fn clamp_composer(mode: ClampMode) -> ShaderComposer {
    let mut composer = ShaderComposer::new();
    composer.set_function(
        CLAMP_VERTEX_FUNCTION,
        clamp_vertex_source(mode),
        InjectionPoint::VertexView,
    );
    composer.set_function(
        CLAMP_FRAGMENT_FUNCTION,
        clamp_fragment_source(),
        InjectionPoint::FragmentColoring,
    );
    composer
}

/// Full overlay shader for `mode`: clamp functions merged with the built-in
/// overlay base.
pub fn overlay_shader_source(mode: ClampMode) -> String {
    clamp_composer(mode).compose(include_str!("../shaders/overlay_base.wgsl"))
}
