//! GLSL sources for the UI pipeline
//!
//! One fixed program: 2D position + UV + packed color in, textured and
//! vertex-color-modulated fragments out. Vertex positions arrive in pixel
//! coordinates; the `Scale` uniform maps them into clip space with the Y
//! axis flipped to match ImGui's top-left origin.

/// Vertex stage, minus the version header.
pub(crate) const VERTEX: &str = r#"
uniform vec2 Scale;
layout (location = 0) in vec2 in_vertex;
layout (location = 1) in vec2 in_uv;
layout (location = 2) in vec4 in_color;
out vec2 v_uv;
out vec4 v_color;
void main() {
    v_uv = in_uv;
    v_color = in_color;
    gl_Position = vec4(in_vertex.xy * Scale - 1.0, 0.0, 1.0);
    gl_Position.y = -gl_Position.y;
}
"#;

/// Fragment stage, minus the version header.
pub(crate) const FRAGMENT: &str = r#"
uniform sampler2D Texture;
in vec2 v_uv;
in vec4 v_color;
layout (location = 0) out vec4 out_color;
void main() {
    out_color = texture(Texture, v_uv) * v_color;
}
"#;

/// Version header for the context flavor the shaders are compiled under.
pub(crate) fn header(embedded: bool) -> &'static str {
    if embedded {
        "#version 300 es\nprecision highp float;"
    } else {
        "#version 330 core"
    }
}
