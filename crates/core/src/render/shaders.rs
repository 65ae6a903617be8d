//! GLSL ES 3.0 sources for the GPU ripple backend.
//!
//! The simulation shader runs the same per-cell rule as the CPU stepper, one
//! fragment per cell, reading the current state texture with `texelFetch`.
//! Rings are passed in GL cell coordinates (origin bottom-left).

/// Maximum rings injected per GPU step; extra excitations are dropped.
pub const MAX_RINGS: usize = 4;

/// Fullscreen triangle generated from `gl_VertexID`; draw 3 vertices with an
/// empty VAO bound.
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
out vec2 v_uv;
void main() {
    v_uv = vec2((gl_VertexID << 1) & 2, gl_VertexID & 2);
    gl_Position = vec4(v_uv * 2.0 - 1.0, 0.0, 1.0);
}
"#;

/// One wave step. Output channels: force, velocity, gradient x, gradient y.
pub const SIMULATION_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;
precision highp int;

#define MAX_RINGS 4

uniform sampler2D u_state;
uniform int u_stride;
uniform float u_delta;
uniform float u_restoring;
uniform float u_damping;
uniform float u_decay;
uniform int u_ring_count;
uniform vec4 u_rings[MAX_RINGS];       // x, y, inner, outer
uniform float u_ring_strength[MAX_RINGS];

out vec4 o_state;

float force_at(ivec2 p) {
    return texelFetch(u_state, p, 0).r;
}

// Opposite-neighbour substitution; the cell's own force when both are out.
vec2 pair(ivec2 c, ivec2 axis, int limit, int coord, float own) {
    bool has_neg = coord - u_stride >= 0;
    bool has_pos = coord + u_stride < limit;
    float neg = has_neg ? force_at(c - axis * u_stride) : own;
    float pos = has_pos ? force_at(c + axis * u_stride) : own;
    if (!has_neg && has_pos) neg = pos;
    if (!has_pos && has_neg) pos = neg;
    return vec2(neg, pos);
}

float finite_or_zero(float v) {
    return (isnan(v) || isinf(v)) ? 0.0 : v;
}

void main() {
    ivec2 size = textureSize(u_state, 0);
    ivec2 c = ivec2(gl_FragCoord.xy);
    vec4 here = texelFetch(u_state, c, 0);
    float f = here.r;
    float v = here.g;

    vec2 lr = pair(c, ivec2(1, 0), size.x, c.x, f);
    vec2 du = pair(c, ivec2(0, 1), size.y, c.y, f);
    float l = lr.x;
    float r = lr.y;
    float d = du.x;
    float u = du.y;

    v += u_delta * (-2.0 * f + r + l) / 4.0 + u_delta * (-2.0 * f + u + d) / 4.0;
    f += u_delta * v;
    v -= u_restoring * u_delta * f;
    v *= u_damping;
    f *= u_decay;

    for (int i = 0; i < MAX_RINGS; i++) {
        if (i >= u_ring_count) break;
        vec4 ring = u_rings[i];
        if (ring.w <= 0.0) continue;
        float dist = distance(gl_FragCoord.xy, ring.xy);
        float w = smoothstep(ring.z - 1.0, ring.z, dist)
                * (1.0 - smoothstep(ring.w, ring.w + 1.0, dist));
        f += w * u_ring_strength[i];
    }

    o_state = vec4(
        finite_or_zero(f),
        finite_or_zero(v),
        (r - l) / 2.0,
        (u - d) / 2.0
    );
}
"#;

/// Theme shading of the force channel.
pub const DISPLAY_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform sampler2D u_state;
uniform vec3 u_tint;
uniform float u_ambient;
uniform float u_bloom_reduction;
uniform float u_gamma;

in vec2 v_uv;
out vec4 o_color;

void main() {
    float force = texture(u_state, v_uv).r;
    float intensity = pow(max(force * u_bloom_reduction, 0.0), u_gamma);
    o_color = vec4(clamp(u_tint * (u_ambient + intensity), 0.0, 1.0), 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&str; 3] = [
        FULLSCREEN_VERTEX_SHADER,
        SIMULATION_FRAGMENT_SHADER,
        DISPLAY_FRAGMENT_SHADER,
    ];

    #[test]
    fn every_shader_targets_glsl_es_300() {
        for src in ALL {
            assert!(src.starts_with("#version 300 es"), "bad header in:\n{src}");
            assert!(src.contains("void main()"));
        }
    }

    #[test]
    fn simulation_declares_every_uniform_the_backend_sets() {
        for name in [
            "u_state",
            "u_stride",
            "u_delta",
            "u_restoring",
            "u_damping",
            "u_decay",
            "u_ring_count",
            "u_rings",
            "u_ring_strength",
        ] {
            assert!(
                SIMULATION_FRAGMENT_SHADER.contains(&format!(" {name};"))
                    || SIMULATION_FRAGMENT_SHADER.contains(&format!(" {name}[")),
                "missing uniform {name}"
            );
        }
    }

    #[test]
    fn ring_capacity_matches_glsl_define() {
        assert!(SIMULATION_FRAGMENT_SHADER.contains(&format!("#define MAX_RINGS {MAX_RINGS}")));
    }

    #[test]
    fn simulation_applies_decay_after_damping() {
        let damping = SIMULATION_FRAGMENT_SHADER.find("v *= u_damping").unwrap();
        let decay = SIMULATION_FRAGMENT_SHADER.find("f *= u_decay").unwrap();
        assert!(damping < decay);
    }

    #[test]
    fn display_declares_theme_uniforms() {
        for name in ["u_tint", "u_ambient", "u_bloom_reduction", "u_gamma"] {
            assert!(DISPLAY_FRAGMENT_SHADER.contains(name), "missing {name}");
        }
    }
}
