/// Mesh shader for every material kind.
///
/// Group 0 holds per-frame camera and light data, group 1 one material with
/// nine texture/sampler pairs in `TextureSlot` order. Lighting happens in
/// view space with point light positions already transformed on the CPU.
pub const MESH_SHADER: &str = r#"
const KIND_BASIC: u32 = 0u;
const KIND_NORMAL: u32 = 1u;
const KIND_MATCAP: u32 = 2u;
const KIND_DEPTH: u32 = 3u;
const KIND_LAMBERT: u32 = 4u;
const KIND_PHONG: u32 = 5u;
const KIND_TOON: u32 = 6u;
const KIND_STANDARD: u32 = 7u;

const FLAG_DISPLACEMENT: u32 = 1u;
const FLAG_NORMAL_MAP: u32 = 2u;
const FLAG_MATCAP: u32 = 4u;
const FLAG_GRADIENT: u32 = 8u;
const FLAG_FLAT: u32 = 16u;

const PI: f32 = 3.141592653589793;
const MAX_LIGHTS: u32 = 4u;

struct PointLight {
    // xyz view-space position, w cutoff distance (0 = none)
    position: vec4<f32>,
    // rgb radiance, w decay exponent
    color: vec4<f32>,
};

struct Frame {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    ambient: vec4<f32>,
    lights: array<PointLight, 4>,
    light_count: vec4<u32>,
};

struct Material {
    // rgb colour, a opacity
    color: vec4<f32>,
    // rgb specular colour, a shininess
    specular: vec4<f32>,
    // metalness, roughness, ao intensity, displacement scale
    params: vec4<f32>,
    // displacement bias, normal scale x, normal scale y, unused
    extra: vec4<f32>,
    // kind, flags
    kind: vec4<u32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;

@group(1) @binding(0) var<uniform> material: Material;
@group(1) @binding(1) var t_map: texture_2d<f32>;
@group(1) @binding(2) var s_map: sampler;
@group(1) @binding(3) var t_alpha: texture_2d<f32>;
@group(1) @binding(4) var s_alpha: sampler;
@group(1) @binding(5) var t_ao: texture_2d<f32>;
@group(1) @binding(6) var s_ao: sampler;
@group(1) @binding(7) var t_displacement: texture_2d<f32>;
@group(1) @binding(8) var s_displacement: sampler;
@group(1) @binding(9) var t_metalness: texture_2d<f32>;
@group(1) @binding(10) var s_metalness: sampler;
@group(1) @binding(11) var t_roughness: texture_2d<f32>;
@group(1) @binding(12) var s_roughness: sampler;
@group(1) @binding(13) var t_normal: texture_2d<f32>;
@group(1) @binding(14) var s_normal: sampler;
@group(1) @binding(15) var t_matcap: texture_2d<f32>;
@group(1) @binding(16) var s_matcap: sampler;
@group(1) @binding(17) var t_gradient: texture_2d<f32>;
@group(1) @binding(18) var s_gradient: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_pos: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

fn has_flag(flag: u32) -> bool {
    return (material.kind.y & flag) != 0u;
}

@vertex
fn vs_main(v: VertexInput, inst: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(inst.model_0, inst.model_1, inst.model_2, inst.model_3);
    let model_view = frame.view * model;

    var position = v.position;
    if has_flag(FLAG_DISPLACEMENT) {
        let height = textureSampleLevel(t_displacement, s_displacement, v.uv, 0.0).r;
        position += normalize(v.normal) * (height * material.params.w + material.extra.x);
    }

    let view_pos = model_view * vec4<f32>(position, 1.0);
    let normal_matrix = mat3x3<f32>(model_view[0].xyz, model_view[1].xyz, model_view[2].xyz);

    var out: VertexOutput;
    out.clip_position = frame.proj * view_pos;
    out.view_pos = view_pos.xyz;
    out.view_normal = normal_matrix * v.normal;
    out.uv = v.uv;
    return out;
}

// Tangent frame from screen-space derivatives. `q1` and `st1` are y
// derivatives in bottom-up window convention.
fn perturb_normal(n: vec3<f32>, q0: vec3<f32>, q1: vec3<f32>, st0: vec2<f32>, st1: vec2<f32>, map_n: vec3<f32>) -> vec3<f32> {
    let q1perp = cross(q1, n);
    let q0perp = cross(n, q0);
    let t = q1perp * st0.x + q0perp * st1.x;
    let b = q1perp * st0.y + q0perp * st1.y;
    let det = max(dot(t, t), dot(b, b));
    let scale = select(inverseSqrt(det), 0.0, det == 0.0);
    return normalize(t * (map_n.x * scale) + b * (map_n.y * scale) + n * map_n.z);
}

fn attenuation(dist: f32, cutoff: f32, decay: f32) -> f32 {
    if cutoff > 0.0 && decay > 0.0 {
        return pow(saturate(1.0 - dist / cutoff), decay);
    }
    return 1.0;
}

fn f_schlick(f0: vec3<f32>, f90: f32, v_dot_h: f32) -> vec3<f32> {
    let fresnel = exp2((-5.55473 * v_dot_h - 6.98316) * v_dot_h);
    return f0 * (1.0 - fresnel) + f90 * fresnel;
}

fn v_ggx(alpha: f32, n_dot_l: f32, n_dot_v: f32) -> f32 {
    let a2 = alpha * alpha;
    let gv = n_dot_l * sqrt(a2 + (1.0 - a2) * n_dot_v * n_dot_v);
    let gl = n_dot_v * sqrt(a2 + (1.0 - a2) * n_dot_l * n_dot_l);
    return 0.5 / max(gv + gl, 1e-6);
}

fn d_ggx(alpha: f32, n_dot_h: f32) -> f32 {
    let a2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * denom * denom);
}

fn toon_irradiance(n_dot_l_signed: f32) -> vec3<f32> {
    let coord = vec2<f32>(n_dot_l_signed * 0.5 + 0.5, 0.0);
    if has_flag(FLAG_GRADIENT) {
        return textureSampleLevel(t_gradient, s_gradient, coord, 0.0).rgb;
    }
    return vec3<f32>(select(0.7, 1.0, coord.x >= 0.7));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Derivatives and implicit-lod samples up front, in uniform control flow.
    let q0 = dpdx(in.view_pos);
    let q1 = -dpdy(in.view_pos);
    let st0 = dpdx(in.uv);
    let st1 = -dpdy(in.uv);

    let map_texel = textureSample(t_map, s_map, in.uv);
    let alpha_texel = textureSample(t_alpha, s_alpha, in.uv);
    let ao_texel = textureSample(t_ao, s_ao, in.uv);
    let metalness_texel = textureSample(t_metalness, s_metalness, in.uv);
    let roughness_texel = textureSample(t_roughness, s_roughness, in.uv);
    let normal_texel = textureSample(t_normal, s_normal, in.uv);

    let kind = material.kind.x;
    let flat_normal = normalize(cross(q0, q1));
    var normal = select(normalize(in.view_normal), flat_normal, has_flag(FLAG_FLAT));
    if has_flag(FLAG_NORMAL_MAP) {
        var map_n = normal_texel.xyz * 2.0 - 1.0;
        map_n = vec3<f32>(map_n.xy * material.extra.yz, map_n.z);
        normal = perturb_normal(normal, q0, q1, st0, st1, map_n);
    }

    // View direction toward the camera at the origin.
    let view_dir = normalize(-in.view_pos);

    let matcap_x = normalize(vec3<f32>(view_dir.z, 0.0, -view_dir.x));
    let matcap_y = cross(view_dir, matcap_x);
    let matcap_uv = vec2<f32>(dot(matcap_x, normal), dot(matcap_y, normal)) * 0.495 + 0.5;
    let matcap_texel = textureSample(t_matcap, s_matcap, matcap_uv);

    let normal_dxy = max(abs(dpdx(normal)), abs(dpdy(normal)));
    let geometry_roughness = max(max(normal_dxy.x, normal_dxy.y), normal_dxy.z);

    let diffuse = material.color.rgb * map_texel.rgb;
    let alpha = material.color.a * map_texel.a * alpha_texel.g;
    let ao = (ao_texel.r - 1.0) * material.params.z + 1.0;

    if kind == KIND_NORMAL {
        return vec4<f32>(normal * 0.5 + 0.5, material.color.a);
    }
    if kind == KIND_DEPTH {
        return vec4<f32>(vec3<f32>(1.0 - in.clip_position.z), material.color.a);
    }
    if kind == KIND_MATCAP {
        var matcap = vec3<f32>(mix(0.2, 0.8, matcap_uv.y));
        if has_flag(FLAG_MATCAP) {
            matcap = matcap_texel.rgb;
        }
        return vec4<f32>(diffuse * matcap, alpha);
    }
    if kind == KIND_BASIC {
        return vec4<f32>(diffuse * ao, alpha);
    }

    let metalness = saturate(material.params.x * metalness_texel.b);
    let roughness = min(max(material.params.y * roughness_texel.g, 0.0525) + geometry_roughness, 1.0);
    let rough_alpha = roughness * roughness;
    var albedo = diffuse;
    var specular_color = material.specular.rgb;
    if kind == KIND_STANDARD {
        albedo = diffuse * (1.0 - metalness);
        specular_color = mix(vec3<f32>(0.04), diffuse, metalness);
    }
    let n_dot_v = saturate(dot(normal, view_dir));

    var direct_diffuse = vec3<f32>(0.0);
    var direct_specular = vec3<f32>(0.0);
    let count = min(frame.light_count.x, MAX_LIGHTS);
    for (var i = 0u; i < count; i += 1u) {
        let light = frame.lights[i];
        let to_light = light.position.xyz - in.view_pos;
        let dist = length(to_light);
        let l = to_light / max(dist, 1e-6);
        let radiance = light.color.rgb * attenuation(dist, light.position.w, light.color.w);
        let n_dot_l_signed = dot(normal, l);
        let n_dot_l = saturate(n_dot_l_signed);
        let h = normalize(l + view_dir);
        let n_dot_h = saturate(dot(normal, h));
        let v_dot_h = saturate(dot(view_dir, h));

        if kind == KIND_TOON {
            direct_diffuse += radiance * toon_irradiance(n_dot_l_signed);
            continue;
        }
        direct_diffuse += radiance * n_dot_l;
        if kind == KIND_PHONG {
            let shininess = material.specular.a;
            let fresnel = f_schlick(specular_color, 1.0, v_dot_h);
            let blinn = 0.25 * (shininess * 0.5 + 1.0) * pow(n_dot_h, shininess);
            direct_specular += radiance * n_dot_l * fresnel * blinn;
        } else if kind == KIND_STANDARD {
            let fresnel = f_schlick(specular_color, 1.0, v_dot_h);
            let brdf = fresnel * v_ggx(rough_alpha, n_dot_l, n_dot_v) * d_ggx(rough_alpha, n_dot_h);
            direct_specular += PI * radiance * n_dot_l * brdf;
        }
    }

    let indirect = frame.ambient.rgb * ao;
    let color = albedo * (indirect + direct_diffuse) + direct_specular;
    return vec4<f32>(color, alpha);
}
"#;
