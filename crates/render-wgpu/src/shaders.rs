/// WGSL shader for the lit scene: ground plane and model meshes under one
/// spotlight with a PCF-filtered shadow map. Base color is the instance
/// color times the mesh's texture (1x1 white when it has none).
pub const SCENE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

struct Light {
    view_proj: mat4x4<f32>,
    // xyz position, w intensity
    position: vec4<f32>,
    // xyz direction, w range
    direction: vec4<f32>,
    // rgb color, w cosine of the cone edge
    color: vec4<f32>,
    // x penumbra cosine, y shadows enabled, z shadow texel size, w depth bias
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> light: Light;
@group(1) @binding(1)
var shadow_map: texture_depth_2d;
@group(1) @binding(2)
var shadow_sampler: sampler_comparison;

@group(2) @binding(0)
var base_color_texture: texture_2d<f32>;
@group(2) @binding(1)
var base_color_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(8) uv: vec2<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    // x receives shadows
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) receive_shadow: f32,
    @location(4) uv: vec2<f32>,
};

const PI: f32 = 3.14159265;

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.color = instance.color;
    out.receive_shadow = instance.params.x;
    out.uv = vertex.uv;
    return out;
}

fn shadow_factor(world_pos: vec3<f32>) -> f32 {
    let clip = light.view_proj * vec4<f32>(world_pos, 1.0);
    if (clip.w <= 0.0) {
        return 1.0;
    }
    let ndc = clip.xyz / clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }
    let depth = ndc.z + light.params.w;
    let texel = light.params.z;

    var lit = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    // Sampled before any branch; implicit derivatives need uniform control flow.
    let albedo = in.color * textureSample(base_color_texture, base_color_sampler, in.uv);

    var n = normalize(in.world_normal);
    if (!front_facing) {
        n = -n;
    }

    let to_light = light.position.xyz - in.world_pos;
    let dist = length(to_light);
    let l = to_light / max(dist, 0.0001);
    let n_dot_l = max(dot(n, l), 0.0);

    let range_falloff = pow(clamp(1.0 - pow(dist / light.direction.w, 4.0), 0.0, 1.0), 2.0);
    let attenuation = light.position.w * range_falloff / max(dist * dist, 0.01);
    let cone = smoothstep(light.color.w, light.params.x, dot(-l, light.direction.xyz));

    var shadow = 1.0;
    if (in.receive_shadow > 0.5 && light.params.y > 0.5) {
        shadow = shadow_factor(in.world_pos);
    }

    let irradiance = light.color.rgb * (n_dot_l * attenuation * cone * shadow);
    return vec4<f32>(albedo.rgb / PI * irradiance, albedo.a);
}
"#;

/// WGSL shader for the depth-only pass from the spotlight.
pub const SHADOW_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return camera.view_proj * model * vec4<f32>(vertex.position, 1.0);
}
"#;
