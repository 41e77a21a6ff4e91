use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;

use stockwalk_lib::chart::{GroupMeshes, LabelTexture};
use stockwalk_lib::host::NodeId;

use super::mesh::{self, LineMeshData, MeshData, TexturedMeshData, LINE_STRIDE, MESH_STRIDE, TEXTURED_STRIDE};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub view_proj: Mat4,
    /// Camera position, for specular highlights
    pub eye: Vec3,
    /// Background color RGB
    pub bg_color: [u8; 3],
}

/// Ambient 0x404040 plus a white directional light at half intensity
const AMBIENT: f32 = 64.0 / 255.0;
const LIGHT_INTENSITY: f32 = 0.5;
const SPECULAR: f32 = 17.0 / 255.0;
const SHININESS: f32 = 100.0;

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

struct GpuLabel {
    quad: GpuMesh,
    texture: glow::Texture,
}

/// Everything uploaded for one attached chart group
struct GpuNode {
    model: Mat4,
    lit: Option<GpuMesh>,
    unlit: Option<GpuMesh>,
    lines: Option<GpuLines>,
    labels: Vec<GpuLabel>,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    label_program: glow::Program,
    ground: Option<GpuMesh>,
    /// Cached ground settings to detect changes
    cached_ground: Option<(f32, [u8; 3])>,
    /// Chart groups keyed by scene node
    nodes: HashMap<NodeId, GpuNode>,
    /// Version counter to detect scene changes
    last_version: u64,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;
        let label_program = compile_program(gl, LABEL_VERT, LABEL_FRAG)?;

        Ok(Self {
            mesh_program,
            line_program,
            label_program,
            ground: None,
            cached_ground: None,
            nodes: HashMap::new(),
            last_version: 0,
        })
    }

    /// Rebuild the ground plane when its size or color changes
    pub fn update_ground(&mut self, gl: &glow::Context, size: f32, color: [u8; 3]) -> Result<(), String> {
        if self.cached_ground == Some((size, color)) {
            return Ok(());
        }

        if let Some(old) = self.ground.take() {
            delete_mesh(gl, &old);
        }

        let rgb = color.map(|c| c as f32 / 255.0);
        self.ground = Some(upload_mesh(gl, &mesh::ground(size, rgb))?);
        self.cached_ground = Some((size, color));
        Ok(())
    }

    /// Upload new groups and free the ones that left the scene
    pub fn sync_nodes(
        &mut self,
        gl: &glow::Context,
        nodes: &HashMap<NodeId, Arc<GroupMeshes>>,
        version: u64,
    ) -> Result<(), String> {
        if version == self.last_version {
            return Ok(());
        }

        let stale: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|id| !nodes.contains_key(id))
            .copied()
            .collect();
        for id in stale {
            self.release_node(gl, id);
        }

        for (id, meshes) in nodes {
            if !self.nodes.contains_key(id) {
                let gpu = upload_node(gl, meshes)?;
                self.nodes.insert(*id, gpu);
            }
        }

        self.last_version = version;
        Ok(())
    }

    /// Free one node's buffers and textures. Unknown ids are ignored.
    pub fn release_node(&mut self, gl: &glow::Context, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            delete_node(gl, &node);
            tracing::debug!(node = %id, "released GPU resources");
        }
    }

    /// Render the scene
    pub fn paint(&self, gl: &glow::Context, params: &RenderParams) {
        let [x, y, w, h] = params.viewport.map(|v| v as i32);
        let vp = params.view_proj;
        let light_dir = Vec3::ONE.normalize();

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            // Clear viewport area with configured background color
            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            // Solid geometry
            gl.use_program(Some(self.mesh_program));
            set_uniform_mat4(gl, self.mesh_program, "u_view_proj", &vp);
            set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);
            set_uniform_vec3(gl, self.mesh_program, "u_eye", &params.eye);
            set_uniform_f32(gl, self.mesh_program, "u_ambient", AMBIENT);
            set_uniform_f32(gl, self.mesh_program, "u_light", LIGHT_INTENSITY);
            set_uniform_f32(gl, self.mesh_program, "u_specular", SPECULAR);
            set_uniform_f32(gl, self.mesh_program, "u_shininess", SHININESS);

            if let Some(ref ground) = self.ground {
                set_uniform_mat4(gl, self.mesh_program, "u_model", &Mat4::IDENTITY);
                set_uniform_f32(gl, self.mesh_program, "u_lit", 0.0);
                draw_mesh(gl, ground);
            }

            for node in self.nodes.values() {
                set_uniform_mat4(gl, self.mesh_program, "u_model", &node.model);
                if let Some(ref lit) = node.lit {
                    set_uniform_f32(gl, self.mesh_program, "u_lit", 1.0);
                    draw_mesh(gl, lit);
                }
                if let Some(ref unlit) = node.unlit {
                    set_uniform_f32(gl, self.mesh_program, "u_lit", 0.0);
                    draw_mesh(gl, unlit);
                }
            }

            // Connectors and polylines
            gl.use_program(Some(self.line_program));
            for node in self.nodes.values() {
                if let Some(ref lines) = node.lines {
                    set_uniform_mat4(gl, self.line_program, "u_mvp", &(vp * node.model));
                    draw_lines(gl, lines);
                }
            }

            // Labels: transparent, double sided
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.disable(glow::CULL_FACE);
            gl.use_program(Some(self.label_program));
            set_uniform_i32(gl, self.label_program, "u_texture", 0);
            gl.active_texture(glow::TEXTURE0);
            for node in self.nodes.values() {
                set_uniform_mat4(gl, self.label_program, "u_mvp", &(vp * node.model));
                for label in &node.labels {
                    gl.bind_texture(glow::TEXTURE_2D, Some(label.texture));
                    draw_mesh(gl, &label.quad);
                }
            }
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.disable(glow::BLEND);

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
            gl.delete_program(self.label_program);
        }
        if let Some(ground) = self.ground.take() {
            delete_mesh(gl, &ground);
        }
        for (_, node) in self.nodes.drain() {
            delete_node(gl, &node);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_node(gl: &glow::Context, meshes: &GroupMeshes) -> Result<GpuNode, String> {
    let lit = (!meshes.lit.is_empty())
        .then(|| upload_mesh(gl, &meshes.lit))
        .transpose()?;
    let unlit = (!meshes.unlit.is_empty())
        .then(|| upload_mesh(gl, &meshes.unlit))
        .transpose()?;
    let lines = (!meshes.lines.is_empty())
        .then(|| upload_lines(gl, &meshes.lines))
        .transpose()?;
    let labels = meshes
        .labels
        .iter()
        .map(|label| {
            Ok(GpuLabel {
                quad: upload_textured(gl, &label.quad)?,
                texture: upload_texture(gl, &label.texture)?,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(GpuNode {
        model: meshes.model,
        lit,
        unlit,
        lines,
        labels,
    })
}

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (MESH_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = upload_indices(gl, &data.indices)?;
        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn upload_textured(gl: &glow::Context, data: &TexturedMeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (TEXTURED_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // uv: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 3 * 4);

        let ibo = upload_indices(gl, &data.indices)?;
        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn upload_lines(gl: &glow::Context, data: &LineMeshData) -> Result<GpuLines, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = (LINE_STRIDE * 4) as i32;
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: data.vertex_count() as i32,
        })
    }
}

unsafe fn upload_indices(gl: &glow::Context, indices: &[u32]) -> Result<glow::Buffer, String> {
    let ibo = gl.create_buffer()?;
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
    gl.buffer_data_u8_slice(
        glow::ELEMENT_ARRAY_BUFFER,
        bytemuck_cast_slice(indices),
        glow::STATIC_DRAW,
    );
    Ok(ibo)
}

fn upload_texture(gl: &glow::Context, texture: &LabelTexture) -> Result<glow::Texture, String> {
    unsafe {
        let tex = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(tex));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            texture.width as i32,
            texture.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(&texture.rgba)),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(tex)
    }
}

// ── GPU release ──────────────────────────────────────────────

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines.vbo);
    }
}

fn delete_node(gl: &glow::Context, node: &GpuNode) {
    if let Some(ref m) = node.lit {
        delete_mesh(gl, m);
    }
    if let Some(ref m) = node.unlit {
        delete_mesh(gl, m);
    }
    if let Some(ref l) = node.lines {
        delete_lines(gl, l);
    }
    for label in &node.labels {
        delete_mesh(gl, &label.quad);
        unsafe { gl.delete_texture(label.texture) };
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;
        let vert = compile_shader(gl, glow::VERTEX_SHADER, vert_src)?;
        let frag = compile_shader(gl, glow::FRAGMENT_SHADER, frag_src)?;

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(format!("program link error: {log}"));
        }
        Ok(program)
    }
}

unsafe fn compile_shader(gl: &glow::Context, kind: u32, src: &str) -> Result<glow::Shader, String> {
    let shader = gl.create_shader(kind)?;
    gl.shader_source(shader, src);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(format!("shader compile error: {log}"));
    }
    Ok(shader)
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

fn set_uniform_i32(gl: &glow::Context, program: glow::Program, name: &str, v: i32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_i32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_view_proj;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_world;
out vec3 v_normal;
out vec3 v_color;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    gl_Position = u_view_proj * world;
    v_world = world.xyz;
    v_normal = mat3(transpose(inverse(u_model))) * a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform vec3 u_eye;
uniform float u_lit;
uniform float u_ambient;
uniform float u_light;
uniform float u_specular;
uniform float u_shininess;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    if (u_lit < 0.5) {
        frag_color = vec4(v_color, 1.0);
        return;
    }
    vec3 n = normalize(v_normal);
    vec3 view = normalize(u_eye - v_world);
    vec3 half_dir = normalize(u_light_dir + view);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    float spec = pow(max(dot(n, half_dir), 0.0), u_shininess) * u_specular * u_light;
    vec3 color = v_color * (u_ambient + diffuse * u_light) + vec3(spec);
    frag_color = vec4(color, 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;

const LABEL_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;

out vec2 v_uv;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_uv = a_uv;
}
"#;

const LABEL_FRAG: &str = r#"#version 330 core
uniform sampler2D u_texture;

in vec2 v_uv;
out vec4 frag_color;

void main() {
    vec4 texel = texture(u_texture, v_uv);
    if (texel.a < 0.01) {
        discard;
    }
    frag_color = texel;
}
"#;
