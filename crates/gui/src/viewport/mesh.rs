use glam::{Mat4, Vec3};

/// Floats per solid vertex: position(3) + normal(3) + color(3)
pub const MESH_STRIDE: usize = 9;
/// Floats per line vertex: position(3) + color(4)
pub const LINE_STRIDE: usize = 7;
/// Floats per textured vertex: position(3) + uv(2)
pub const TEXTURED_STRIDE: usize = 5;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / MESH_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bake a rigid transform into positions and normals
    pub fn transformed(mut self, m: &Mat4) -> Self {
        for v in self.vertices.chunks_exact_mut(MESH_STRIDE) {
            let p = m.transform_point3(Vec3::new(v[0], v[1], v[2]));
            let n = m.transform_vector3(Vec3::new(v[3], v[4], v[5])).normalize_or_zero();
            v[..6].copy_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        self
    }

    /// Merge another mesh into this one
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Line segments: interleaved [pos.x, pos.y, pos.z, r, g, b, a], two vertices per segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMeshData {
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / LINE_STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a connected strip as individual segments
    pub fn push_strip(&mut self, points: &[Vec3], m: &Mat4, color: [f32; 3]) {
        let c = [color[0], color[1], color[2], 1.0];
        for pair in points.windows(2) {
            let a = m.transform_point3(pair[0]);
            let b = m.transform_point3(pair[1]);
            push_line_vert(&mut self.vertices, a.x, a.y, a.z, c);
            push_line_vert(&mut self.vertices, b.x, b.y, b.z, c);
        }
    }
}

/// Textured quad: interleaved [pos.x, pos.y, pos.z, u, v]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexturedMeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TexturedMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / TEXTURED_STRIDE
    }

    pub fn transformed(mut self, m: &Mat4) -> Self {
        for v in self.vertices.chunks_exact_mut(TEXTURED_STRIDE) {
            let p = m.transform_point3(Vec3::new(v[0], v[1], v[2]));
            v[..3].copy_from_slice(&[p.x, p.y, p.z]);
        }
        self
    }
}

// ── Primitive generation ─────────────────────────────────────

pub fn cube(w: f32, h: f32, d: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let hd = d * 0.5;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-hw, -hh, hd), Vec3::new(hw, -hh, hd), Vec3::new(hw, hh, hd), Vec3::new(-hw, hh, hd)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(hw, -hh, -hd), Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, hh, -hd), Vec3::new(hw, hh, -hd)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(hw, -hh, hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, hh, -hd), Vec3::new(hw, hh, hd)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(-hw, -hh, hd), Vec3::new(-hw, hh, hd), Vec3::new(-hw, hh, -hd)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-hw, hh, hd), Vec3::new(hw, hh, hd), Vec3::new(hw, hh, -hd), Vec3::new(-hw, hh, -hd)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-hw, -hh, -hd), Vec3::new(hw, -hh, -hd), Vec3::new(hw, -hh, hd), Vec3::new(-hw, -hh, hd)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * MESH_STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / MESH_STRIDE) as u32;
        for v in quad {
            push_vert(&mut vertices, v.x, v.y, v.z, *normal, color);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

pub fn sphere(radius: f32, rings: u32, sectors: u32, color: [f32; 3]) -> MeshData {
    let rings = rings.max(2);
    let sectors = sectors.max(3);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for r in 0..=rings {
        let phi = std::f32::consts::PI * r as f32 / rings as f32;
        let sp = phi.sin();
        let cp = phi.cos();

        for s in 0..=sectors {
            let theta = std::f32::consts::TAU * s as f32 / sectors as f32;
            let x = sp * theta.cos();
            let y = cp;
            let z = sp * theta.sin();
            push_vert(&mut vertices, radius * x, radius * y, radius * z, Vec3::new(x, y, z), color);
        }
    }

    for r in 0..rings {
        for s in 0..sectors {
            let i0 = r * (sectors + 1) + s;
            let i1 = i0 + 1;
            let i2 = i0 + sectors + 1;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    MeshData { vertices, indices }
}

/// Flat quad in the XY plane facing +Z
pub fn quad(w: f32, h: f32, color: [f32; 3]) -> MeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let mut vertices = Vec::with_capacity(4 * MESH_STRIDE);
    for (x, y) in [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)] {
        push_vert(&mut vertices, x, y, 0.0, Vec3::Z, color);
    }
    MeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Flat quad in the XY plane with texture row 0 at the top edge
pub fn textured_quad(w: f32, h: f32) -> TexturedMeshData {
    let hw = w * 0.5;
    let hh = h * 0.5;
    let vertices = vec![
        -hw, -hh, 0.0, 0.0, 1.0, //
        hw, -hh, 0.0, 1.0, 1.0, //
        hw, hh, 0.0, 1.0, 0.0, //
        -hw, hh, 0.0, 0.0, 0.0,
    ];
    TexturedMeshData {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Ground plane of `size` x `size` lying in XZ at y = 0
pub fn ground(size: f32, color: [f32; 3]) -> MeshData {
    quad(size, size, color).transformed(&Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2))
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[px, py, pz, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line_vert(v: &mut Vec<f32>, px: f32, py: f32, pz: f32, c: [f32; 4]) {
    v.extend_from_slice(&[px, py, pz, c[0], c[1], c[2], c[3]]);
}
