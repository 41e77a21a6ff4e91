//! Mesh validation utilities.
//!
//! `MeshValidator` checks mesh data integrity: correct stride, in-range
//! indices, finite positions, unit normals and bounding box dimensions.
//! [`validate_group`] runs the same checks over every buffer of a
//! tessellated chart.

use glam::Vec3;

use crate::chart::GroupMeshes;
use crate::viewport::mesh::{MeshData, LINE_STRIDE, MESH_STRIDE, TEXTURED_STRIDE};

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len() / MESH_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.indices.len() / 3
    }

    pub fn is_stride_valid(&self) -> bool {
        self.mesh.vertices.len() % MESH_STRIDE == 0
    }

    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    pub fn are_positions_finite(&self) -> bool {
        self.positions().all(|p| p.is_finite())
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        self.mesh.vertices.chunks_exact(MESH_STRIDE).all(|v| {
            let len = Vec3::new(v[3], v[4], v[5]).length();
            (len - 1.0).abs() <= epsilon
        })
    }

    /// Min and max corners, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.positions().fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }

    /// Width, height and depth of the bounding box
    pub fn dimensions(&self) -> [f32; 3] {
        self.bounds()
            .map(|(lo, hi)| (hi - lo).to_array())
            .unwrap_or([0.0; 3])
    }

    pub fn assert_dimensions_approx(&self, expected: [f32; 3], tolerance: f32) -> bool {
        let dims = self.dimensions();
        dims.iter()
            .zip(expected)
            .all(|(d, e)| (d - e).abs() < tolerance)
    }

    /// True when some vertex carries `color` (within 0.01 per channel)
    pub fn has_color(&self, color: [f32; 3]) -> bool {
        self.mesh.vertices.chunks_exact(MESH_STRIDE).any(|v| {
            (v[6] - color[0]).abs() < 0.01
                && (v[7] - color[1]).abs() < 0.01
                && (v[8] - color[2]).abs() < 0.01
        })
    }

    /// Run all validation checks and return a list of error messages.
    /// An empty list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex buffer length {} is not a multiple of {MESH_STRIDE}",
                self.mesh.vertices.len()
            ));
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index buffer length {} is not a multiple of 3",
                self.mesh.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .mesh
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if !self.are_positions_finite() {
            errors.push("Some positions are NaN or infinite".to_string());
        }

        if self.vertex_count() > 0 && !self.are_normals_normalized(0.1) {
            errors.push("Some normals are not unit-length (epsilon=0.1)".to_string());
        }

        errors
    }

    fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.mesh
            .vertices
            .chunks_exact(MESH_STRIDE)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
    }
}

/// Validate every buffer of a tessellated group. Errors are prefixed with
/// the buffer they come from.
pub fn validate_group(meshes: &GroupMeshes) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, mesh) in [("lit", &meshes.lit), ("unlit", &meshes.unlit)] {
        errors.extend(
            MeshValidator::new(mesh)
                .validate_all()
                .into_iter()
                .map(|e| format!("{name}: {e}")),
        );
    }

    let lines = &meshes.lines.vertices;
    if lines.len() % (LINE_STRIDE * 2) != 0 {
        errors.push(format!(
            "lines: buffer length {} is not a whole number of segments",
            lines.len()
        ));
    }
    if lines.iter().any(|v| !v.is_finite()) {
        errors.push("lines: non-finite values".to_string());
    }

    for (i, label) in meshes.labels.iter().enumerate() {
        let quad = &label.quad;
        if quad.vertices.len() % TEXTURED_STRIDE != 0 {
            errors.push(format!("label {i}: bad vertex stride"));
        }
        if quad
            .indices
            .iter()
            .any(|&idx| idx as usize >= quad.vertex_count())
        {
            errors.push(format!("label {i}: index out of range"));
        }
        let t = &label.texture;
        if t.rgba.len() != (t.width * t.height * 4) as usize {
            errors.push(format!(
                "label {i}: texture is {} bytes for {}x{}",
                t.rgba.len(),
                t.width,
                t.height
            ));
        }
    }

    errors
}
