//! Visual group: an owned bundle of chart primitives plus its placement.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::label::LabelTexture;
use crate::viewport::mesh::{self, LineMeshData, MeshData, TexturedMeshData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartRole {
    Bar,
    Label,
    Marker,
    Connector,
    Polyline,
    Axis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32, segments: u32 },
    /// Flat rectangle in the local XY plane, facing +Z
    Plane { width: f32, height: f32 },
    Polyline { points: Vec<Vec3> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    Phong { shininess: f32, specular: [f32; 3] },
    /// Unlit, flat color
    Basic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub shading: Shading,
    pub map: Option<LabelTexture>,
    pub transparent: bool,
    pub double_sided: bool,
}

impl Material {
    pub fn phong(color: [f32; 3], shininess: f32, specular: [f32; 3]) -> Self {
        Self {
            color,
            shading: Shading::Phong {
                shininess,
                specular,
            },
            map: None,
            transparent: false,
            double_sided: false,
        }
    }

    pub fn basic(color: [f32; 3]) -> Self {
        Self {
            color,
            shading: Shading::Basic,
            map: None,
            transparent: false,
            double_sided: false,
        }
    }

    /// Transparent, double sided, textured
    pub fn with_map(texture: LabelTexture) -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            shading: Shading::Basic,
            map: Some(texture),
            transparent: true,
            double_sided: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub role: PartRole,
    pub geometry: Geometry,
    pub material: Material,
    /// Center of the part in group space
    pub position: Vec3,
    /// Rotation about the X axis, radians
    pub rotation_x: f32,
}

impl Part {
    pub fn new(role: PartRole, geometry: Geometry, material: Material, position: Vec3) -> Self {
        Self {
            role,
            geometry,
            material,
            position,
            rotation_x: 0.0,
        }
    }

    pub fn rotated_x(mut self, angle: f32) -> Self {
        self.rotation_x = angle;
        self
    }

    fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_rotation_x(self.rotation_x)
    }

    /// Geometry + material (+ texture map)
    fn resource_count(&self) -> usize {
        2 + usize::from(self.material.map.is_some())
    }
}

/// Caller-chosen position and scale applied when a group is attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub position: [f32; 3],
    pub scale: [f32; 3],
}

impl Placement {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualGroup {
    parts: Vec<Part>,
    /// Internal recentering, applied before placement
    pub offset: Vec3,
    pub position: Vec3,
    pub scale: Vec3,
    disposed: bool,
}

impl Default for VisualGroup {
    fn default() -> Self {
        Self {
            parts: Vec::new(),
            offset: Vec3::ZERO,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            disposed: false,
        }
    }
}

impl VisualGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn count(&self, role: PartRole) -> usize {
        self.parts.iter().filter(|p| p.role == role).count()
    }

    pub fn parts_with(&self, role: PartRole) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(move |p| p.role == role)
    }

    pub fn place(&mut self, placement: &Placement) {
        self.position = Vec3::from(placement.position);
        self.scale = Vec3::from(placement.scale);
    }

    /// Group space to world space: placement, then scale, then the offset
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(self.scale)
            * Mat4::from_translation(self.offset)
    }

    /// Live geometries, materials and texture maps
    pub fn resource_count(&self) -> usize {
        self.parts.iter().map(Part::resource_count).sum()
    }

    /// Free every resource. Returns how many were released; a second call
    /// releases nothing.
    pub fn dispose(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        let released = self.resource_count();
        self.parts.clear();
        self.disposed = true;
        released
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Bake every part into GPU-ready buffers in group space
    pub fn tessellate(&self) -> GroupMeshes {
        let mut out = GroupMeshes {
            model: self.model_matrix(),
            ..Default::default()
        };

        for part in &self.parts {
            let local = part.local_matrix();
            let color = part.material.color;
            match (&part.geometry, &part.material.map) {
                (Geometry::Plane { width, height }, Some(texture)) => {
                    out.labels.push(LabelMesh {
                        quad: mesh::textured_quad(*width, *height).transformed(&local),
                        texture: texture.clone(),
                    });
                }
                (Geometry::Polyline { points }, _) => {
                    out.lines.push_strip(points, &local, color);
                }
                (geometry, _) => {
                    let solid = match geometry {
                        Geometry::Box {
                            width,
                            height,
                            depth,
                        } => mesh::cube(*width, *height, *depth, color),
                        Geometry::Sphere { radius, segments } => {
                            mesh::sphere(*radius, *segments, *segments, color)
                        }
                        Geometry::Plane { width, height } => mesh::quad(*width, *height, color),
                        Geometry::Polyline { .. } => MeshData::default(),
                    }
                    .transformed(&local);
                    match part.material.shading {
                        Shading::Phong { .. } => out.lit.append(&solid),
                        Shading::Basic => out.unlit.append(&solid),
                    }
                }
            }
        }

        out
    }
}

#[derive(Debug, Clone)]
pub struct LabelMesh {
    pub quad: TexturedMeshData,
    pub texture: LabelTexture,
}

/// Tessellated group, ready for upload
#[derive(Debug, Clone, Default)]
pub struct GroupMeshes {
    pub model: Mat4,
    pub lit: MeshData,
    pub unlit: MeshData,
    pub lines: LineMeshData,
    pub labels: Vec<LabelMesh>,
}

impl GroupMeshes {
    pub fn is_empty(&self) -> bool {
        self.lit.is_empty() && self.unlit.is_empty() && self.lines.is_empty() && self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> VisualGroup {
        let mut g = VisualGroup::new();
        g.push(Part::new(
            PartRole::Bar,
            Geometry::Box {
                width: 2.0,
                height: 4.0,
                depth: 2.0,
            },
            Material::phong([0.0, 1.0, 0.0], 100.0, [0.07; 3]),
            Vec3::new(0.0, 2.1, 0.0),
        ));
        g.push(
            Part::new(
                PartRole::Label,
                Geometry::Plane {
                    width: 2.0,
                    height: 2.0,
                },
                Material::with_map(LabelTexture::rasterize("D1", 16)),
                Vec3::new(0.0, 0.05, 2.0),
            )
            .rotated_x(-std::f32::consts::FRAC_PI_2),
        );
        g.push(Part::new(
            PartRole::Connector,
            Geometry::Polyline {
                points: vec![Vec3::ZERO, Vec3::Y],
            },
            Material::basic([1.0, 0.0, 0.0]),
            Vec3::ZERO,
        ));
        g
    }

    #[test]
    fn test_resource_count() {
        // 3 parts x (geometry + material) + one texture map
        assert_eq!(sample_group().resource_count(), 7);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut g = sample_group();
        assert_eq!(g.dispose(), 7);
        assert!(g.is_disposed());
        assert_eq!(g.resource_count(), 0);
        assert_eq!(g.dispose(), 0);
    }

    #[test]
    fn test_model_matrix_composes_offset_under_placement() {
        let mut g = VisualGroup::new();
        g.offset = Vec3::new(-50.0, 0.0, 0.0);
        g.place(&Placement {
            position: [-100.0, 0.0, 0.0],
            scale: [2.0, 1.0, 1.0],
        });
        let p = g.model_matrix().transform_point3(Vec3::new(10.0, 1.0, 0.0));
        assert!((p - Vec3::new(-180.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_tessellate_routes_parts() {
        let meshes = sample_group().tessellate();
        assert_eq!(meshes.lit.vertex_count(), 24);
        assert!(meshes.unlit.is_empty());
        assert_eq!(meshes.lines.vertex_count(), 2);
        assert_eq!(meshes.labels.len(), 1);
        assert!(!meshes.is_empty());
    }

    #[test]
    fn test_label_lies_flat() {
        let meshes = sample_group().tessellate();
        let quad = &meshes.labels[0].quad;
        for v in quad.vertices.chunks_exact(mesh::TEXTURED_STRIDE) {
            assert!((v[1] - 0.05).abs() < 1e-5);
        }
    }
}
