//! Software rendering for the viewport when no GL context is available
//!
//! Projects chart triangles through the camera and paints them back to
//! front with egui's painter. No depth buffer, no labels.

use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Stroke, Ui};
use glam::Vec3;

use stockwalk_lib::chart::GroupMeshes;
use stockwalk_lib::i18n::t;

use super::camera::FirstPersonCamera;
use super::mesh::{MeshData, LINE_STRIDE, MESH_STRIDE};

struct Triangle {
    depth: f32,
    points: [Pos2; 3],
    color: Color32,
}

/// Paint the 3D viewport using egui's painter
pub fn paint_viewport<'a>(
    ui: &Ui,
    rect: Rect,
    camera: &FirstPersonCamera,
    groups: impl Iterator<Item = &'a Arc<GroupMeshes>>,
) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::BLACK);

    let size = [rect.width(), rect.height()];
    let view = camera.view_matrix();
    let light = Vec3::ONE.normalize();
    let to_screen = |p: Vec3| {
        camera
            .project(p, size)
            .map(|[x, y]| Pos2::new(rect.min.x + x, rect.min.y + y))
    };

    let mut triangles = Vec::new();
    let mut segments = Vec::new();

    for group in groups {
        for (mesh, lit) in [(&group.lit, true), (&group.unlit, false)] {
            collect_triangles(mesh, lit, &group.model, &view, light, &to_screen, &mut triangles);
        }

        for seg in group.lines.vertices.chunks_exact(LINE_STRIDE * 2) {
            let a = group.model.transform_point3(Vec3::new(seg[0], seg[1], seg[2]));
            let b = group.model.transform_point3(Vec3::new(seg[7], seg[8], seg[9]));
            if let (Some(pa), Some(pb)) = (to_screen(a), to_screen(b)) {
                segments.push(([pa, pb], color32(&seg[3..6], 1.0)));
            }
        }
    }

    // Back to front
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let mut mesh = egui::Mesh::default();
    for tri in &triangles {
        let base = mesh.vertices.len() as u32;
        for p in tri.points {
            mesh.colored_vertex(p, tri.color);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    painter.add(egui::Shape::mesh(mesh));

    for (points, color) in segments {
        painter.line_segment(points, Stroke::new(1.0, color));
    }

    painter.text(
        rect.right_top() + egui::vec2(-10.0, 10.0),
        egui::Align2::RIGHT_TOP,
        t("debug.gl_unavailable"),
        egui::FontId::proportional(12.0),
        Color32::from_rgb(200, 120, 120),
    );
}

fn collect_triangles(
    mesh: &MeshData,
    lit: bool,
    model: &glam::Mat4,
    view: &glam::Mat4,
    light: Vec3,
    to_screen: &impl Fn(Vec3) -> Option<Pos2>,
    out: &mut Vec<Triangle>,
) {
    let vertex = |i: u32| {
        let base = i as usize * MESH_STRIDE;
        mesh.vertices.get(base..base + MESH_STRIDE)
    };

    for tri in mesh.indices.chunks_exact(3) {
        let (Some(v0), Some(v1), Some(v2)) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2])) else {
            continue;
        };
        let world = [v0, v1, v2].map(|v| model.transform_point3(Vec3::new(v[0], v[1], v[2])));
        let (Some(a), Some(b), Some(c)) = (to_screen(world[0]), to_screen(world[1]), to_screen(world[2])) else {
            continue;
        };

        let depth = world
            .iter()
            .map(|p| -view.transform_point3(*p).z)
            .sum::<f32>()
            / 3.0;
        let shade = if lit {
            let n = model
                .transform_vector3(Vec3::new(v0[3], v0[4], v0[5]))
                .normalize_or_zero();
            0.25 + 0.5 * n.dot(light).max(0.0)
        } else {
            1.0
        };

        out.push(Triangle {
            depth,
            points: [a, b, c],
            color: color32(&v0[6..9], shade),
        });
    }
}

fn color32(rgb: &[f32], shade: f32) -> Color32 {
    let c = |v: f32| ((v * shade).clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgb(c(rgb[0]), c(rgb[1]), c(rgb[2]))
}
