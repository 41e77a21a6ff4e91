//! Line chart layout: a marker per row on a polyline, with vertical
//! connectors down to the X axis.

use glam::Vec3;
use shared::{NormalizedSeries, TabularRecord};

use super::color::{hex_rgb, hsl_to_rgb, AXIS, GAIN};
use super::group::{Geometry, Material, Part, PartRole, VisualGroup};

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Horizontal extent, centered on the origin
    pub span: f32,
    /// Height given to the full close-price range
    pub spatial_range: f64,
    pub marker_radius: f32,
    pub marker_segments: u32,
    pub rise_hue: f32,
    pub fall_hue: f32,
    pub axis_length: f32,
    pub axis_thickness: f32,
    pub shininess: f32,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            span: 180.0,
            spatial_range: 100.0,
            marker_radius: 0.5,
            marker_segments: 32,
            rise_hue: 0.3,
            fall_hue: 0.0,
            axis_length: 200.0,
            axis_thickness: 0.5,
            shininess: 30.0,
        }
    }
}

impl LineLayout {
    fn x_at(&self, index: usize, rows: usize) -> f32 {
        if rows < 2 {
            return 0.0;
        }
        index as f32 * self.span / (rows - 1) as f32 - self.span / 2.0
    }
}

/// Build the line group. Every row gets a point; a row whose close does not
/// parse sits at height 0. The range covers every parseable close.
pub fn build_line_group(records: &[TabularRecord], layout: &LineLayout) -> VisualGroup {
    let series = NormalizedSeries::over_all_closes(records, layout.spatial_range);
    if series.is_degenerate() {
        tracing::debug!("line closes are flat, markers stay on the baseline");
    }
    let mut group = VisualGroup::new();
    let mut points = Vec::with_capacity(records.len());
    let mut previous: Option<f64> = None;

    for (i, record) in records.iter().enumerate() {
        let close = record.close_value();
        let x = layout.x_at(i, records.len());
        let y = close.map_or(0.0, |c| series.offset(c) as f32);
        let point = Vec3::new(x, y, 0.0);

        let falling = matches!((previous, close), (Some(prev), Some(cur)) if cur - prev < 0.0);
        let hue = if falling { layout.fall_hue } else { layout.rise_hue };
        let color = hsl_to_rgb(hue, 1.0, 0.5);

        group.push(Part::new(
            PartRole::Marker,
            Geometry::Sphere {
                radius: layout.marker_radius,
                segments: layout.marker_segments,
            },
            Material::phong(color, layout.shininess, hex_rgb(0x111111)),
            point,
        ));
        group.push(Part::new(
            PartRole::Connector,
            Geometry::Polyline {
                points: vec![Vec3::new(x, 0.0, 0.0), point],
            },
            Material::basic(color),
            Vec3::ZERO,
        ));

        points.push(point);
        previous = close;
    }

    if !points.is_empty() {
        group.push(Part::new(
            PartRole::Polyline,
            Geometry::Polyline { points },
            Material::basic(hex_rgb(GAIN)),
            Vec3::ZERO,
        ));
    }

    let len = layout.axis_length;
    let t = layout.axis_thickness;
    group.push(Part::new(
        PartRole::Axis,
        Geometry::Box {
            width: len,
            height: t,
            depth: t,
        },
        Material::basic(hex_rgb(AXIS)),
        Vec3::ZERO,
    ));
    group.push(Part::new(
        PartRole::Axis,
        Geometry::Box {
            width: t,
            height: len,
            depth: t,
        },
        Material::basic(hex_rgb(AXIS)),
        Vec3::new(-len / 2.0, len / 2.0, 0.0),
    ));

    group
}
