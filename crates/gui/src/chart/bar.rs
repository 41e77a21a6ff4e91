//! Bar chart layout: one box per valid row, a date label in front of each,
//! and two axis bars.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use shared::{NormalizedSeries, TabularRecord};

use super::color::{hex_rgb, AXIS, GAIN, LOSS};
use super::group::{Geometry, Material, Part, PartRole, VisualGroup};
use super::label::LabelTexture;

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    /// Height given to the full close-price range
    pub spatial_range: f64,
    pub bar_width: f32,
    pub bar_depth: f32,
    /// Gap between neighbouring bars
    pub gap: f32,
    pub min_height: f32,
    /// Clearance between the bar base and the X axis
    pub lift: f32,
    pub label_size: f32,
    pub label_lift: f32,
    pub label_font_px: u32,
    pub axis_thickness: f32,
    pub min_axis_length: f32,
    pub shininess: f32,
    pub specular: u32,
}

impl Default for BarLayout {
    fn default() -> Self {
        Self {
            spatial_range: 100.0,
            bar_width: 2.0,
            bar_depth: 2.0,
            gap: 1.0,
            min_height: 0.1,
            lift: 0.1,
            label_size: 2.0,
            label_lift: 0.05,
            label_font_px: 48,
            axis_thickness: 0.5,
            min_axis_length: 100.0,
            shininess: 100.0,
            specular: 0x111111,
        }
    }
}

impl BarLayout {
    pub fn pitch(&self) -> f32 {
        self.bar_width + self.gap
    }

    pub fn axis_length(&self, bars: usize) -> f32 {
        (bars as f32 * self.pitch()).max(self.min_axis_length)
    }
}

/// Build the bar group. Rows whose open or close does not parse are skipped
/// and leave a gap: bars sit at their row index. Only the axis length counts
/// valid bars.
pub fn build_bar_group(records: &[TabularRecord], layout: &BarLayout) -> VisualGroup {
    let series = NormalizedSeries::over_valid_rows(records, layout.spatial_range);
    if series.is_degenerate() {
        tracing::debug!("bar closes are flat, every bar gets the minimum height");
    }
    let specular = hex_rgb(layout.specular);
    let mut group = VisualGroup::new();
    let mut bars = 0usize;

    for (row, record) in records.iter().enumerate() {
        let Some((open, close)) = record.prices() else {
            tracing::debug!(date = %record.date, "skipping bar row with unparseable prices");
            continue;
        };

        let height = (series.offset(close) as f32).max(layout.min_height);
        let x = row as f32 * layout.pitch();
        let color = if close > open { hex_rgb(GAIN) } else { hex_rgb(LOSS) };

        group.push(Part::new(
            PartRole::Bar,
            Geometry::Box {
                width: layout.bar_width,
                height,
                depth: layout.bar_depth,
            },
            Material::phong(color, layout.shininess, specular),
            Vec3::new(x, height / 2.0 + layout.lift, 0.0),
        ));

        group.push(
            Part::new(
                PartRole::Label,
                Geometry::Plane {
                    width: layout.label_size,
                    height: layout.label_size,
                },
                Material::with_map(LabelTexture::rasterize(&record.date, layout.label_font_px)),
                Vec3::new(x, layout.label_lift, layout.bar_depth / 2.0 + 1.0),
            )
            .rotated_x(-FRAC_PI_2),
        );

        bars += 1;
    }

    let len = layout.axis_length(bars);
    let t = layout.axis_thickness;
    let half_bar = layout.bar_width / 2.0;

    group.push(Part::new(
        PartRole::Axis,
        Geometry::Box {
            width: len,
            height: t,
            depth: t,
        },
        Material::basic(hex_rgb(AXIS)),
        Vec3::new(len / 2.0 - half_bar, 0.0, 0.0),
    ));
    group.push(Part::new(
        PartRole::Axis,
        Geometry::Box {
            width: t,
            height: len,
            depth: t,
        },
        Material::basic(hex_rgb(AXIS)),
        Vec3::new(-half_bar, len / 2.0, 0.0),
    ));

    group.offset = Vec3::new(-len / 2.0, 0.0, 0.0);
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(&str, &str, &str)]) -> Vec<TabularRecord> {
        data.iter()
            .map(|(d, o, c)| TabularRecord::new(*d, *o, *c))
            .collect()
    }

    fn bar_heights(g: &VisualGroup) -> Vec<f32> {
        g.parts_with(PartRole::Bar)
            .map(|p| match p.geometry {
                Geometry::Box { height, .. } => height,
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_gain_and_loss_bars() {
        let g = build_bar_group(
            &rows(&[("d1", "10", "12"), ("d2", "12", "9")]),
            &BarLayout::default(),
        );
        let bars: Vec<_> = g.parts_with(PartRole::Bar).collect();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].material.color, [0.0, 1.0, 0.0]);
        assert_eq!(bars[1].material.color, [1.0, 0.0, 0.0]);
        let h = bar_heights(&g);
        assert!((h[0] - 100.0).abs() < 1e-4);
        assert!((h[1] - 0.1).abs() < 1e-6);
        assert!((bars[0].position.y - 50.1).abs() < 1e-4);
        assert!((bars[1].position.x - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_equal_open_close_is_loss() {
        let g = build_bar_group(&rows(&[("d1", "5", "5")]), &BarLayout::default());
        let bar = g.parts_with(PartRole::Bar).next().unwrap();
        assert_eq!(bar.material.color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_malformed_row_is_skipped_and_leaves_a_gap() {
        let g = build_bar_group(
            &rows(&[("d1", "10", "12"), ("bad", "abc", "11"), ("d3", "11", "10")]),
            &BarLayout::default(),
        );
        assert_eq!(g.count(PartRole::Bar), 2);
        assert_eq!(g.count(PartRole::Label), 2);
        let xs: Vec<f32> = g.parts_with(PartRole::Bar).map(|p| p.position.x).collect();
        assert_eq!(xs, vec![0.0, 6.0]);
        let labels: Vec<f32> = g.parts_with(PartRole::Label).map(|p| p.position.x).collect();
        assert_eq!(labels, vec![0.0, 6.0]);
    }

    #[test]
    fn test_oversized_date_builds() {
        let g = build_bar_group(
            &[TabularRecord::new("x".repeat(700_000), "10", "12")],
            &BarLayout::default(),
        );
        assert_eq!(g.count(PartRole::Label), 1);
        let label = g.parts_with(PartRole::Label).next().unwrap();
        let map = label.material.map.as_ref().unwrap();
        assert!(map.width <= 32 * 6 * 6);
    }

    #[test]
    fn test_axes_and_offset() {
        let g = build_bar_group(&rows(&[("d1", "1", "2")]), &BarLayout::default());
        let axes: Vec<_> = g.parts_with(PartRole::Axis).collect();
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].position, Vec3::new(49.0, 0.0, 0.0));
        assert_eq!(axes[1].position, Vec3::new(-1.0, 50.0, 0.0));
        assert_eq!(g.offset, Vec3::new(-50.0, 0.0, 0.0));
    }

    #[test]
    fn test_long_series_stretches_axes() {
        let data: Vec<TabularRecord> = (0..40)
            .map(|i| TabularRecord::new(format!("d{i}"), "1", format!("{}", i + 1)))
            .collect();
        let layout = BarLayout::default();
        let g = build_bar_group(&data, &layout);
        assert_eq!(layout.axis_length(40), 120.0);
        assert_eq!(g.offset.x, -60.0);
    }

    #[test]
    fn test_heights_monotonic_and_floored() {
        let g = build_bar_group(
            &rows(&[("a", "1", "3"), ("b", "1", "1"), ("c", "1", "7"), ("d", "1", "5")]),
            &BarLayout::default(),
        );
        let h = bar_heights(&g);
        assert!(h.iter().all(|v| *v >= 0.1));
        assert!(h[1] < h[0] && h[0] < h[3] && h[3] < h[2]);
    }

    #[test]
    fn test_degenerate_series_is_finite() {
        let g = build_bar_group(
            &rows(&[("a", "5", "5"), ("b", "5", "5"), ("c", "5", "5")]),
            &BarLayout::default(),
        );
        assert!(bar_heights(&g).iter().all(|h| (*h - 0.1).abs() < 1e-6));
        assert!(g.parts().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn test_labels_carry_textures() {
        let g = build_bar_group(&rows(&[("2024-01-02", "1", "2")]), &BarLayout::default());
        let label = g.parts_with(PartRole::Label).next().unwrap();
        let map = label.material.map.as_ref().unwrap();
        assert_eq!(map.height, 48);
        assert!(label.material.transparent && label.material.double_sided);
        assert_eq!(label.position, Vec3::new(0.0, 0.05, 2.0));
    }
}
