use crate::borders::{BorderLayer, Marker};
use crate::braille::BrailleCanvas;
use crate::map::geometry::draw_polyline;
use crate::map::projection::Viewport;
use ratatui::style::Color;
use rayon::prelude::*;

/// Fill opacity over the terminal background
pub const FILL_OPACITY: f64 = 0.5;

/// Draw every region ring and line feature as Braille lines
pub fn draw_outlines(canvas: &mut BrailleCanvas, layer: &BorderLayer, viewport: &Viewport) {
    for region in &layer.regions {
        for polygon in &region.polygons {
            for ring in polygon.rings() {
                draw_polyline(canvas, viewport, ring.iter().map(|p| (p.x, p.y)));
            }
        }
    }
    for line in &layer.lines {
        draw_polyline(canvas, viewport, line.iter().map(|p| (p.x, p.y)));
    }
}

/// Character cell (column, row) a marker sits in; may be off-canvas
pub fn marker_cell(marker: &Marker, viewport: &Viewport) -> (i32, i32) {
    let (px, py) = viewport.project(marker.at.x, marker.at.y);
    (px.div_euclid(2), py.div_euclid(4))
}

/// Light all eight dots of each marker's cell
pub fn draw_markers(canvas: &mut BrailleCanvas, layer: &BorderLayer, viewport: &Viewport) {
    for marker in &layer.markers {
        let (cx, cy) = marker_cell(marker, viewport);
        for dy in 0..4 {
            for dx in 0..2 {
                canvas.set_pixel_signed(cx * 2 + dx, cy * 4 + dy);
            }
        }
    }
}

/// Background colour per character cell, row-major.
/// A cell takes the fill of the region under its centre.
pub fn fill_cells(layer: &BorderLayer, viewport: &Viewport, cols: usize, rows: usize) -> Vec<Option<Color>> {
    (0..rows)
        .into_par_iter()
        .flat_map_iter(|row| {
            (0..cols).map(move |col| {
                let (lon, lat) = viewport.cell_center(col, row);
                layer
                    .region_at(lon, lat)
                    .map(|region| region.fill.blended(FILL_OPACITY))
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
struct FillKey {
    center_lon: f64,
    center_lat: f64,
    zoom: f64,
    cols: usize,
    rows: usize,
    generation: Option<u64>,
}

/// Cell fills for the last (viewport, layer) pair; point-in-polygon for
/// every cell is too slow to redo at frame rate
#[derive(Default)]
pub struct FillCache {
    key: Option<FillKey>,
    cols: usize,
    cells: Vec<Option<Color>>,
}

impl FillCache {
    /// Recompute if the view or the installed layer changed.
    /// Returns true when a recompute happened.
    pub fn refresh(&mut self, layer: Option<&BorderLayer>, viewport: &Viewport, cols: usize, rows: usize) -> bool {
        let key = FillKey {
            center_lon: viewport.center_lon,
            center_lat: viewport.center_lat,
            zoom: viewport.zoom,
            cols,
            rows,
            generation: layer.map(|l| l.generation),
        };
        if self.key.as_ref() == Some(&key) {
            return false;
        }

        self.cells = match layer {
            Some(layer) => fill_cells(layer, viewport, cols, rows),
            None => Vec::new(),
        };
        self.cols = cols;
        self.key = Some(key);
        true
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Color> {
        if col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borders::{Region, Polygon};
    use crate::colour::name_to_colour;
    use crate::map::BBox;
    use crate::years::Year;
    use glam::DVec2;

    fn block(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
        let exterior = vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
            DVec2::new(x0, y0),
        ];
        Region {
            name: Some(name.to_string()),
            label: Some(name.to_string()),
            fill: name_to_colour(Some(name)),
            bbox: BBox::of_points(&exterior),
            polygons: vec![Polygon { exterior, holes: Vec::new() }],
        }
    }

    fn layer(generation: u64) -> BorderLayer {
        BorderLayer::new(Year(100), generation, vec![block("West", -90.0, -60.0, 0.0, 60.0)])
    }

    fn carthage() -> Marker {
        Marker {
            label: Some("Carthage".to_string()),
            at: DVec2::new(10.0, 36.8),
        }
    }

    #[test]
    fn test_fill_cells_left_half() {
        // 20x10 cells, whole world across the width, centred on 0,0
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let fills = fill_cells(&layer(1), &vp, 20, 10);
        assert_eq!(fills.len(), 200);

        let expected = name_to_colour(Some("West")).blended(FILL_OPACITY);
        // Row 5 sits on the equator; columns 5..10 span 90W..0
        assert_eq!(fills[5 * 20 + 7], Some(expected));
        assert_eq!(fills[5 * 20 + 15], None);
    }

    #[test]
    fn test_cache_recomputes_on_change_only() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let first = layer(1);
        let mut cache = FillCache::default();

        assert!(cache.refresh(Some(&first), &vp, 20, 10));
        assert!(!cache.refresh(Some(&first), &vp, 20, 10));
        assert!(cache.get(7, 5).is_some());
        assert_eq!(cache.get(99, 0), None);

        let second = layer(2);
        assert!(cache.refresh(Some(&second), &vp, 20, 10));
        assert!(cache.refresh(None, &vp, 20, 10));
        assert_eq!(cache.get(7, 5), None);
    }

    #[test]
    fn test_outlines_drawn() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_outlines(&mut canvas, &layer(1), &vp);
        assert!(canvas.lit_cells().count() > 0);
    }

    #[test]
    fn test_lines_drawn_without_regions() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let mut empty = BorderLayer::new(Year(100), 1, Vec::new());
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_outlines(&mut canvas, &empty, &vp);
        assert_eq!(canvas.lit_cells().count(), 0);

        empty.lines.push(vec![DVec2::new(-90.0, 0.0), DVec2::new(90.0, 0.0)]);
        draw_outlines(&mut canvas, &empty, &vp);
        assert!(canvas.lit_cells().count() >= 9);
    }

    #[test]
    fn test_marker_fills_its_cell() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let mut layer = layer(1);
        layer.markers.push(carthage());

        let (col, row) = marker_cell(&layer.markers[0], &vp);
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_markers(&mut canvas, &layer, &vp);

        assert_eq!(canvas.bits(col as usize, row as usize), 0xff);
        assert_eq!(canvas.lit_cells().count(), 1);
    }

    #[test]
    fn test_offscreen_marker_ignored() {
        let vp = Viewport::new(0.0, 0.0, 8.0, 40, 40);
        let mut layer = layer(1);
        layer.markers.push(Marker {
            label: None,
            at: DVec2::new(150.0, -40.0),
        });
        let mut canvas = BrailleCanvas::new(20, 10);
        draw_markers(&mut canvas, &layer, &vp);
        assert_eq!(canvas.lit_cells().count(), 0);
    }
}
