use crate::braille::BrailleCanvas;
use crate::map::projection::Viewport;

/// Bresenham line between two pixels
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Project and draw a lon/lat polyline.
///
/// Segments longer than the viewport width are skipped: they are
/// antimeridian jumps, not real edges.
pub fn draw_polyline<I>(canvas: &mut BrailleCanvas, viewport: &Viewport, points: I)
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut prev: Option<(i32, i32)> = None;

    for (lon, lat) in points {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}
