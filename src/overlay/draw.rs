//! Rasterization primitives on RGBA buffers
//!
//! Everything clips silently at the raster edge.

use image::{Rgba, RgbaImage};

/// Width of a marker triangle's base, in pixels
pub const MARKER_WIDTH: i64 = 18;
/// Height of a marker triangle, in pixels
pub const MARKER_HEIGHT: i64 = 22;

const GLYPH_ADVANCE: i64 = 6;
const GLYPH_ROWS: i64 = 7;

pub(crate) fn put(image: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < image.width() as i64 && y < image.height() as i64 {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_block(image: &mut RgbaImage, left: i64, top: i64, size: i64, color: Rgba<u8>) {
    for y in top..top + size {
        for x in left..left + size {
            put(image, x, y, color);
        }
    }
}

/// Upward-pointing triangle whose 18 px base is centred on the anchor and
/// whose apex sits 22 px above it
pub(crate) fn fill_marker(image: &mut RgbaImage, anchor: (i64, i64), color: Rgba<u8>) {
    let (ax, ay) = anchor;
    if ax < -MARKER_WIDTH
        || ax > image.width() as i64 + MARKER_WIDTH
        || ay < 0
        || ay > image.height() as i64 + MARKER_HEIGHT
    {
        return;
    }
    let half_base = MARKER_WIDTH as f64 / 2.0;

    for row in 0..=MARKER_HEIGHT {
        let half = (half_base * row as f64 / MARKER_HEIGHT as f64).round() as i64;
        let y = ay - MARKER_HEIGHT + row;
        for x in ax - half..=ax + half {
            put(image, x, y, color);
        }
    }
}

/// Even-odd scanline fill, sampling at pixel centres
pub(crate) fn fill_polygon(image: &mut RgbaImage, vertices: &[(f64, f64)], color: Rgba<u8>) {
    if vertices.len() < 3 {
        return;
    }

    let ymin = vertices.iter().map(|v| v.1).fold(f64::INFINITY, f64::min);
    let ymax = vertices.iter().map(|v| v.1).fold(f64::NEG_INFINITY, f64::max);
    let top = (ymin.floor() as i64).max(0);
    let bottom = (ymax.ceil() as i64).min(image.height() as i64 - 1);

    let mut crossings = Vec::with_capacity(vertices.len());
    for py in top..=bottom {
        let yc = py as f64 + 0.5;
        crossings.clear();

        for i in 0..vertices.len() {
            let (x1, y1) = vertices[i];
            let (x2, y2) = vertices[(i + 1) % vertices.len()];
            if (y1 <= yc && yc < y2) || (y2 <= yc && yc < y1) {
                crossings.push(x1 + (yc - y1) * (x2 - x1) / (y2 - y1));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // pixel px is covered when its centre px + 0.5 lies in [start, end)
            let start = (span[0] - 0.5).ceil() as i64;
            let end = (span[1] - 0.5).ceil() as i64;
            for px in start.max(0)..end.min(image.width() as i64) {
                put(image, px, py, color);
            }
        }
    }
}

/// Liang-Barsky clip of a segment to `[xmin, xmax] x [ymin, ymax]`.
///
/// Returns `None` when the segment misses the window or is not finite.
/// Endpoints are clamped to the window to absorb rounding on very long
/// segments.
fn clip_segment(
    from: (f64, f64),
    to: (f64, f64),
    (xmin, ymin, xmax, ymax): (f64, f64, f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if ![from.0, from.1, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, from.0 - xmin),
        (dx, xmax - from.0),
        (-dy, from.1 - ymin),
        (dy, ymax - from.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else if r < t0 {
            return None;
        } else {
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        (
            (from.0 + t * dx).clamp(xmin, xmax),
            (from.1 + t * dy).clamp(ymin, ymax),
        )
    };
    Some((at(t0), at(t1)))
}

/// Bresenham line stamped with a square pen.
///
/// The segment is clipped to the raster, widened by the pen, before it is
/// rounded to pixels, so far off-raster vertices cost nothing.
pub(crate) fn draw_line(
    image: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    thickness: i64,
    color: Rgba<u8>,
) {
    let margin = thickness.max(1) as f64;
    let window = (
        -margin,
        -margin,
        image.width() as f64 + margin,
        image.height() as f64 + margin,
    );
    let Some((from, to)) = clip_segment(from, to, window) else {
        return;
    };

    let (mut x, mut y) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let offset = thickness / 2;

    loop {
        fill_block(image, x - offset, y - offset, thickness.max(1), color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Closed outline through the vertices
pub(crate) fn stroke_polygon(
    image: &mut RgbaImage,
    vertices: &[(f64, f64)],
    thickness: i64,
    color: Rgba<u8>,
) {
    for i in 0..vertices.len() {
        draw_line(image, vertices[i], vertices[(i + 1) % vertices.len()], thickness, color);
    }
}

/// Open polyline through the points
pub(crate) fn stroke_polyline(
    image: &mut RgbaImage,
    points: &[(f64, f64)],
    thickness: i64,
    color: Rgba<u8>,
) {
    for pair in points.windows(2) {
        draw_line(image, pair[0], pair[1], thickness, color);
    }
}

/// Bitmap text centred on `center`, each font pixel drawn as a `scale` square
pub(crate) fn draw_text_centered(
    image: &mut RgbaImage,
    center: (f64, f64),
    text: &str,
    scale: i64,
    color: Rgba<u8>,
) {
    let chars = text.chars().count() as i64;
    if chars == 0 {
        return;
    }
    let width = (chars * GLYPH_ADVANCE - 1) * scale;
    let height = GLYPH_ROWS * scale;
    let reach_x = (image.width() as i64 + width) as f64;
    let reach_y = (image.height() as i64 + height) as f64;
    let near = center.0.abs() <= reach_x && center.1.abs() <= reach_y;
    if !near {
        return;
    }
    let mut left = (center.0 - width as f64 / 2.0).round() as i64;
    let top = (center.1 - height as f64 / 2.0).round() as i64;

    for ch in text.chars() {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..5 {
                    if (pattern >> (4 - col)) & 1 == 1 {
                        fill_block(
                            image,
                            left + col * scale,
                            top + row as i64 * scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
        left += GLYPH_ADVANCE * scale;
    }
}

fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    match ch {
        '0' => Some([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => Some([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => Some([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => Some([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => Some([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const INK: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, BLACK)
    }

    #[test]
    fn test_marker_shape() {
        let mut img = canvas(60, 60);
        fill_marker(&mut img, (30, 40), INK);

        // base row spans 18 px centred on the anchor
        assert_eq!(*img.get_pixel(21, 40), INK);
        assert_eq!(*img.get_pixel(39, 40), INK);
        assert_eq!(*img.get_pixel(20, 40), BLACK);
        assert_eq!(*img.get_pixel(40, 40), BLACK);
        // apex 22 px up
        assert_eq!(*img.get_pixel(30, 18), INK);
        assert_eq!(*img.get_pixel(30, 17), BLACK);
        assert_eq!(*img.get_pixel(25, 18), BLACK);
        // nothing below the anchor
        assert_eq!(*img.get_pixel(30, 41), BLACK);
    }

    #[test]
    fn test_marker_clips_at_edge() {
        let mut img = canvas(10, 10);
        fill_marker(&mut img, (0, 5), INK);
        assert_eq!(*img.get_pixel(0, 5), INK);
    }

    #[test]
    fn test_fill_square() {
        let mut img = canvas(20, 20);
        fill_polygon(&mut img, &[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)], INK);

        assert_eq!(*img.get_pixel(5, 5), INK);
        assert_eq!(*img.get_pixel(14, 14), INK);
        assert_eq!(*img.get_pixel(15, 10), BLACK);
        assert_eq!(*img.get_pixel(10, 15), BLACK);
        assert_eq!(*img.get_pixel(4, 10), BLACK);
        let filled = img.pixels().filter(|p| **p == INK).count();
        assert_eq!(filled, 100);
    }

    #[test]
    fn test_fill_skips_degenerate() {
        let mut img = canvas(10, 10);
        fill_polygon(&mut img, &[(0.0, 0.0), (9.0, 9.0)], INK);
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_line_thickness() {
        let mut img = canvas(20, 20);
        draw_line(&mut img, (2.0, 10.0), (17.0, 10.0), 2, INK);
        assert_eq!(*img.get_pixel(10, 10), INK);
        assert_eq!(*img.get_pixel(10, 9), INK);
        assert_eq!(*img.get_pixel(10, 11), BLACK);
        assert_eq!(*img.get_pixel(10, 8), BLACK);
    }

    #[test]
    fn test_diagonal_line_reaches_end() {
        let mut img = canvas(20, 20);
        draw_line(&mut img, (1.0, 1.0), (18.0, 12.0), 1, INK);
        assert_eq!(*img.get_pixel(1, 1), INK);
        assert_eq!(*img.get_pixel(18, 12), INK);
    }

    #[test]
    fn test_line_to_distant_vertex_is_clipped() {
        let mut img = canvas(20, 20);
        draw_line(&mut img, (5.0, 10.0), (1.5e19, 10.0), 1, INK);
        assert_eq!(*img.get_pixel(5, 10), INK);
        assert_eq!(*img.get_pixel(19, 10), INK);
        assert_eq!(*img.get_pixel(4, 10), BLACK);
        assert_eq!(*img.get_pixel(10, 11), BLACK);
    }

    #[test]
    fn test_line_entirely_off_raster_draws_nothing() {
        let mut img = canvas(20, 20);
        draw_line(&mut img, (-1e12, -50.0), (1e12, -50.0), 3, INK);
        draw_line(&mut img, (f64::NAN, 3.0), (10.0, 3.0), 1, INK);
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_clip_segment_keeps_inside_part() {
        let clipped = clip_segment((-10.0, 5.0), (30.0, 5.0), (0.0, 0.0, 20.0, 20.0));
        assert_eq!(clipped, Some(((0.0, 5.0), (20.0, 5.0))));
        assert_eq!(clip_segment((25.0, 0.0), (40.0, 10.0), (0.0, 0.0, 20.0, 20.0)), None);
    }

    #[test]
    fn test_far_text_and_marker_are_skipped() {
        let mut img = canvas(20, 20);
        draw_text_centered(&mut img, (1e30, 10.0), "12", 2, INK);
        fill_marker(&mut img, (i64::MAX, i64::MIN), INK);
        assert!(img.pixels().all(|p| *p == BLACK));
    }

    #[test]
    fn test_text_centred() {
        let mut img = canvas(40, 40);
        draw_text_centered(&mut img, (20.0, 20.0), "1", 2, INK);

        // '1' is a vertical stroke through the middle column
        assert_eq!(*img.get_pixel(20, 20), INK);
        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == INK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(inked.iter().all(|&(x, y)| (14..26).contains(&x) && (13..27).contains(&y)));
    }
}
