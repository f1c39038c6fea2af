// Software drawing on a Frame: lines, rings and a crosshair.
// Everything clips at the frame edge; coordinates far outside the frame are
// simply not drawn.

use crate::types::{Color, Frame, Point};

/// True if a shape reaching `reach` pixels around `p` can touch the frame.
fn near_frame(fb: &Frame, p: Point, reach: i64) -> bool {
    let (x, y) = (p.x as i64, p.y as i64);
    x + reach >= 0
        && y + reach >= 0
        && x - reach < fb.width() as i64
        && y - reach < fb.height() as i64
}

/// Put a pixel if (x,y) is inside the frame. Coordinates are i64 so that
/// brush offsets around extreme points cannot overflow.
#[inline]
fn put_pixel(fb: &mut Frame, x: i64, y: i64, color: Color) {
    if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
        fb.put(x, y, color);
    }
}

/// Filled disc of radius `r` centred at (cx,cy).
fn fill_disc(fb: &mut Frame, cx: i64, cy: i64, r: i64, color: Color) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draw a line between `a` and `b` using Bresenham, stamping a disc brush so
/// the stroke is roughly `thickness` pixels wide.
pub fn draw_line(fb: &mut Frame, a: Point, b: Point, thickness: u32, color: Color) {
    let brush = i64::from(thickness / 2);
    let (x0, y0) = (a.x as i64, a.y as i64);
    let (x1, y1) = (b.x as i64, b.y as i64);

    // both ends on the same outer side: nothing can land inside
    let (w, h) = (fb.width() as i64, fb.height() as i64);
    if x0.max(x1) + brush < 0
        || y0.max(y1) + brush < 0
        || x0.min(x1) - brush >= w
        || y0.min(y1) - brush >= h
    {
        return;
    }

    let (mut x, mut y) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        fill_disc(fb, x, y, brush, color);
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

/// Connect consecutive points with strokes.
pub fn draw_polyline(
    fb: &mut Frame,
    points: impl IntoIterator<Item = Point>,
    thickness: u32,
    color: Color,
) {
    let mut points = points.into_iter();
    let Some(mut prev) = points.next() else { return };
    for p in points {
        draw_line(fb, prev, p, thickness, color);
        prev = p;
    }
}

/// Circle outline of `radius` around `center`, `thickness` pixels wide.
pub fn draw_ring(fb: &mut Frame, center: Point, radius: u32, thickness: u32, color: Color) {
    let half = f64::from(thickness) / 2.0;
    let reach = i64::from(radius) + thickness as i64;
    if !near_frame(fb, center, reach) {
        return;
    }
    let (cx, cy) = (center.x as i64, center.y as i64);
    let radius = f64::from(radius);
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let d = ((dx * dx + dy * dy) as f64).sqrt();
            if (d - radius).abs() <= half {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Small crosshair centred at `center`; the centre pixel itself is set.
pub fn draw_crosshair(fb: &mut Frame, center: Point, size: i32, color: Color) {
    if !near_frame(fb, center, size as i64) {
        return;
    }
    let Point { x: cx, y: cy } = center;
    // arms leave a 1-pixel gap around the centre dot
    draw_line(fb, Point::new(cx - size, cy), Point::new(cx - 2, cy), 1, color);
    draw_line(fb, Point::new(cx + 2, cy), Point::new(cx + size, cy), 1, color);
    draw_line(fb, Point::new(cx, cy - size), Point::new(cx, cy - 2), 1, color);
    draw_line(fb, Point::new(cx, cy + 2), Point::new(cx, cy + size), 1, color);
    put_pixel(fb, cx as i64, cy as i64, color);
}
