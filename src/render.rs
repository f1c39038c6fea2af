//! Overlay drawn on every frame: the guidance curve, the control point
//! markers and the target marker. Later draws cover earlier ones, so the
//! target always ends up on top.

use crate::draw::{draw_crosshair, draw_polyline, draw_ring};
use crate::spline::Spline;
use crate::target::TargetPoint;
use crate::types::{Color, Frame};

pub const CURVE_COLOR: Color = Color::bgr(255, 255, 0);
pub const ENDPOINT_COLOR: Color = Color::bgr(0, 0, 255);
pub const WAYPOINT_COLOR: Color = Color::bgr(255, 0, 0);
pub const TARGET_COLOR: Color = Color::bgr(0, 255, 0);

const CURVE_THICKNESS: u32 = 3;
const MARKER_RADIUS: u32 = 10;
const MARKER_THICKNESS: u32 = 3;
const TARGET_CROSSHAIR: i32 = 6;

pub struct Overlay {
    spline: Spline,
}

impl Overlay {
    pub fn new(spline: Spline) -> Self {
        Self { spline }
    }

    /// Draw the overlay into `frame` in place.
    pub fn render(&self, frame: &mut Frame, target: TargetPoint) {
        draw_polyline(frame, self.spline.polyline(), CURVE_THICKNESS, CURVE_COLOR);

        let points = self.spline.points();
        let last = points.len() - 1;
        for (i, &p) in points.iter().enumerate() {
            let color = if i == 0 || i == last { ENDPOINT_COLOR } else { WAYPOINT_COLOR };
            draw_ring(frame, p, MARKER_RADIUS, MARKER_THICKNESS, color);
        }

        draw_ring(frame, target, MARKER_RADIUS, MARKER_THICKNESS, TARGET_COLOR);
        draw_crosshair(frame, target, TARGET_CROSSHAIR, TARGET_COLOR);
    }
}
