use egui::{Pos2, Rect};
use std::f32::consts::FRAC_1_SQRT_2;

use crate::surface::RasterSurface;
use crate::tools::{Tool, ToolMode};

/// Distance from a point to a line segment; degenerates to point distance when
/// both ends coincide.
pub(crate) fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len_sq = line_vec.length_sq();
    if line_len_sq == 0.0 {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = line_start + line_vec * t;
    (point - projection).length()
}

/// Bounding box of a segment padded by the stroke radius
pub(crate) fn segment_bounds(from: Pos2, to: Pos2, radius: f32) -> Rect {
    Rect::from_two_pos(from, to).expand(radius)
}

/// Renders one round-capped segment of `tool.width()` between two points.
///
/// `from == to` draws a dot. Fill mode never reaches this function through a
/// panel; if it does, nothing is drawn. Pixels are covered when their centre
/// lies within the stroke radius, so every pixel is touched at most once per
/// call and a marker segment composites exactly once over existing content.
pub fn render_segment(surface: &mut RasterSurface, from: Pos2, to: Pos2, tool: &Tool) {
    if tool.mode() == ToolMode::Fill {
        log::debug!("Fill tool routed to the stroke renderer; ignoring");
        return;
    }
    if !from.is_finite() || !to.is_finite() {
        return;
    }

    // A hair-thin stroke still covers the pixel under the point
    let radius = (tool.width() / 2.0).max(FRAC_1_SQRT_2);
    let color = tool.paint_color();
    let opacity = tool.paint_opacity();

    let bounds = segment_bounds(from, to, radius);
    let min_x = bounds.min.x.floor().max(0.0) as i64;
    let min_y = bounds.min.y.floor().max(0.0) as i64;
    let max_x = (bounds.max.x.ceil() as i64).min(i64::from(surface.width()) - 1);
    let max_y = (bounds.max.y.ceil() as i64).min(i64::from(surface.height()) - 1);
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_line_segment(center, from, to) <= radius {
                surface.blend_pixel(x as u32, y as u32, color, opacity);
            }
        }
    }
}

/// An in-progress drag gesture on one panel.
///
/// The tool is captured when the gesture begins so a tool change mid-drag
/// does not alter the stroke being drawn.
#[derive(Debug, Clone)]
pub struct StrokeSession {
    tool: Tool,
    last: Pos2,
    segments: usize,
}

impl StrokeSession {
    /// Starts a gesture and draws the initial dot
    pub fn begin(surface: &mut RasterSurface, point: Pos2, tool: Tool) -> Self {
        render_segment(surface, point, point, &tool);
        Self {
            tool,
            last: point,
            segments: 1,
        }
    }

    /// Draws from the previous sample to `point`
    pub fn extend(&mut self, surface: &mut RasterSurface, point: Pos2) {
        render_segment(surface, self.last, point, &self.tool);
        self.last = point;
        self.segments += 1;
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn last_point(&self) -> Pos2 {
        self.last
    }

    /// Renderer calls made so far, the initial dot included
    pub fn segments(&self) -> usize {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BACKGROUND;
    use egui::Color32;
    use image::Rgba;

    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn pen(width: f32) -> Tool {
        let mut tool = Tool::new(ToolMode::Pen, Color32::BLACK);
        tool.set_width(width);
        tool
    }

    #[test]
    fn test_distance_to_line_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_line_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_line_segment(Pos2::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_line_segment(Pos2::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_dot_is_filled_circle_of_tool_width() {
        let mut surface = RasterSurface::new(40, 40);
        let p = Pos2::new(20.0, 20.0);
        render_segment(&mut surface, p, p, &pen(10.0));

        // Row through the centre spans exactly the diameter
        let painted: Vec<u32> = (0..40)
            .filter(|&x| surface.get_pixel(x, 20) == Some(INK))
            .collect();
        assert_eq!(painted.first(), Some(&15));
        assert_eq!(painted.last(), Some(&24));
        assert_eq!(painted.len(), 10);

        // Corners of the bounding square stay white
        assert_eq!(surface.get_pixel(15, 15), Some(BACKGROUND));
        assert_eq!(surface.get_pixel(24, 24), Some(BACKGROUND));
    }

    #[test]
    fn test_thin_dot_still_marks_a_pixel() {
        let mut surface = RasterSurface::new(10, 10);
        let p = Pos2::new(3.9, 3.9);
        render_segment(&mut surface, p, p, &pen(1.0));
        assert_eq!(surface.get_pixel(3, 3), Some(INK));
    }

    #[test]
    fn test_segment_covers_line() {
        let mut surface = RasterSurface::new(50, 20);
        render_segment(&mut surface, Pos2::new(5.0, 10.0), Pos2::new(45.0, 10.0), &pen(4.0));
        for x in 5..45 {
            assert_eq!(surface.get_pixel(x, 10), Some(INK), "x = {x}");
        }
        assert_eq!(surface.get_pixel(25, 2), Some(BACKGROUND));
    }

    #[test]
    fn test_segment_outside_surface_is_clipped() {
        let mut surface = RasterSurface::new(10, 10);
        render_segment(&mut surface, Pos2::new(-50.0, -50.0), Pos2::new(-20.0, -20.0), &pen(5.0));
        assert!(surface.pixels().iter().all(|&b| b == 255));

        render_segment(&mut surface, Pos2::new(-5.0, 5.0), Pos2::new(15.0, 5.0), &pen(2.0));
        assert_eq!(surface.get_pixel(0, 5), Some(INK));
        assert_eq!(surface.get_pixel(9, 5), Some(INK));
    }

    #[test]
    fn test_marker_darkens_where_strokes_overlap() {
        let mut surface = RasterSurface::new(30, 30);
        let marker = Tool::new(ToolMode::Marker, Color32::BLACK);
        let p = Pos2::new(15.0, 15.0);

        render_segment(&mut surface, p, p, &marker);
        let once = surface.get_pixel(15, 15).unwrap();
        assert_eq!(once, Rgba([128, 128, 128, 255]));

        render_segment(&mut surface, p, p, &marker);
        let twice = surface.get_pixel(15, 15).unwrap();
        assert!(twice.0[0] < once.0[0]);
        assert_eq!(twice.0[3], 255);
    }

    #[test]
    fn test_eraser_only_writes_background() {
        let mut surface = RasterSurface::new(30, 30);
        render_segment(&mut surface, Pos2::new(0.0, 0.0), Pos2::new(30.0, 30.0), &pen(8.0));

        let eraser = Tool::new(ToolMode::Eraser, Color32::from_rgb(255, 0, 0));
        let before = surface.snapshot();
        render_segment(&mut surface, Pos2::new(0.0, 15.0), Pos2::new(30.0, 15.0), &eraser);

        for (old, new) in before.pixels().chunks(4).zip(surface.pixels().chunks(4)) {
            if old != new {
                assert_eq!(new, &BACKGROUND.0);
            }
        }
        assert_eq!(surface.get_pixel(15, 15), Some(BACKGROUND));
    }

    #[test]
    fn test_fill_mode_draws_nothing() {
        let mut surface = RasterSurface::new(10, 10);
        let fill = Tool::new(ToolMode::Fill, Color32::BLACK);
        render_segment(&mut surface, Pos2::new(5.0, 5.0), Pos2::new(5.0, 5.0), &fill);
        assert!(surface.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_session_tracks_last_point() {
        let mut surface = RasterSurface::new(20, 20);
        let mut session = StrokeSession::begin(&mut surface, Pos2::new(2.0, 2.0), pen(2.0));
        session.extend(&mut surface, Pos2::new(10.0, 2.0));
        session.extend(&mut surface, Pos2::new(10.0, 10.0));
        assert_eq!(session.last_point(), Pos2::new(10.0, 10.0));
        assert_eq!(session.segments(), 3);
        assert_eq!(surface.get_pixel(10, 6), Some(INK));
    }
}
