use egui::{Pos2, Rect};

/// Where a pointer sample landed, already mapped into a panel's pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position in panel-local pixel coordinates
    pub position: Pos2,
    /// Whether this position is within the panel's pixel bounds
    pub is_in_panel: bool,
}

/// Maps a screen position into a panel's pixel space.
///
/// `display` is the rectangle the panel occupies on screen and `surface_size`
/// its pixel resolution; the panel may be shown scaled. Returns `None` if the
/// display rectangle has no area.
pub fn to_panel_space(screen: Pos2, display: Rect, surface_size: [u32; 2]) -> Option<Pos2> {
    if !(display.width() > 0.0 && display.height() > 0.0) {
        return None;
    }
    let scale_x = surface_size[0] as f32 / display.width();
    let scale_y = surface_size[1] as f32 / display.height();
    Some(Pos2::new(
        (screen.x - display.min.x) * scale_x,
        (screen.y - display.min.y) * scale_y,
    ))
}

/// [`to_panel_space`] plus a bounds check. Samples outside the panel are still
/// reported so a drag leaving the panel keeps drawing up to its edge.
pub fn locate(screen: Pos2, display: Rect, surface_size: [u32; 2]) -> Option<InputLocation> {
    let position = to_panel_space(screen, display, surface_size)?;
    let is_in_panel = position.x >= 0.0
        && position.y >= 0.0
        && position.x < surface_size[0] as f32
        && position.y < surface_size[1] as f32;
    Some(InputLocation {
        position,
        is_in_panel,
    })
}
