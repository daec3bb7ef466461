use comic_canvas::panel::Panel;
use comic_canvas::story::StoryBeat;
use comic_canvas::surface::BACKGROUND;
use comic_canvas::tools::{Tool, ToolMode};
use egui::{Color32, Pos2};

fn create_test_panel() -> Panel {
    let _ = env_logger::builder().is_test(true).try_init();
    Panel::new(1, StoryBeat::new("A quiet morning", "A cat on a windowsill"), 64, 64)
}

fn draw_line(panel: &mut Panel, tool: &Tool, from: Pos2, to: Pos2) {
    panel.begin_stroke(from, tool);
    let steps = 8;
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        panel.continue_stroke(from.lerp(to, t));
    }
    panel.end_stroke();
}

fn is_blank(panel: &Panel) -> bool {
    panel.surface().pixels().iter().all(|&b| b == 255)
}

#[test]
fn test_undo_all_actions_returns_to_blank() {
    let mut panel = create_test_panel();
    let pen = Tool::new(ToolMode::Pen, Color32::RED);
    let marker = Tool::new(ToolMode::Marker, Color32::BLUE);

    draw_line(&mut panel, &pen, Pos2::new(5.0, 5.0), Pos2::new(60.0, 5.0));
    draw_line(&mut panel, &marker, Pos2::new(5.0, 30.0), Pos2::new(60.0, 30.0));
    panel.fill_at(Pos2::new(40.0, 50.0), Color32::YELLOW);
    assert_eq!(panel.history().len(), 4);

    for _ in 0..3 {
        assert!(panel.undo());
    }
    assert!(is_blank(&panel));
    assert!(!panel.undo());
    assert!(is_blank(&panel));
}

#[test]
fn test_undo_then_redo_replays_every_state() {
    let mut panel = create_test_panel();
    let pen = Tool::new(ToolMode::Pen, Color32::from_rgb(20, 40, 160));

    // State after each of five strokes, blank first
    let mut states = vec![panel.surface().snapshot()];
    for i in 0..5 {
        let y = 6.0 + i as f32 * 12.0;
        draw_line(&mut panel, &pen, Pos2::new(4.0, y), Pos2::new(60.0, y));
        states.push(panel.surface().snapshot());
    }

    for expected in states.iter().rev().skip(1) {
        assert!(panel.undo());
        assert_eq!(panel.surface().pixels(), expected.pixels());
    }
    assert!(!panel.can_undo());

    for expected in states.iter().skip(1) {
        assert!(panel.redo());
        assert_eq!(panel.surface().pixels(), expected.pixels());
    }
    assert!(!panel.can_redo());
}

#[test]
fn test_redo_restores_and_new_action_discards_redo() {
    let mut panel = create_test_panel();
    let pen = Tool::new(ToolMode::Pen, Color32::BLACK);

    draw_line(&mut panel, &pen, Pos2::new(5.0, 10.0), Pos2::new(60.0, 10.0));
    let first = panel.surface().snapshot();
    draw_line(&mut panel, &pen, Pos2::new(5.0, 40.0), Pos2::new(60.0, 40.0));
    let second = panel.surface().snapshot();

    panel.undo();
    assert_eq!(panel.surface().pixels(), first.pixels());
    panel.redo();
    assert_eq!(panel.surface().pixels(), second.pixels());

    panel.undo();
    draw_line(&mut panel, &pen, Pos2::new(30.0, 0.0), Pos2::new(30.0, 63.0));
    assert!(!panel.can_redo());
    assert!(!panel.redo());
    assert_eq!(panel.history().len(), 3);
}

#[test]
fn test_eraser_only_writes_background() {
    let mut panel = create_test_panel();
    let marker = Tool::new(ToolMode::Marker, Color32::from_rgb(200, 30, 90));
    draw_line(&mut panel, &marker, Pos2::new(0.0, 32.0), Pos2::new(63.0, 32.0));
    let before = panel.surface().snapshot();

    let eraser = Tool::new(ToolMode::Eraser, Color32::GREEN);
    draw_line(&mut panel, &eraser, Pos2::new(32.0, 0.0), Pos2::new(32.0, 63.0));

    let after = panel.surface();
    let white = BACKGROUND.0;
    for (old, new) in before.pixels().chunks(4).zip(after.pixels().chunks(4)) {
        assert!(new == old || new == white);
    }
    assert_eq!(after.get_pixel(32, 32), Some(BACKGROUND));
}

#[test]
fn test_fill_stays_inside_drawn_border() {
    let mut panel = create_test_panel();
    let pen = Tool::new(ToolMode::Pen, Color32::BLACK);

    // Closed box from (10,10) to (50,50)
    let corners = [
        Pos2::new(10.0, 10.0),
        Pos2::new(50.0, 10.0),
        Pos2::new(50.0, 50.0),
        Pos2::new(10.0, 50.0),
    ];
    for i in 0..4 {
        draw_line(&mut panel, &pen, corners[i], corners[(i + 1) % 4]);
    }

    let outcome = panel.fill_at(Pos2::new(30.0, 30.0), Color32::from_rgb(0, 200, 0));
    assert!(outcome.changed());
    let surface = panel.surface();
    assert_eq!(surface.get_pixel(30, 30), Some(image::Rgba([0, 200, 0, 255])));
    assert_eq!(surface.get_pixel(2, 2), Some(BACKGROUND));
    assert_eq!(surface.get_pixel(60, 60), Some(BACKGROUND));
}
