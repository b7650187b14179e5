//! HUD, menu and game-over overlays

use glam::Vec2;

use crate::renderer::scene::{Anchor, DrawList, Layer, TextItem};
use crate::renderer::shapes;
use crate::renderer::vertex::colors;
use crate::rgba;
use crate::sim::Lives;

pub const FONT_LARGE: u32 = 48;
pub const FONT_NORMAL: u32 = 36;
pub const FONT_SMALL: u32 = 24;

/// Opacity of the game-over dimming rectangle (out of 255)
const OVERLAY_ALPHA: f32 = 200.0 / 255.0;
const MENU_LINE_SPACING: f32 = 35.0;

const MENU_LINES: [&str; 8] = [
    "Point at the falling asteroids to destroy them!",
    "",
    "Position your webcam to see the screen",
    "Every asteroid that reaches the bottom costs a life",
    "",
    "Press SPACE to start",
    "Press F to toggle fullscreen",
    "Press ESC to quit",
];

fn text(list: &mut DrawList, s: impl Into<String>, pos: Vec2, size: u32, color: [u8; 3], anchor: Anchor) {
    list.text(TextItem {
        text: s.into(),
        pos,
        size,
        color,
        anchor,
    });
}

/// Score, lives (when limited) and FPS
pub fn hud(list: &mut DrawList, score: u32, lives: Lives, fps: f32, width: u32) {
    list.set_layer(Layer::Ui);
    text(
        list,
        format!("Score: {score}"),
        Vec2::new(20.0, 20.0),
        FONT_LARGE,
        colors::TEXT,
        Anchor::TopLeft,
    );
    if let Some(n) = lives.remaining() {
        text(
            list,
            format!("Lives: {n}"),
            Vec2::new(20.0, 80.0),
            FONT_NORMAL,
            colors::TEXT,
            Anchor::TopLeft,
        );
    }
    text(
        list,
        format!("FPS: {}", fps.round() as u32),
        Vec2::new(width as f32 - 20.0, 20.0),
        FONT_SMALL,
        colors::TEXT,
        Anchor::TopRight,
    );
}

/// Title screen over a plain background
pub fn menu(list: &mut DrawList, width: u32, height: u32) {
    let (w, h) = (width as f32, height as f32);
    list.set_layer(Layer::Background);
    list.triangles(shapes::rect(
        Vec2::ZERO,
        Vec2::new(w, h),
        rgba(colors::BACKGROUND, 1.0),
    ));

    list.set_layer(Layer::Ui);
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    text(
        list,
        "ASTEROID DESTROYER",
        Vec2::new(cx, cy - 120.0),
        FONT_LARGE,
        colors::TITLE,
        Anchor::Center,
    );
    for (i, line) in MENU_LINES.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = cy - 40.0 + i as f32 * MENU_LINE_SPACING;
        text(list, *line, Vec2::new(cx, y), FONT_SMALL, colors::TEXT, Anchor::Center);
    }
    text(
        list,
        "Press 'D' to show Camera View (Debug)",
        Vec2::new(10.0, h - 30.0),
        FONT_SMALL,
        colors::HINT,
        Anchor::TopLeft,
    );
}

/// Dimmed playfield with the final score
pub fn game_over(list: &mut DrawList, score: u32, width: u32, height: u32) {
    let (w, h) = (width as f32, height as f32);
    list.set_layer(Layer::Ui);
    list.triangles(shapes::rect(
        Vec2::ZERO,
        Vec2::new(w, h),
        rgba(colors::OVERLAY, OVERLAY_ALPHA),
    ));

    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    text(
        list,
        "GAME OVER",
        Vec2::new(cx, cy - 60.0),
        FONT_LARGE,
        colors::GAME_OVER,
        Anchor::Center,
    );
    text(
        list,
        format!("Final Score: {score}"),
        Vec2::new(cx, cy),
        FONT_NORMAL,
        colors::TEXT,
        Anchor::Center,
    );
    text(
        list,
        "Press SPACE to restart or ESC for the menu",
        Vec2::new(cx, cy + 60.0),
        FONT_SMALL,
        colors::TEXT,
        Anchor::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(list: &DrawList) -> Vec<String> {
        list.texts().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_hud_hides_unlimited_lives() {
        let mut list = DrawList::new();
        hud(&mut list, 7, Lives::Limited(2), 59.6, 1280);
        assert_eq!(texts(&list), vec!["Score: 7", "Lives: 2", "FPS: 60"]);

        let mut list = DrawList::new();
        hud(&mut list, 7, Lives::Unlimited, 30.0, 1280);
        assert_eq!(texts(&list), vec!["Score: 7", "FPS: 30"]);
    }

    #[test]
    fn test_fps_is_anchored_top_right() {
        let mut list = DrawList::new();
        hud(&mut list, 0, Lives::Unlimited, 60.0, 1280);
        let fps = list.texts().last().unwrap();
        assert_eq!(fps.anchor, Anchor::TopRight);
        assert_eq!(fps.pos, Vec2::new(1260.0, 20.0));
    }

    #[test]
    fn test_menu_layout() {
        let mut list = DrawList::new();
        menu(&mut list, 1280, 720);
        let items: Vec<&TextItem> = list.texts().collect();
        assert_eq!(items[0].text, "ASTEROID DESTROYER");
        assert_eq!(items[0].pos, Vec2::new(640.0, 240.0));
        assert_eq!(items[1].pos.y, 320.0);
        // Blank lines keep their slot
        assert_eq!(items[2].pos.y, 390.0);
        assert_eq!(list.layer(Layer::Background).len(), 1);
    }

    #[test]
    fn test_game_over_overlay() {
        let mut list = DrawList::new();
        game_over(&mut list, 12, 1280, 720);
        assert_eq!(
            texts(&list)[..2],
            ["GAME OVER".to_string(), "Final Score: 12".to_string()]
        );
        assert_eq!(list.layer(Layer::Ui).len(), 4);
    }
}
