use super::driver::{MarkerFrame, RECT_HEIGHT, RECT_WIDTH};
use super::Feature;
use crate::config::Palette;
use crate::gfx::draw::DrawContext;
use crate::params::MarkerVisibility;

const RECT_RADIUS: f32 = 2.0;
const DOT_RADIUS: f32 = 4.0;

/// The travelling rectangle and, when enabled, the time dot.
pub struct Markers {
    frame: Option<MarkerFrame>,
    visibility: MarkerVisibility,
}

impl Markers {
    pub fn new(frame: Option<MarkerFrame>, visibility: MarkerVisibility) -> Self {
        Self { frame, visibility }
    }
}

impl Feature for Markers {
    fn name(&self) -> &'static str {
        "markers"
    }

    fn render(&self, draw: &mut DrawContext, palette: &Palette) {
        let Some(frame) = self.frame else {
            return;
        };

        let rect = frame.rectangle.to_vec2();
        draw.round_rect(
            rect.x,
            rect.y,
            RECT_WIDTH as f32,
            RECT_HEIGHT as f32,
            RECT_RADIUS,
            palette.rectangle,
        );

        if self.visibility.is_shown() {
            draw.circle(frame.dot.to_vec2(), DOT_RADIUS, palette.marker);
        }
    }
}
