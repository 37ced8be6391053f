pub mod curve;
pub mod driver;
pub mod grid;
pub mod markers;

use crate::config::Palette;
use crate::gfx::draw::DrawContext;

/// One layer of the plot, drawn back to front.
pub trait Feature {
    fn name(&self) -> &'static str;
    fn render(&self, draw: &mut DrawContext, palette: &Palette);
}
