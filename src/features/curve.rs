use super::Feature;
use crate::config::Palette;
use crate::error::DomainError;
use crate::gfx::anim::ElasticEasing;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{ScreenPosition, Vec2, Viewport};
use crate::params::ShapeParameters;

const STROKE: f32 = 1.5;

/// One point per pixel column, `0..=width`, mapping column to progress and
/// eased output to a plot row.
pub fn sample(easing: &ElasticEasing, viewport: Viewport) -> Vec<ScreenPosition> {
    let width = viewport.width as f64;
    (0..=viewport.width)
        .map(|column| {
            let x = column as f64;
            let input = if viewport.width == 0 { 0.0 } else { x / width };
            ScreenPosition::new(x, viewport.output_to_y(easing.eval(input)))
        })
        .collect()
}

/// The plotted easing curve. Replaced wholesale on every shape change.
pub struct Curve {
    viewport: Viewport,
    points: Vec<Vec2>,
}

impl Curve {
    pub fn new(viewport: Viewport, shape: ShapeParameters) -> Result<Self, DomainError> {
        let mut curve = Self {
            viewport,
            points: Vec::new(),
        };
        curve.resample(shape)?;
        Ok(curve)
    }

    pub fn resample(&mut self, shape: ShapeParameters) -> Result<(), DomainError> {
        let easing = shape.easing()?;
        self.points = sample(&easing, self.viewport)
            .into_iter()
            .map(ScreenPosition::to_vec2)
            .collect();
        log::debug!(
            "Resampled curve: power={} elasticity={} points={}",
            shape.power,
            shape.elasticity,
            self.points.len()
        );
        Ok(())
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

impl Feature for Curve {
    fn name(&self) -> &'static str {
        "curve"
    }

    fn render(&self, draw: &mut DrawContext, palette: &Palette) {
        draw.polyline(&self.points, STROKE, palette.curve);
    }
}
