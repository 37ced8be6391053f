use super::Feature;
use crate::config::Palette;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Vec2, Viewport};
use crate::gfx::segments;

const SPACING: u32 = 10;
const LABEL_HEIGHT: f32 = 9.0;
const TICK_LENGTH: f32 = 5.0;
// Crisp 1px lines
const HALF_PIXEL: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Fine,
    Axis,
    Quarter,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Vec2,
    pub to: Vec2,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Top-left corner.
    pub pos: Vec2,
}

/// Static background: 10px grid, the mid line at output 1, the rectangle's
/// travel bounds and both axes' ticks. Built once per viewport.
pub struct Grid {
    lines: Vec<GridLine>,
    labels: Vec<Label>,
}

impl Grid {
    pub fn new(viewport: Viewport) -> Self {
        let w = viewport.width as f32;
        let h = viewport.height as f32;
        let mut lines = Vec::new();
        let mut labels = Vec::new();

        let mut push = |from: Vec2, to: Vec2, stroke: Stroke| {
            lines.push(GridLine {
                from: Vec2::new(from.x + HALF_PIXEL, from.y + HALF_PIXEL),
                to: Vec2::new(to.x + HALF_PIXEL, to.y + HALF_PIXEL),
                stroke,
            });
        };

        for x in (0..=viewport.width).step_by(SPACING as usize) {
            let x = x as f32;
            push(Vec2::new(x, 0.0), Vec2::new(x, h), Stroke::Fine);
        }
        for y in (0..=viewport.height).step_by(SPACING as usize) {
            let y = y as f32;
            push(Vec2::new(0.0, y), Vec2::new(w, y), Stroke::Fine);
        }

        push(Vec2::new(0.0, h / 2.0), Vec2::new(w, h / 2.0), Stroke::Axis);
        push(Vec2::new(w / 4.0, 0.0), Vec2::new(w / 4.0, h), Stroke::Quarter);
        push(Vec2::new(w * 3.0 / 4.0, 0.0), Vec2::new(w * 3.0 / 4.0, h), Stroke::Quarter);

        for step in 1..=10u32 {
            let i = step as f32 / 10.0;

            // Progress along the bottom edge
            let text = format!("{:.1}", i);
            let text_w = segments::text_width(&text, LABEL_HEIGHT);
            labels.push(Label {
                text,
                pos: Vec2::new(i * w - text_w / 2.0, h - 18.0),
            });
            push(Vec2::new(i * w, h - TICK_LENGTH), Vec2::new(i * w, h), Stroke::Tick);

            // Output up the left edge, 0 at the bottom and 2 at the top
            labels.push(Label {
                text: format!("{:.1}", i * 2.0),
                pos: Vec2::new(8.0, (1.0 - i) * h - LABEL_HEIGHT / 2.0),
            });
            push(Vec2::new(0.0, i * h), Vec2::new(TICK_LENGTH, i * h), Stroke::Tick);
        }

        Self { lines, labels }
    }

    #[cfg(test)]
    fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    #[cfg(test)]
    fn labels(&self) -> &[Label] {
        &self.labels
    }
}

impl Feature for Grid {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn render(&self, draw: &mut DrawContext, palette: &Palette) {
        // Grouped by stroke so each color is one batch
        for (stroke, color) in [
            (Stroke::Fine, palette.grid),
            (Stroke::Axis, palette.axis),
            (Stroke::Quarter, palette.quarter),
            (Stroke::Tick, palette.label),
        ] {
            for line in self.lines.iter().filter(|l| l.stroke == stroke) {
                draw.line(line.from, line.to, 1.0, color);
            }
        }
        for label in &self.labels {
            segments::draw_text(draw, &label.text, label.pos.x, label.pos.y, LABEL_HEIGHT, palette.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(grid: &Grid, stroke: Stroke) -> usize {
        grid.lines().iter().filter(|l| l.stroke == stroke).count()
    }

    #[test]
    fn test_line_counts() {
        let grid = Grid::new(Viewport::new(800, 400));
        assert_eq!(count(&grid, Stroke::Fine), 81 + 41);
        assert_eq!(count(&grid, Stroke::Axis), 1);
        assert_eq!(count(&grid, Stroke::Quarter), 2);
        assert_eq!(count(&grid, Stroke::Tick), 20);
    }

    #[test]
    fn test_quarter_lines() {
        let grid = Grid::new(Viewport::new(800, 400));
        let xs: Vec<f32> = grid
            .lines()
            .iter()
            .filter(|l| l.stroke == Stroke::Quarter)
            .map(|l| l.from.x)
            .collect();
        assert_eq!(xs, vec![200.5, 600.5]);
    }

    #[test]
    fn test_labels() {
        let grid = Grid::new(Viewport::new(800, 400));
        let texts: Vec<&str> = grid.labels().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts.len(), 20);
        assert_eq!(&texts[..4], &["0.1", "0.2", "0.2", "0.4"]);
        assert_eq!(&texts[18..], &["1.0", "2.0"]);

        // "2.0" sits at the top edge, centered on y = 0
        let top = &grid.labels()[19];
        assert_eq!(top.pos, Vec2::new(8.0, -LABEL_HEIGHT / 2.0));
    }
}
