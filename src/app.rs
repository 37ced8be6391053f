use crate::config::{Config, Palette};
use crate::controls::{ControlMessage, Controls};
use crate::error::DomainError;
use crate::features::curve::Curve;
use crate::features::driver::{AnimationDriver, Tick};
use crate::features::grid::Grid;
use crate::features::markers::Markers;
use crate::features::Feature;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Rect, Vec2, Viewport};
use crate::params::ParameterStore;
use anyhow::Result;
use log::info;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    PointerEnter { pos: Vec2 },
    PointerLeave,
    PointerMove { pos: Vec2 },
    PointerDown { pos: Vec2, button: u32 },
    PointerUp,
    Scroll { delta: f32 },
}

pub struct App {
    pub config: Config,
    pub params: ParameterStore,
    pub driver: AnimationDriver,
    palette: Palette,
    viewport: Viewport,
    controls: Controls,
    grid: Grid,
    curve: Curve,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let palette = config.theme.palette()?;
        let viewport = Viewport::new(config.plot_size.width, config.plot_size.height);
        let strip = Rect::new(
            0.0,
            viewport.height as f32,
            viewport.width as f32,
            config.controls_height as f32,
        );

        let controls = Controls::new(strip, &config.initial);
        let params = controls.parameters();
        let curve = Curve::new(viewport, params.shape())?;

        info!(
            "Starting with power={} elasticity={} cycle={:?}",
            params.shape().power,
            params.shape().elasticity,
            params.cycle_duration()
        );

        Ok(Self {
            driver: AnimationDriver::new(config.cycle_pause()),
            config,
            params,
            palette,
            viewport,
            controls,
            grid: Grid::new(viewport),
            curve,
        })
    }

    pub fn surface_size(&self) -> [u32; 2] {
        self.config.surface_size()
    }

    /// Returns whether the scene needs to be presented now rather than on
    /// the next frame.
    pub fn handle_event(&mut self, event: UiEvent) -> Result<bool, DomainError> {
        match self.controls.handle(&event) {
            Some(message) => {
                self.apply(message)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn apply(&mut self, message: ControlMessage) -> Result<(), DomainError> {
        match message {
            ControlMessage::PowerChanged(power) => {
                info!("power -> {:.2}", power);
                self.params.set_power(power);
                self.curve.resample(self.params.shape())?;
            }
            ControlMessage::ElasticityChanged(elasticity) => {
                info!("elasticity -> {:.1}", elasticity);
                self.params.set_elasticity(elasticity);
                self.curve.resample(self.params.shape())?;
            }
            ControlMessage::CycleDurationChanged(duration) => {
                info!("cycle duration -> {:?}", duration);
                self.params.set_cycle_duration(duration);
            }
            ControlMessage::MarkerToggled(marker) => {
                info!("time marker -> {:?}", marker);
                self.params.set_marker(marker);
            }
        }
        Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> Result<Tick, DomainError> {
        self.driver.tick(now, &self.params, self.viewport)
    }

    pub fn render(&self, draw: &mut DrawContext) {
        let [w, h] = self.surface_size();
        draw.begin([w as f32, h as f32], self.palette.background);

        let markers = Markers::new(self.driver.last_frame(), self.params.marker());
        let layers: [&dyn Feature; 3] = [&self.grid, &self.curve, &markers];
        for layer in layers {
            log::trace!("render {}", layer.name());
            layer.render(draw, &self.palette);
        }
        self.controls.render(draw, &self.palette);

        draw.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::BTN_LEFT;
    use crate::params::MarkerVisibility;
    use std::time::Duration;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    // The strip starts at y = 400; rows are 20px tall after 8px padding
    fn row_center(index: usize) -> f32 {
        400.0 + 8.0 + 20.0 * index as f32 + 10.0
    }

    fn press(x: f32, y: f32) -> UiEvent {
        UiEvent::PointerDown { pos: Vec2::new(x, y), button: BTN_LEFT }
    }

    #[test]
    fn test_starts_from_config_defaults() {
        let app = app();
        assert_eq!(app.params.shape().power, 0.3);
        assert_eq!(app.params.shape().elasticity, 3.0);
        assert_eq!(app.params.cycle_duration(), Duration::from_millis(1000));
        assert_eq!(app.params.marker(), MarkerVisibility::Hidden);
        assert_eq!(app.curve.points().len(), 801);
    }

    #[test]
    fn test_shape_change_resamples_curve() {
        let mut app = app();
        let before = app.curve.points().to_vec();

        let redraw = app.handle_event(press(16.0 + 688.0, row_center(1))).unwrap();
        assert!(redraw);
        assert_eq!(app.params.shape().elasticity, 20.0);
        assert_ne!(app.curve.points(), &before[..]);
    }

    #[test]
    fn test_duration_change_keeps_curve() {
        let mut app = app();
        let before = app.curve.points().to_vec();

        app.handle_event(press(16.0, row_center(2))).unwrap();
        assert_eq!(app.params.cycle_duration(), Duration::from_millis(200));
        assert_eq!(app.curve.points(), &before[..]);
    }

    #[test]
    fn test_pointer_over_plot_is_ignored() {
        let mut app = app();
        let redraw = app.handle_event(press(400.0, 200.0)).unwrap();
        assert!(!redraw);
    }

    #[test]
    fn test_tick_reads_store() {
        let mut app = app();
        let t0 = Instant::now();
        app.tick(t0).unwrap();
        match app.tick(t0 + Duration::from_millis(500)).unwrap() {
            Tick::Running(frame) => assert_eq!(frame.dot.x, 400.0),
            other => panic!("unexpected tick: {:?}", other),
        }
    }
}
