use crate::error::DomainError;
use crate::gfx::anim::Timeline;
use crate::gfx::math::{ScreenPosition, Viewport};
use crate::params::ParameterStore;
use log::debug;
use std::time::{Duration, Instant};

pub const RECT_WIDTH: f64 = 20.0;
pub const RECT_HEIGHT: f64 = 9.0;

/// Where the two moving primitives sit for one eased sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    pub progress: f64,
    pub eased: f64,
    /// Top-left corner of the rectangle.
    pub rectangle: ScreenPosition,
    /// Center of the time dot.
    pub dot: ScreenPosition,
}

impl MarkerFrame {
    pub fn place(progress: f64, eased: f64, viewport: Viewport) -> Self {
        let width = viewport.width as f64;
        let height = viewport.height as f64;

        // The rectangle travels from 25% to 75% of the width on eased output
        let rectangle = ScreenPosition::new(
            width / 4.0 + (width / 2.0 - RECT_WIDTH) * eased,
            height / 2.0 - RECT_HEIGHT / 2.0,
        );
        // x follows raw progress and y eased output, so the dot rides the
        // plotted curve
        let dot = ScreenPosition::new(progress * width, viewport.output_to_y(eased));

        Self {
            progress,
            eased,
            rectangle,
            dot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Running(MarkerFrame),
    /// The cycle reached progress 1. Ticking must stop for `resume_after`.
    Completed {
        frame: MarkerFrame,
        resume_after: Duration,
    },
    /// Ticked while paused or stopped; nothing was computed.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Paused,
    Stopped,
}

/// Loops the animation forever: run a cycle, pause, run the next one.
pub struct AnimationDriver {
    state: DriverState,
    timeline: Timeline,
    pause: Duration,
    last: Option<MarkerFrame>,
}

impl AnimationDriver {
    pub fn new(pause: Duration) -> Self {
        Self {
            state: DriverState::Running,
            timeline: Timeline::new(),
            pause,
            last: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn cycle_start(&self) -> Option<Instant> {
        self.timeline.start_time()
    }

    pub fn last_frame(&self) -> Option<MarkerFrame> {
        self.last
    }

    pub fn tick(
        &mut self,
        now: Instant,
        params: &ParameterStore,
        viewport: Viewport,
    ) -> Result<Tick, DomainError> {
        if self.state != DriverState::Running {
            return Ok(Tick::Idle);
        }
        if !self.timeline.is_started() {
            self.timeline.start(now);
        }

        let progress = self.timeline.progress(now, params.cycle_duration())?;
        let eased = params.shape().easing()?.eval(progress);
        let frame = MarkerFrame::place(progress, eased, viewport);
        self.last = Some(frame);

        if progress < 1.0 {
            return Ok(Tick::Running(frame));
        }

        self.timeline.clear();
        self.state = DriverState::Paused;
        debug!("Cycle complete, pausing for {:?}", self.pause);
        Ok(Tick::Completed {
            frame,
            resume_after: self.pause,
        })
    }

    /// Ends the pause; the next tick starts a fresh cycle.
    pub fn resume(&mut self) {
        if self.state == DriverState::Paused {
            debug!("Resuming animation");
            self.state = DriverState::Running;
        }
    }

    pub fn stop(&mut self) {
        self.state = DriverState::Stopped;
        self.timeline.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MarkerVisibility, ShapeParameters};

    const VIEWPORT: Viewport = Viewport { width: 800, height: 400 };

    fn params(duration_ms: u64) -> ParameterStore {
        ParameterStore::new(
            ShapeParameters { power: 0.3, elasticity: 3.0 },
            Duration::from_millis(duration_ms),
            MarkerVisibility::Hidden,
        )
    }

    fn frame(tick: Tick) -> MarkerFrame {
        match tick {
            Tick::Running(frame) | Tick::Completed { frame, .. } => frame,
            Tick::Idle => panic!("expected a frame"),
        }
    }

    #[test]
    fn test_first_tick_arms_cycle() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();

        assert_eq!(driver.cycle_start(), None);
        let tick = driver.tick(t0, &params, VIEWPORT).unwrap();
        assert_eq!(driver.cycle_start(), Some(t0));
        assert!(matches!(tick, Tick::Running(_)));
        assert_eq!(frame(tick).progress, 0.0);
    }

    #[test]
    fn test_progress_through_cycle() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();

        let half = driver
            .tick(t0 + Duration::from_millis(500), &params, VIEWPORT)
            .unwrap();
        assert!(matches!(half, Tick::Running(_)));
        assert_eq!(frame(half).progress, 0.5);

        let end = driver
            .tick(t0 + Duration::from_millis(1000), &params, VIEWPORT)
            .unwrap();
        assert_eq!(
            end,
            Tick::Completed {
                frame: frame(end),
                resume_after: Duration::from_millis(150),
            }
        );
        assert_eq!(frame(end).progress, 1.0);
        assert_eq!(driver.state(), DriverState::Paused);
        assert_eq!(driver.cycle_start(), None);
    }

    #[test]
    fn test_late_tick_clamps_to_one() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();

        let late = driver
            .tick(t0 + Duration::from_millis(1337), &params, VIEWPORT)
            .unwrap();
        assert_eq!(frame(late).progress, 1.0);
        assert!(matches!(late, Tick::Completed { .. }));
    }

    #[test]
    fn test_paused_driver_does_nothing() {
        let params = params(200);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();
        driver
            .tick(t0 + Duration::from_millis(200), &params, VIEWPORT)
            .unwrap();

        let idle = driver
            .tick(t0 + Duration::from_millis(250), &params, VIEWPORT)
            .unwrap();
        assert_eq!(idle, Tick::Idle);
        assert_eq!(driver.cycle_start(), None);
    }

    #[test]
    fn test_restart_uses_fresh_start_time() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();
        driver
            .tick(t0 + Duration::from_millis(1000), &params, VIEWPORT)
            .unwrap();

        driver.resume();
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(driver.cycle_start(), None);

        let t1 = t0 + Duration::from_millis(1150);
        let tick = driver.tick(t1, &params, VIEWPORT).unwrap();
        assert_eq!(driver.cycle_start(), Some(t1));
        assert_eq!(frame(tick).progress, 0.0);
    }

    #[test]
    fn test_dot_rides_the_curve() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();

        let tick = driver
            .tick(t0 + Duration::from_millis(250), &params, VIEWPORT)
            .unwrap();
        let eased = params.shape().easing().unwrap().eval(0.25);
        let dot = frame(tick).dot;

        assert_eq!(dot.x, 0.25 * 800.0);
        assert_eq!(dot.y, 400.0 - eased * (400.0 / 2.0));
        assert_eq!(frame(tick).eased, eased);
    }

    #[test]
    fn test_rectangle_travel() {
        let start = MarkerFrame::place(0.0, 0.0, VIEWPORT);
        assert_eq!(start.rectangle, ScreenPosition::new(200.0, 195.5));

        let end = MarkerFrame::place(1.0, 1.0, VIEWPORT);
        assert_eq!(end.rectangle, ScreenPosition::new(580.0, 195.5));

        // Overshoot carries the rectangle past the 75% line
        let over = MarkerFrame::place(0.4, 1.3, VIEWPORT);
        assert!(over.rectangle.x > 580.0);
        assert_eq!(over.rectangle.y, 195.5);
    }

    #[test]
    fn test_zero_duration_is_a_domain_error() {
        let params = params(0);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let err = driver.tick(Instant::now(), &params, VIEWPORT);
        assert_eq!(err, Err(DomainError::NonPositiveDuration));
    }

    #[test]
    fn test_reads_latest_parameters_each_tick() {
        let mut params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        let t0 = Instant::now();
        driver.tick(t0, &params, VIEWPORT).unwrap();

        let before = frame(
            driver
                .tick(t0 + Duration::from_millis(100), &params, VIEWPORT)
                .unwrap(),
        );
        params.set_elasticity(15.0);
        let after = frame(
            driver
                .tick(t0 + Duration::from_millis(100), &params, VIEWPORT)
                .unwrap(),
        );
        assert_eq!(before.progress, after.progress);
        assert_ne!(before.eased, after.eased);
    }

    #[test]
    fn test_stop_is_terminal() {
        let params = params(1000);
        let mut driver = AnimationDriver::new(Duration::from_millis(150));
        driver.tick(Instant::now(), &params, VIEWPORT).unwrap();
        driver.stop();
        driver.resume();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.tick(Instant::now(), &params, VIEWPORT).unwrap(), Tick::Idle);
    }
}
