use crate::error::DomainError;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// "Out elastic" easing: a damped sine that settles on 1.
///
/// `power` sets the oscillation period, `elasticity` stretches the decay
/// envelope. The output is divided by the value the curve reaches at
/// `t = 1` so the family keeps a comparable amplitude across parameters.
/// It is not clamped; overshoot above 1 and below 0 is the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticEasing {
    power: f64,
    scale: f64,
    phase: f64,
    max_value: f64,
}

impl ElasticEasing {
    pub fn new(power: f64, elasticity: f64) -> Result<Self, DomainError> {
        if !power.is_finite() || power <= 0.0 {
            return Err(DomainError::NonPositivePower(power));
        }
        if !elasticity.is_finite() || elasticity < 0.0 {
            return Err(DomainError::NegativeElasticity(elasticity));
        }

        let scale = 0.175 * elasticity + 0.0875;
        let phase = power / 4.0;
        // Computed once per parameter pair, reused for every sample
        let max_value = damped_sine(scale, phase, power);

        Ok(Self {
            power,
            scale,
            phase,
            max_value,
        })
    }

    pub fn eval(&self, progress: f64) -> f64 {
        self.unnormalized(progress) / self.max_value
    }

    fn unnormalized(&self, progress: f64) -> f64 {
        damped_sine(progress * self.scale, self.phase, self.power)
    }
}

fn damped_sine(t: f64, phase: f64, power: f64) -> f64 {
    ((t - phase) * TAU / power).sin() * 2f64.powf(-10.0 * t) + 1.0
}

/// Wall-clock bookkeeping for one animation cycle.
///
/// `start == None` means the cycle has not begun; the first tick arms it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timeline {
    start: Option<Instant>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.start = Some(now);
    }

    pub fn clear(&mut self) {
        self.start = None;
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Elapsed fraction of `duration`, clamped to 1. An unstarted timeline
    /// reports 0.
    pub fn progress(&self, now: Instant, duration: Duration) -> Result<f64, DomainError> {
        if duration.is_zero() {
            return Err(DomainError::NonPositiveDuration);
        }
        let Some(start) = self.start else {
            return Ok(0.0);
        };
        let elapsed = now.saturating_duration_since(start);
        Ok((elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0))
    }
}
