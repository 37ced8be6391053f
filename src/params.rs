use crate::error::DomainError;
use crate::gfx::anim::ElasticEasing;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParameters {
    pub power: f64,
    pub elasticity: f64,
}

impl ShapeParameters {
    pub fn easing(&self) -> Result<ElasticEasing, DomainError> {
        ElasticEasing::new(self.power, self.elasticity)
    }
}

/// Whether the time dot is drawn. Has no effect on any computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerVisibility {
    Shown,
    #[default]
    Hidden,
}

impl MarkerVisibility {
    pub fn is_shown(self) -> bool {
        self == MarkerVisibility::Shown
    }
}

impl From<bool> for MarkerVisibility {
    fn from(shown: bool) -> Self {
        if shown {
            MarkerVisibility::Shown
        } else {
            MarkerVisibility::Hidden
        }
    }
}

/// Current value of every tunable. Each field has exactly one writer (its
/// control); readers always see the latest value and never cache it.
///
/// Values are stored as given. Range checks belong to the controls; the
/// easing and the cycle timer reject anything out of domain.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    shape: ShapeParameters,
    cycle_duration: Duration,
    marker: MarkerVisibility,
}

impl ParameterStore {
    pub fn new(shape: ShapeParameters, cycle_duration: Duration, marker: MarkerVisibility) -> Self {
        Self {
            shape,
            cycle_duration,
            marker,
        }
    }

    pub fn shape(&self) -> ShapeParameters {
        self.shape
    }

    pub fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }

    pub fn marker(&self) -> MarkerVisibility {
        self.marker
    }

    pub fn set_power(&mut self, power: f64) {
        self.shape.power = power;
    }

    pub fn set_elasticity(&mut self, elasticity: f64) {
        self.shape.elasticity = elasticity;
    }

    pub fn set_cycle_duration(&mut self, duration: Duration) {
        self.cycle_duration = duration;
    }

    pub fn set_marker(&mut self, marker: MarkerVisibility) {
        self.marker = marker;
    }
}
