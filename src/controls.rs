use crate::app::UiEvent;
use crate::config::{Initial, Palette};
use crate::gfx::anim::lerp;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Rect, Vec2};
use crate::gfx::segments;
use crate::params::{MarkerVisibility, ParameterStore, ShapeParameters};
use std::time::Duration;

pub const BTN_LEFT: u32 = 0x110;

const PADDING: f32 = 8.0;
const ROWS: f32 = 4.0;
const TRACK_INSET: f32 = 16.0;
const TRACK_THICKNESS: f32 = 4.0;
const READOUT_WIDTH: f32 = 96.0;
const HANDLE: [f32; 2] = [10.0, 14.0];
const TOGGLE: [f32; 2] = [28.0, 14.0];
const READOUT_HEIGHT: f32 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderId {
    Power,
    Elasticity,
    CycleDuration,
}

const SLIDERS: [SliderId; 3] = [SliderId::Power, SliderId::Elasticity, SliderId::CycleDuration];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    PowerChanged(f64),
    ElasticityChanged(f64),
    CycleDurationChanged(Duration),
    MarkerToggled(MarkerVisibility),
}

/// A ranged value snapped to its step. Nothing outside
/// `[floor, max]` is ever published.
#[derive(Debug, Clone)]
pub struct Slider {
    min: f64,
    max: f64,
    step: f64,
    floor: f64,
    value: f64,
}

impl Slider {
    pub fn new(min: f64, max: f64, step: f64, start: f64) -> Self {
        let mut slider = Self {
            min,
            max,
            step,
            floor: min,
            value: min,
        };
        slider.set(start);
        slider
    }

    /// Raises the lowest reachable value above `min` without changing the
    /// track's scale.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self.set(self.value);
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn fraction(&self) -> f64 {
        (self.value - self.min) / (self.max - self.min)
    }

    /// Snaps and clamps `raw`; returns whether the value changed.
    pub fn set(&mut self, raw: f64) -> bool {
        if raw.is_nan() {
            return false;
        }
        let steps = ((raw - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).clamp(self.floor.max(self.min), self.max);
        let changed = snapped != self.value;
        self.value = snapped;
        changed
    }

    pub fn set_fraction(&mut self, fraction: f64) -> bool {
        self.set(lerp(self.min, self.max, fraction.clamp(0.0, 1.0)))
    }

    pub fn nudge(&mut self, notches: f32) -> bool {
        self.set(self.value + notches as f64 * self.step)
    }
}

/// The control strip under the plot: three sliders (power, elasticity,
/// cycle duration) and the time-dot toggle, top to bottom.
pub struct Controls {
    area: Rect,
    power: Slider,
    elasticity: Slider,
    duration: Slider,
    marker: MarkerVisibility,
    pointer: Vec2,
    dragging: Option<SliderId>,
}

impl Controls {
    pub fn new(area: Rect, initial: &Initial) -> Self {
        Self {
            area,
            power: Slider::new(0.0, 2.0, 0.01, initial.power).with_floor(0.01),
            elasticity: Slider::new(0.0, 20.0, 0.1, initial.elasticity),
            duration: Slider::new(200.0, 2000.0, 50.0, initial.cycle_duration_ms as f64),
            marker: MarkerVisibility::from(initial.show_marker),
            pointer: Vec2::default(),
            dragging: None,
        }
    }

    /// Parameter values as currently published by the controls.
    pub fn parameters(&self) -> ParameterStore {
        ParameterStore::new(
            ShapeParameters {
                power: self.power.value(),
                elasticity: self.elasticity.value(),
            },
            self.cycle_duration(),
            self.marker,
        )
    }

    pub fn handle(&mut self, event: &UiEvent) -> Option<ControlMessage> {
        match *event {
            UiEvent::PointerEnter { pos } | UiEvent::PointerMove { pos } => {
                self.pointer = pos;
                let id = self.dragging?;
                self.drag_to(id, pos.x)
            }
            UiEvent::PointerDown { pos, button } => {
                self.pointer = pos;
                if button != BTN_LEFT {
                    return None;
                }
                if self.toggle_rect().contains(pos) {
                    self.marker = MarkerVisibility::from(!self.marker.is_shown());
                    return Some(ControlMessage::MarkerToggled(self.marker));
                }
                let id = self.slider_at(pos)?;
                self.dragging = Some(id);
                self.drag_to(id, pos.x)
            }
            UiEvent::PointerUp | UiEvent::PointerLeave => {
                self.dragging = None;
                None
            }
            UiEvent::Scroll { delta } => {
                let id = self.slider_at(self.pointer)?;
                self.slider_mut(id).nudge(delta).then(|| self.message(id))
            }
        }
    }

    fn drag_to(&mut self, id: SliderId, x: f32) -> Option<ControlMessage> {
        let track = self.track(id);
        let fraction = ((x - track.x) / track.width) as f64;
        self.slider_mut(id).set_fraction(fraction).then(|| self.message(id))
    }

    fn cycle_duration(&self) -> Duration {
        Duration::from_millis(self.duration.value().round() as u64)
    }

    fn message(&self, id: SliderId) -> ControlMessage {
        match id {
            SliderId::Power => ControlMessage::PowerChanged(self.power.value()),
            SliderId::Elasticity => ControlMessage::ElasticityChanged(self.elasticity.value()),
            SliderId::CycleDuration => ControlMessage::CycleDurationChanged(self.cycle_duration()),
        }
    }

    fn slider(&self, id: SliderId) -> &Slider {
        match id {
            SliderId::Power => &self.power,
            SliderId::Elasticity => &self.elasticity,
            SliderId::CycleDuration => &self.duration,
        }
    }

    fn slider_mut(&mut self, id: SliderId) -> &mut Slider {
        match id {
            SliderId::Power => &mut self.power,
            SliderId::Elasticity => &mut self.elasticity,
            SliderId::CycleDuration => &mut self.duration,
        }
    }

    fn slider_at(&self, pos: Vec2) -> Option<SliderId> {
        SLIDERS.into_iter().find(|&id| self.hit_rect(id).contains(pos))
    }

    fn row(&self, index: usize) -> Rect {
        let height = (self.area.height - PADDING * 2.0) / ROWS;
        Rect::new(
            self.area.x,
            self.area.y + PADDING + height * index as f32,
            self.area.width,
            height,
        )
    }

    fn row_index(id: SliderId) -> usize {
        match id {
            SliderId::Power => 0,
            SliderId::Elasticity => 1,
            SliderId::CycleDuration => 2,
        }
    }

    fn track(&self, id: SliderId) -> Rect {
        let row = self.row(Self::row_index(id));
        Rect::new(
            row.x + TRACK_INSET,
            row.y + (row.height - TRACK_THICKNESS) / 2.0,
            row.width - TRACK_INSET - READOUT_WIDTH,
            TRACK_THICKNESS,
        )
    }

    fn hit_rect(&self, id: SliderId) -> Rect {
        let row = self.row(Self::row_index(id));
        let track = self.track(id);
        Rect::new(track.x - HANDLE[0], row.y, track.width + HANDLE[0] * 2.0, row.height)
    }

    fn toggle_rect(&self) -> Rect {
        let row = self.row(3);
        Rect::new(
            row.x + TRACK_INSET,
            row.y + (row.height - TOGGLE[1]) / 2.0,
            TOGGLE[0],
            TOGGLE[1],
        )
    }

    fn readout(&self, id: SliderId) -> String {
        let value = self.slider(id).value();
        match id {
            SliderId::Power => format!("{:.2}", value),
            SliderId::Elasticity => format!("{:.1}", value),
            SliderId::CycleDuration => format!("{:.0}", value),
        }
    }

    pub fn render(&self, draw: &mut DrawContext, palette: &Palette) {
        let a = self.area;
        draw.rect(a.x, a.y, a.width, a.height, palette.panel);

        for id in SLIDERS {
            let track = self.track(id);
            let fill = track.width * self.slider(id).fraction() as f32;
            draw.round_rect(track.x, track.y, track.width, track.height, 2.0, palette.track);
            draw.round_rect(track.x, track.y, fill, track.height, 2.0, palette.accent);

            let handle_x = track.x + fill - HANDLE[0] / 2.0;
            let handle_y = track.y + (track.height - HANDLE[1]) / 2.0;
            draw.round_rect(handle_x, handle_y, HANDLE[0], HANDLE[1], 3.0, palette.accent);

            let text = self.readout(id);
            let text_x = a.x + a.width - READOUT_WIDTH + TRACK_INSET;
            let text_y = track.y + (track.height - READOUT_HEIGHT) / 2.0;
            segments::draw_text(draw, &text, text_x, text_y, READOUT_HEIGHT, palette.label);
        }

        let toggle = self.toggle_rect();
        let on = self.marker.is_shown();
        let knob = TOGGLE[1] - 4.0;
        let knob_x = if on { toggle.x + toggle.width - knob - 2.0 } else { toggle.x + 2.0 };
        draw.round_rect(
            toggle.x,
            toggle.y,
            toggle.width,
            toggle.height,
            toggle.height / 2.0,
            if on { palette.accent } else { palette.track },
        );
        draw.round_rect(knob_x, toggle.y + 2.0, knob, knob, knob / 2.0, palette.panel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTN_RIGHT: u32 = 0x111;

    fn initial() -> Initial {
        Initial {
            power: 0.3,
            elasticity: 3.0,
            cycle_duration_ms: 1000,
            show_marker: false,
        }
    }

    fn controls() -> Controls {
        Controls::new(Rect::new(0.0, 400.0, 800.0, 96.0), &initial())
    }

    fn row_y(controls: &Controls, index: usize) -> f32 {
        let row = controls.row(index);
        row.y + row.height / 2.0
    }

    fn press(x: f32, y: f32) -> UiEvent {
        UiEvent::PointerDown { pos: Vec2::new(x, y), button: BTN_LEFT }
    }

    #[test]
    fn test_slider_snaps_and_clamps() {
        let mut slider = Slider::new(200.0, 2000.0, 50.0, 1000.0);
        assert!(slider.set(1234.0));
        assert_eq!(slider.value(), 1250.0);
        slider.set(90_000.0);
        assert_eq!(slider.value(), 2000.0);
        slider.set(-5.0);
        assert_eq!(slider.value(), 200.0);
        assert!(!slider.set(f64::NAN));
        assert_eq!(slider.value(), 200.0);
    }

    #[test]
    fn test_power_never_reaches_zero() {
        let mut power = Slider::new(0.0, 2.0, 0.01, 0.3).with_floor(0.01);
        power.set(0.0);
        assert!(power.value() > 0.0);
        power.set_fraction(-1.0);
        assert!((power.value() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_initial_values_pass_the_guards() {
        let mut bad = initial();
        bad.power = 0.0;
        bad.elasticity = 50.0;
        bad.cycle_duration_ms = 10;
        let params = Controls::new(Rect::new(0.0, 0.0, 800.0, 96.0), &bad).parameters();
        assert!(params.shape().power > 0.0);
        assert_eq!(params.shape().elasticity, 20.0);
        assert_eq!(params.cycle_duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_press_sets_value_from_pointer() {
        let mut controls = controls();
        let track = controls.track(SliderId::Power);
        let y = row_y(&controls, 0);

        let msg = controls.handle(&press(track.x + track.width / 2.0, y));
        assert_eq!(msg, Some(ControlMessage::PowerChanged(1.0)));

        let msg = controls.handle(&press(track.x, row_y(&controls, 1)));
        assert_eq!(msg, Some(ControlMessage::ElasticityChanged(0.0)));
    }

    #[test]
    fn test_drag_until_release() {
        let mut controls = controls();
        let track = controls.track(SliderId::CycleDuration);
        let y = row_y(&controls, 2);

        controls.handle(&press(track.x + track.width / 2.0, y));
        // Dragging continues even when the pointer leaves the row
        let msg = controls.handle(&UiEvent::PointerMove { pos: Vec2::new(track.x + track.width + 50.0, 0.0) });
        assert_eq!(
            msg,
            Some(ControlMessage::CycleDurationChanged(Duration::from_millis(2000)))
        );

        controls.handle(&UiEvent::PointerUp);
        let msg = controls.handle(&UiEvent::PointerMove { pos: Vec2::new(track.x, y) });
        assert_eq!(msg, None);
    }

    #[test]
    fn test_scroll_nudges_hovered_slider() {
        let mut controls = controls();
        let track = controls.track(SliderId::CycleDuration);
        let pos = Vec2::new(track.x + 10.0, row_y(&controls, 2));

        controls.handle(&UiEvent::PointerMove { pos });
        let msg = controls.handle(&UiEvent::Scroll { delta: -1.0 });
        assert_eq!(
            msg,
            Some(ControlMessage::CycleDurationChanged(Duration::from_millis(950)))
        );

        // Nothing under the pointer
        controls.handle(&UiEvent::PointerMove { pos: Vec2::new(10.0, 10.0) });
        assert_eq!(controls.handle(&UiEvent::Scroll { delta: 1.0 }), None);
    }

    #[test]
    fn test_toggle_marker() {
        let mut controls = controls();
        let toggle = controls.toggle_rect();
        let (x, y) = (toggle.x + 4.0, toggle.y + 4.0);

        assert_eq!(
            controls.handle(&press(x, y)),
            Some(ControlMessage::MarkerToggled(MarkerVisibility::Shown))
        );
        assert_eq!(
            controls.handle(&press(x, y)),
            Some(ControlMessage::MarkerToggled(MarkerVisibility::Hidden))
        );
    }

    #[test]
    fn test_ignores_other_buttons() {
        let mut controls = controls();
        let track = controls.track(SliderId::Power);
        let event = UiEvent::PointerDown {
            pos: Vec2::new(track.x + 5.0, row_y(&controls, 0)),
            button: BTN_RIGHT,
        };
        assert_eq!(controls.handle(&event), None);
        assert_eq!(controls.parameters().shape().power, 0.3);
    }
}
