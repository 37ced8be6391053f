pub mod egl;

use crate::app::UiEvent;
use crate::config::{Anchor, Config};
use crate::gfx::math::Vec2;
use wayland_client::{
    protocol::{wl_compositor, wl_output, wl_pointer, wl_registry, wl_seat, wl_surface},
    Connection, Dispatch, QueueHandle, WEnum,
};
use wayland_protocols_wlr::layer_shell::v1::client::{
    zwlr_layer_shell_v1, zwlr_layer_surface_v1,
};

/// GPU state paired with the display connection it was created on.
///
/// Field order matters: fields drop in declaration order, and EGL teardown
/// dereferences the `wl_display`, so `gpu` must be released while `display`
/// still holds the connection open.
pub struct DisplayBound<G, D> {
    pub gpu: G,
    pub display: D,
}

impl<G, D> DisplayBound<G, D> {
    pub fn new(gpu: G, display: D) -> Self {
        Self { gpu, display }
    }
}

/// Axis units per wheel notch.
const NOTCH: f64 = 10.0;

/// Collects continuous axis motion (touchpads send many small events) into
/// whole wheel notches.
#[derive(Debug, Default)]
pub struct ScrollAccumulator {
    pending: f64,
}

impl ScrollAccumulator {
    /// Adds one axis `value` and returns the notches completed by it,
    /// positive for scrolling up. The remainder carries over.
    pub fn feed(&mut self, value: f64) -> i32 {
        self.pending += value;
        let notches = (self.pending / NOTCH).trunc();
        self.pending -= notches * NOTCH;
        -(notches as i32)
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
    }
}

pub struct WaylandState {
    pub running: bool,
    pub configured: bool,
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub surface: Option<wl_surface::WlSurface>,
    pub layer_surface: Option<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    pub seat: Option<wl_seat::WlSeat>,
    pub output: Option<wl_output::WlOutput>,
    pub output_size: Option<[u32; 2]>,
    pub pointer: Option<wl_pointer::WlPointer>,
    pub surface_pos: Vec2,
    pub scroll: ScrollAccumulator,
    pub pending_events: Vec<UiEvent>,
}

impl WaylandState {
    pub fn new() -> Self {
        Self {
            running: true,
            configured: false,
            compositor: None,
            layer_shell: None,
            surface: None,
            layer_surface: None,
            seat: None,
            output: None,
            output_size: None,
            pointer: None,
            surface_pos: Vec2::default(),
            scroll: ScrollAccumulator::default(),
            pending_events: Vec::new(),
        }
    }

    /// Creates the surface and its layer role, sized and anchored per
    /// config. Call after the globals roundtrip.
    pub fn create_layer_surface(&mut self, config: &Config, qh: &QueueHandle<Self>) -> anyhow::Result<()> {
        let (Some(compositor), Some(layer_shell)) = (&self.compositor, &self.layer_shell) else {
            anyhow::bail!("Compositor does not offer wl_compositor and zwlr_layer_shell_v1");
        };

        let surface = compositor.create_surface(qh, ());
        let layer_surface = layer_shell.get_layer_surface(
            &surface,
            None,
            zwlr_layer_shell_v1::Layer::Top,
            "overshoot".to_string(),
            qh,
            (),
        );

        let [width, height] = config.surface_size();
        let m = &config.margins;
        layer_surface.set_anchor(anchor_bits(config.position.anchor));
        layer_surface.set_margin(m.top, m.right, m.bottom, m.left);
        layer_surface.set_exclusive_zone(config.position.exclusive_zone);
        layer_surface.set_size(width, height);
        surface.commit();

        self.surface = Some(surface);
        self.layer_surface = Some(layer_surface);
        Ok(())
    }
}

fn anchor_bits(anchor: Anchor) -> zwlr_layer_surface_v1::Anchor {
    use zwlr_layer_surface_v1::Anchor as Edge;
    match anchor {
        Anchor::TopLeft => Edge::Top | Edge::Left,
        Anchor::TopRight => Edge::Top | Edge::Right,
        Anchor::BottomLeft => Edge::Bottom | Edge::Left,
        Anchor::BottomRight => Edge::Bottom | Edge::Right,
        Anchor::Center => Edge::empty(),
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global {
            name,
            interface,
            version,
        } = event
        {
            match &interface[..] {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind::<wl_compositor::WlCompositor, _, _>(
                        name,
                        version.min(4),
                        qh,
                        (),
                    ));
                }
                "zwlr_layer_shell_v1" => {
                    state.layer_shell = Some(
                        registry.bind::<zwlr_layer_shell_v1::ZwlrLayerShellV1, _, _>(
                            name,
                            version.min(1),
                            qh,
                            (),
                        ),
                    );
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind::<wl_seat::WlSeat, _, _>(
                        name,
                        version.min(5),
                        qh,
                        (),
                    ));
                }
                "wl_output" => {
                    state.output = Some(registry.bind::<wl_output::WlOutput, _, _>(
                        name,
                        version.min(2),
                        qh,
                        (),
                    ));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_compositor::WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_surface::WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_pointer::WlPointer, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_pointer::WlPointer,
        event: wl_pointer::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            wl_pointer::Event::Enter { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerEnter { pos: state.surface_pos });
            }
            wl_pointer::Event::Leave { .. } => {
                state.scroll.reset();
                state.pending_events.push(UiEvent::PointerLeave);
            }
            wl_pointer::Event::Motion { surface_x, surface_y, .. } => {
                state.surface_pos = Vec2::new(surface_x as f32, surface_y as f32);
                state.pending_events.push(UiEvent::PointerMove { pos: state.surface_pos });
            }
            wl_pointer::Event::Button { button, state: btn_state, .. } => {
                let ev = match btn_state {
                    WEnum::Value(wl_pointer::ButtonState::Pressed) => UiEvent::PointerDown { pos: state.surface_pos, button },
                    WEnum::Value(wl_pointer::ButtonState::Released) => UiEvent::PointerUp,
                    _ => return,
                };
                state.pending_events.push(ev);
            }
            wl_pointer::Event::Axis { axis, value, .. } => {
                if let WEnum::Value(wl_pointer::Axis::VerticalScroll) = axis {
                    let notches = state.scroll.feed(value);
                    if notches != 0 {
                        state.pending_events.push(UiEvent::Scroll { delta: notches as f32 });
                    }
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(caps),
        } = event
        {
            if caps.contains(wl_seat::Capability::Pointer) && state.pointer.is_none() {
                state.pointer = Some(seat.get_pointer(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Mode { width, height, .. } = event {
            state.output_size = Some([width as u32, height as u32]);
        }
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for WaylandState {
    fn event(_: &mut Self, _: &zwlr_layer_shell_v1::ZwlrLayerShellV1, _: zwlr_layer_shell_v1::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure { serial, width, height } => {
                log::debug!("Layer surface configured: {}x{} serial={}", width, height, serial);
                surface.ack_configure(serial);
                state.configured = true;
            }
            zwlr_layer_surface_v1::Event::Closed => {
                log::info!("Layer surface closed by compositor");
                state.running = false;
            }
            _ => {}
        }
    }
}
