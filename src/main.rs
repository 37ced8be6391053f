mod app;
mod config;
mod controls;
mod error;
mod features;
mod frame_clock;
mod gfx;
mod params;
mod wayland;

use anyhow::{anyhow, bail, Result};
use app::App;
use calloop::generic::{FdWrapper, Generic};
use calloop::{EventLoop, Interest, Mode, PostAction};
use config::Config;
use features::driver::Tick;
use frame_clock::{FrameAction, FrameClock, FrameDriven};
use gfx::draw::DrawContext;
use log::{debug, error, info, warn};
use std::io;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};
use wayland::egl::EglContext;
use wayland::{DisplayBound, WaylandState};
use wayland_client::backend::WaylandError;
use wayland_client::{Connection, EventQueue, Proxy};

/// GL objects go before the context that owns them.
struct Gpu {
    draw: DrawContext,
    egl: EglContext,
}

struct Link {
    conn: Connection,
    queue: EventQueue<WaylandState>,
    state: WaylandState,
}

/// Everything the calloop sources touch.
struct Runtime {
    session: DisplayBound<Gpu, Link>,
    app: App,
    clock: FrameClock<Runtime>,
    failure: Option<anyhow::Error>,
}

impl Runtime {
    fn present(&mut self) -> Result<()> {
        let gpu = &mut self.session.gpu;
        gpu.egl.make_current()?;
        self.app.render(&mut gpu.draw);
        gpu.egl.swap_buffers()?;
        Ok(())
    }

    /// Reads whatever the socket has, dispatches it and feeds pointer input
    /// to the controls. Never blocks.
    fn pump_wayland(&mut self) -> Result<()> {
        let link = &mut self.session.display;
        if let Some(guard) = link.queue.prepare_read() {
            match guard.read() {
                Ok(_) => {}
                Err(WaylandError::Io(err)) if err.kind() == io::ErrorKind::WouldBlock => {}
                Err(err) => return Err(err.into()),
            }
        }
        link.queue.dispatch_pending(&mut link.state)?;

        let mut redraw = false;
        for event in std::mem::take(&mut link.state.pending_events) {
            redraw |= self.app.handle_event(event)?;
        }
        // Parameter changes show up at once, even mid-pause
        if redraw {
            if self.clock.is_paused() {
                debug!("Redrawing during cycle pause");
            }
            self.present()?;
        }
        Ok(())
    }

    fn fail(&mut self, err: anyhow::Error) {
        error!("{:#}", err);
        self.failure.get_or_insert(err);
        self.session.display.state.running = false;
    }
}

impl FrameDriven for Runtime {
    fn frame_clock(&mut self) -> &mut FrameClock<Self> {
        &mut self.clock
    }

    fn on_frame(&mut self, now: Instant) -> FrameAction {
        let tick = match self.app.tick(now) {
            Ok(tick) => tick,
            Err(err) => {
                self.fail(err.into());
                return FrameAction::Stop;
            }
        };
        if tick == Tick::Idle {
            return FrameAction::Stop;
        }
        if let Err(err) = self.present() {
            self.fail(err);
            return FrameAction::Stop;
        }

        match tick {
            Tick::Completed { resume_after, .. } => FrameAction::Suspend(resume_after),
            _ => FrameAction::Continue,
        }
    }

    fn on_resume(&mut self) {
        self.app.driver.resume();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|err| {
        warn!("Ignoring config: {:#}", err);
        Config::default()
    });
    let app = App::new(config)?;

    info!("Connecting to Wayland...");
    let conn = Connection::connect_to_env()?;
    let display = conn.display();

    let mut queue = conn.new_event_queue();
    let qh = queue.handle();
    let _registry = display.get_registry(&qh, ());

    let mut wayland = WaylandState::new();
    queue.roundtrip(&mut wayland)?;
    if let Some(size) = wayland.output_size {
        info!("Output size: {}x{}", size[0], size[1]);
    }

    wayland.create_layer_surface(&app.config, &qh)?;
    while !wayland.configured {
        queue.blocking_dispatch(&mut wayland)?;
    }
    if !wayland.running {
        bail!("Layer surface closed before first frame");
    }
    info!("Surface configured");

    let surface = wayland
        .surface
        .clone()
        .ok_or_else(|| anyhow!("Layer surface missing after configure"))?;
    let egl = EglContext::new(display.id().as_ptr() as *mut _, &surface, app.surface_size())?;
    let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };
    let program = gfx::gl::build_program(&gl)?;
    let draw = DrawContext::new(gl, program)?;

    let mut event_loop: EventLoop<'static, Runtime> = EventLoop::try_new()?;
    let socket = conn.backend().poll_fd().as_raw_fd();
    event_loop
        .handle()
        .insert_source(
            Generic::new(unsafe { FdWrapper::new(socket) }, Interest::READ, Mode::Level),
            |_, _, rt: &mut Runtime| {
                if let Err(err) = rt.pump_wayland() {
                    rt.fail(err);
                }
                Ok(PostAction::Continue)
            },
        )
        .map_err(|e| anyhow!("Failed to watch the Wayland socket: {}", e.error))?;

    let clock = FrameClock::new(event_loop.handle(), app.config.frame_interval());
    let mut rt = Runtime {
        session: DisplayBound::new(
            Gpu { draw, egl },
            Link {
                conn,
                queue,
                state: wayland,
            },
        ),
        app,
        clock,
        failure: None,
    };

    rt.present()?;
    rt.clock.start()?;
    info!("Animating");

    while rt.session.display.state.running {
        if let Err(err) = rt.pump_wayland() {
            rt.fail(err);
            break;
        }
        rt.session.display.conn.flush()?;
        event_loop.dispatch(None::<Duration>, &mut rt)?;
    }

    rt.clock.cancel();
    rt.app.driver.stop();
    info!("Shutting down");

    match rt.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
