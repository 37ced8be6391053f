use anyhow::{anyhow, Result};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::{debug, error};
use std::time::{Duration, Instant};

pub enum FrameAction {
    Continue,
    /// Stop ticking, then resume after the given pause.
    Suspend(Duration),
    Stop,
}

/// Loop data that owns a `FrameClock` and reacts to its ticks.
pub trait FrameDriven: Sized + 'static {
    fn frame_clock(&mut self) -> &mut FrameClock<Self>;
    fn on_frame(&mut self, now: Instant) -> FrameAction;
    fn on_resume(&mut self);
}

/// Free-running frame timer on a calloop loop, plus the one-shot pause
/// timer that restarts it. At most one of the two is registered; while
/// paused no frame callback runs at all.
pub struct FrameClock<D: 'static> {
    handle: LoopHandle<'static, D>,
    interval: Duration,
    frame: Option<RegistrationToken>,
    pause: Option<RegistrationToken>,
}

impl<D: FrameDriven> FrameClock<D> {
    pub fn new(handle: LoopHandle<'static, D>, interval: Duration) -> Self {
        Self {
            handle,
            interval,
            frame: None,
            pause: None,
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.frame.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_some()
    }

    pub fn start(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Ok(());
        }

        let interval = self.interval;
        let token = self
            .handle
            .insert_source(Timer::immediate(), move |_, _, data: &mut D| {
                match data.on_frame(Instant::now()) {
                    FrameAction::Continue => TimeoutAction::ToDuration(interval),
                    FrameAction::Suspend(pause) => {
                        let clock = data.frame_clock();
                        clock.frame = None;
                        if let Err(err) = clock.suspend(pause) {
                            error!("{:#}", err);
                        }
                        TimeoutAction::Drop
                    }
                    FrameAction::Stop => {
                        data.frame_clock().frame = None;
                        TimeoutAction::Drop
                    }
                }
            })
            .map_err(|e| anyhow!("Failed to register frame timer: {}", e.error))?;

        self.frame = Some(token);
        Ok(())
    }

    fn suspend(&mut self, pause: Duration) -> Result<()> {
        debug!("Frame clock suspended for {:?}", pause);
        let token = self
            .handle
            .insert_source(Timer::from_duration(pause), |_, _, data: &mut D| {
                data.frame_clock().pause = None;
                data.on_resume();
                if let Err(err) = data.frame_clock().start() {
                    error!("{:#}", err);
                }
                TimeoutAction::Drop
            })
            .map_err(|e| anyhow!("Failed to register pause timer: {}", e.error))?;

        self.pause = Some(token);
        Ok(())
    }

    /// Removes whichever timer is registered. Nothing ticks afterwards
    /// until `start` is called again.
    pub fn cancel(&mut self) {
        for token in [self.frame.take(), self.pause.take()].into_iter().flatten() {
            self.handle.remove(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;

    struct Probe {
        clock: FrameClock<Probe>,
        frames: Vec<Instant>,
        suspended_at: Option<Instant>,
        resumes: u32,
        frames_per_cycle: usize,
        pause: Duration,
    }

    impl FrameDriven for Probe {
        fn frame_clock(&mut self) -> &mut FrameClock<Self> {
            &mut self.clock
        }

        fn on_frame(&mut self, now: Instant) -> FrameAction {
            self.frames.push(now);
            if self.frames.len() % self.frames_per_cycle == 0 {
                self.suspended_at = Some(now);
                FrameAction::Suspend(self.pause)
            } else {
                FrameAction::Continue
            }
        }

        fn on_resume(&mut self) {
            self.resumes += 1;
        }
    }

    fn probe(event_loop: &EventLoop<'static, Probe>) -> Probe {
        Probe {
            clock: FrameClock::new(event_loop.handle(), Duration::from_millis(2)),
            frames: Vec::new(),
            suspended_at: None,
            resumes: 0,
            frames_per_cycle: 3,
            pause: Duration::from_millis(30),
        }
    }

    #[test]
    fn test_suspend_then_resume() {
        let mut event_loop: EventLoop<'static, Probe> = EventLoop::try_new().unwrap();
        let mut probe = probe(&event_loop);
        probe.clock.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while probe.frames.len() < 3 && Instant::now() < deadline {
            event_loop.dispatch(Some(Duration::from_millis(50)), &mut probe).unwrap();
        }
        assert_eq!(probe.frames.len(), 3);
        assert!(!probe.clock.is_ticking());
        assert!(probe.clock.is_paused());

        while probe.frames.len() < 4 && Instant::now() < deadline {
            event_loop.dispatch(Some(Duration::from_millis(50)), &mut probe).unwrap();
        }
        assert_eq!(probe.resumes, 1);
        assert!(probe.clock.is_ticking());

        let gap = probe.frames[3] - probe.suspended_at.unwrap();
        assert!(gap >= probe.pause, "resumed after {:?}", gap);
    }

    #[test]
    fn test_cancel_stops_everything() {
        let mut event_loop: EventLoop<'static, Probe> = EventLoop::try_new().unwrap();
        let mut probe = probe(&event_loop);
        probe.clock.start().unwrap();
        event_loop.dispatch(Some(Duration::from_millis(10)), &mut probe).unwrap();

        probe.clock.cancel();
        let seen = probe.frames.len();
        for _ in 0..5 {
            event_loop.dispatch(Some(Duration::from_millis(5)), &mut probe).unwrap();
        }
        assert_eq!(probe.frames.len(), seen);
        assert!(!probe.clock.is_ticking());
        assert!(!probe.clock.is_paused());
    }
}
