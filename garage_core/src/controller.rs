//! The door state machine.
//!
//! `DoorController` owns the stored current/target state, the debounce
//! buffer, the request queue and every pending timer. Two loops share it:
//!
//! - the poll loop, a `Poll` event rescheduled every polling interval, which
//!   feeds the debounce buffer and updates state from stable sensor changes;
//! - the drain loop, started by the first request pushed onto an empty
//!   queue, which presses the button and optimistically moves the state.
//!
//! Both run as events on one `Timeline` and each event runs to completion,
//! so the `processing` flag and the grace timer are enough to keep the poll
//! loop out of the way while a request is in flight.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel as xch;
use garage_traits::{Clock, Gpio, GpioResult, Level, MonotonicClock, PinMode};

use crate::config::ControllerConfig;
use crate::debounce::DebounceBuffer;
use crate::error::{BuildError, Result};
use crate::hub::HubNotifier;
use crate::hw_error;
use crate::movement::MovementTimer;
use crate::queue::{Completion, RequestOutcome, RequestQueue};
use crate::sensor::SensorReader;
use crate::state::{CalculatedState, DoorState, TargetState};
use crate::timeline::{Timeline, TimerHandle, TimerSlot};

/// Deferred work the controller schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Poll,
    /// First half of a press elapsed; release the button.
    PressRelease,
    /// Second half elapsed; the drain loop resumes.
    PressSettled,
    MovementDone,
    GraceOver,
}

/// What the drain loop needs to remember across the press wait.
#[derive(Debug, Clone, Copy)]
struct PressInFlight {
    new_state: DoorState,
    needs_grace: bool,
}

type SharedClock = Arc<dyn Clock + Send + Sync>;

fn hw<T>(r: GpioResult<T>, what: &'static str) -> Result<T> {
    r.map_err(|e| hw_error::report(&*e).wrap_err(what))
}

pub struct DoorController<G: Gpio, H: HubNotifier> {
    gpio: G,
    hub: H,
    clock: SharedClock,
    cfg: ControllerConfig,
    sensors: SensorReader,
    buffer: DebounceBuffer<CalculatedState>,
    queue: RequestQueue,
    timeline: Timeline<Event>,
    movement: MovementTimer,
    grace: TimerSlot,
    press: Option<PressInFlight>,
    processing: bool,
    state: DoorState,
    target: TargetState,
}

impl<G: Gpio, H: HubNotifier> core::fmt::Debug for DoorController<G, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoorController")
            .field("name", &self.cfg.name)
            .field("state", &self.state)
            .field("target", &self.target)
            .field("processing", &self.processing)
            .field("in_grace", &self.grace.is_pending())
            .field("movement_pending", &self.movement.is_pending())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Builder for `DoorController`. GPIO, hub and config are required; the
/// clock defaults to `MonotonicClock`.
pub struct DoorControllerBuilder<G, H> {
    gpio: Option<G>,
    hub: Option<H>,
    config: Option<ControllerConfig>,
    clock: Option<SharedClock>,
}

impl<G, H> Default for DoorControllerBuilder<G, H> {
    fn default() -> Self {
        Self {
            gpio: None,
            hub: None,
            config: None,
            clock: None,
        }
    }
}

impl<G: Gpio, H: HubNotifier> DoorControllerBuilder<G, H> {
    pub fn gpio(mut self, gpio: G) -> Self {
        self.gpio = Some(gpio);
        self
    }

    pub fn hub(mut self, hub: H) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Configure the pins, seed the state from one sensor read and schedule
    /// the first poll.
    pub fn try_build(self) -> Result<DoorController<G, H>> {
        let gpio = self
            .gpio
            .ok_or_else(|| eyre::Report::new(BuildError::MissingGpio))?;
        let hub = self
            .hub
            .ok_or_else(|| eyre::Report::new(BuildError::MissingHub))?;
        let cfg = self
            .config
            .ok_or_else(|| eyre::Report::new(BuildError::MissingConfig))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        DoorController::start(gpio, hub, cfg, clock)
    }
}

impl<G: Gpio, H: HubNotifier> DoorController<G, H> {
    pub fn builder() -> DoorControllerBuilder<G, H> {
        DoorControllerBuilder::default()
    }

    fn start(mut gpio: G, hub: H, cfg: ControllerConfig, clock: SharedClock) -> Result<Self> {
        let sensors = SensorReader::new(
            cfg.open_sensor_pin,
            cfg.closed_sensor_pin,
            cfg.sensor_power_pin,
        );
        hw(
            gpio.configure_pin(cfg.button_pin, PinMode::Output(Level::Low)),
            "configure button pin",
        )?;
        hw(sensors.configure(&mut gpio), "configure sensor pins")?;

        // First assignment: nobody is subscribed yet, so no hub push.
        let state = DoorState::from(hw(sensors.read(&mut gpio), "initial sensor read")?);
        let target = TargetState::derived_from(state);
        tracing::info!(
            name = %cfg.name,
            state = %state,
            target = %target,
            button_pin = cfg.button_pin,
            open_sensor_pin = cfg.open_sensor_pin,
            closed_sensor_pin = cfg.closed_sensor_pin,
            "door controller started"
        );

        let mut timeline = Timeline::new();
        timeline.schedule(clock.now(), Duration::ZERO, Event::Poll);

        Ok(Self {
            gpio,
            hub,
            clock,
            buffer: DebounceBuffer::new(cfg.debounce_capacity),
            movement: MovementTimer::new(cfg.movement_duration),
            cfg,
            sensors,
            queue: RequestQueue::new(),
            timeline,
            grace: TimerSlot::new(),
            press: None,
            processing: false,
            state,
            target,
        })
    }

    // ── Hub-facing reads and commands ───────────────────────────────────────

    pub fn current_state(&self) -> DoorState {
        self.state
    }

    pub fn target_state(&self) -> TargetState {
        self.target
    }

    /// Queue a request and return the receiver its completion fires on.
    pub fn request_set(&mut self, target: TargetState) -> xch::Receiver<RequestOutcome> {
        let (completion, rx) = Completion::channel();
        self.request(target, completion);
        rx
    }

    /// Queue a request. Starts the drain loop only if the queue was empty.
    pub fn request(&mut self, target: TargetState, completion: Completion) {
        let start = self.queue.push(target, completion);
        tracing::info!(target = %target, queued = self.queue.len(), "request queued");
        if start {
            self.process_requests();
        }
    }

    // ── Inspection ──────────────────────────────────────────────────────────

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn in_grace(&self) -> bool {
        self.grace.is_pending()
    }

    pub fn movement_pending(&self) -> bool {
        self.movement.is_pending()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn hub(&self) -> &H {
        &self.hub
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        &*self.clock
    }

    // ── Driving time ────────────────────────────────────────────────────────

    /// When the next scheduled event is due.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.timeline.next_deadline()
    }

    /// Run every event due now, one at a time. Returns how many ran.
    pub fn fire_due(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((handle, event)) = self.timeline.pop_due(now) {
            self.handle(handle, event);
            fired += 1;
        }
        fired
    }

    /// Let `d` pass, firing each event at its own deadline. With a manual
    /// clock this is instant; with a real clock it sleeps.
    pub fn advance(&mut self, d: Duration) {
        let end = self.clock.now() + d;
        loop {
            self.fire_due();
            match self.timeline.next_deadline() {
                Some(t) if t <= end => {
                    let now = self.clock.now();
                    self.clock.sleep(t.saturating_duration_since(now));
                }
                _ => break,
            }
        }
        let now = self.clock.now();
        self.clock.sleep(end.saturating_duration_since(now));
        self.fire_due();
    }

    /// Stop all timers, release the button and power down the sensors.
    /// Queued requests are dropped without completing.
    pub fn shutdown(&mut self) -> Result<()> {
        self.movement.cancel(&mut self.timeline);
        self.grace.cancel(&mut self.timeline);
        self.timeline.clear();
        self.press = None;
        while self.queue.pop().is_some() {}
        self.processing = false;

        let button = self.gpio.write_digital(self.cfg.button_pin, Level::Low);
        let power = self.sensors.power_down(&mut self.gpio);
        tracing::info!(state = %self.state, "door controller shut down");
        hw(button, "release button on shutdown")?;
        hw(power, "power down sensors on shutdown")
    }

    fn handle(&mut self, handle: TimerHandle, event: Event) {
        tracing::trace!(?event, "timer fired");
        match event {
            Event::Poll => self.poll(),
            Event::PressRelease => self.release_button(),
            Event::PressSettled => self.press_settled(),
            Event::MovementDone => self.movement_done(handle),
            Event::GraceOver => {
                if self.grace.fired(handle) {
                    tracing::debug!("initial movement grace period over");
                }
            }
        }
    }

    // ── State setters ───────────────────────────────────────────────────────

    fn set_state(&mut self, new: DoorState, reason: &'static str) {
        let old = self.state;
        self.state = new;
        if old != new {
            self.hub.push_current_state(new);
        }
        tracing::info!(state = %new, previous = %old, reason, "updated state");
        self.set_target(TargetState::derived_from(new));
    }

    fn set_target(&mut self, new: TargetState) {
        let old = self.target;
        self.target = new;
        if old != new {
            self.hub.push_target_state(new);
        }
        tracing::debug!(target = %new, "updated target");
    }

    // ── Poll loop ───────────────────────────────────────────────────────────

    fn poll(&mut self) {
        if !self.processing && !self.grace.is_pending() {
            self.poll_sensors();
        }
        let now = self.clock.now();
        self.timeline
            .schedule(now, self.cfg.effective_polling_interval(), Event::Poll);
    }

    fn poll_sensors(&mut self) {
        let calculated = match self.sensors.read(&mut self.gpio) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "sensor read failed; skipping poll");
                return;
            }
        };
        self.buffer.push(calculated);

        // Only a stable reading that differs from what we believe counts.
        if self.buffer.predict() != Some(calculated) || calculated == self.state {
            return;
        }

        if calculated != CalculatedState::Stopped {
            self.movement.cancel(&mut self.timeline);
            self.set_state(calculated.into(), "door reached endpoint");
        } else if !self.movement.is_pending() {
            let reason = "no movement timer pending; inferring physical press";
            match self.state {
                DoorState::Closed => {
                    self.arm_movement();
                    self.set_state(DoorState::Opening, reason);
                }
                DoorState::Open => {
                    self.arm_movement();
                    self.set_state(DoorState::Closing, reason);
                }
                _ => self.set_state(DoorState::Stopped, "door left expected travel"),
            }
        }
    }

    fn arm_movement(&mut self) {
        let now = self.clock.now();
        self.movement
            .arm(&mut self.timeline, now, Event::MovementDone);
    }

    fn movement_done(&mut self, handle: TimerHandle) {
        if !self.movement.fired(handle) {
            return;
        }
        tracing::info!("movement timer fired");
        match self.sensors.read(&mut self.gpio) {
            Ok(calculated) => self.set_state(calculated.into(), "movement timer fired"),
            Err(e) => {
                tracing::error!(error = %e, state = %self.state, "sensor read failed after movement; keeping state");
            }
        }
    }

    // ── Drain loop ──────────────────────────────────────────────────────────

    fn process_requests(&mut self) {
        self.processing = !self.queue.is_empty();

        while self.processing {
            let Some(target) = self.queue.front_mut().map(|r| r.target) else {
                break;
            };
            tracing::info!(target = %target, "processing request");

            if target.is_satisfied_by(self.state) {
                tracing::info!(state = %self.state, "already satisfied; skipping");
                let state = self.state;
                if let Some(mut req) = self.queue.pop() {
                    req.completion
                        .complete(RequestOutcome::AlreadySatisfied { state });
                }
                self.processing = !self.queue.is_empty();
                continue;
            }

            self.movement.cancel(&mut self.timeline);
            self.begin_press();

            let from = self.state;
            let new_state = from.after_press();
            let needs_grace = from.is_endpoint();
            tracing::info!(from = %from, to = %new_state, "pressed button; predicting next state");
            self.set_state(new_state, "button pressed");

            if let Some(head) = self.queue.front_mut() {
                head.completion.complete(RequestOutcome::Pressed {
                    from,
                    to: new_state,
                });
            }
            self.press = Some(PressInFlight {
                new_state,
                needs_grace,
            });
            // resumed by PressSettled
            return;
        }
    }

    fn begin_press(&mut self) {
        tracing::info!(pin = self.cfg.button_pin, "pressing button");
        if let Err(e) = self.gpio.write_digital(self.cfg.button_pin, Level::High) {
            tracing::error!(error = %e, "button write failed");
        }
        let now = self.clock.now();
        self.timeline
            .schedule(now, self.cfg.press_duration, Event::PressRelease);
    }

    fn release_button(&mut self) {
        if let Err(e) = self.gpio.write_digital(self.cfg.button_pin, Level::Low) {
            tracing::error!(error = %e, "button release failed");
        }
        let now = self.clock.now();
        self.timeline
            .schedule(now, self.cfg.press_duration, Event::PressSettled);
    }

    fn press_settled(&mut self) {
        let Some(press) = self.press.take() else {
            return;
        };
        tracing::info!("done pressing button");
        let now = self.clock.now();

        if press.new_state != DoorState::Stopped {
            self.movement
                .arm(&mut self.timeline, now, Event::MovementDone);
        }
        if press.needs_grace {
            let grace = self.cfg.grace_period();
            tracing::debug!(
                grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                "waiting for initial movement"
            );
            self.grace
                .arm(&mut self.timeline, now, grace, Event::GraceOver);
        }

        self.queue.pop();
        self.process_requests();
    }
}
