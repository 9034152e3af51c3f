//! Immersive-session lifecycle.
//!
//! A small state machine that requests entry into the host's immersive
//! mode, falls back to a gesture overlay when automatic entry is refused,
//! and drives the render-quality ramp in lockstep with session state.
//! Everything runs on the frame tick; the only asynchrony is the host's
//! entry result, normalized at the boundary into [`EntryOutcome`].

pub mod quality;

use std::time::Duration;

use engine::events::{Disposer, Listeners};
use tracing::{debug, info};

use crate::config::{QualityConfig, SessionConfig};
use crate::snap_turn::TurnVignette;

pub use quality::QualityRamp;

/// Lifecycle states. `OverlayShown` and `Active` are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    OverlayShown,
}

/// Normalized result of an entry request. The host API's variable
/// capability surface (result, rejection, or nothing at all) collapses to
/// these three outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Succeeded,
    Rejected,
    Unsupported,
}

/// Host notifications consumed by the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The asynchronous entry request resolved.
    EntryResolved(EntryOutcome),
    /// The session became active, possibly through a path outside this
    /// controller (a system-level control).
    Entered,
    /// The session ended.
    Exited,
    /// Scene content finished loading.
    ContentReady,
}

/// One observed state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTransition {
    pub from: SessionState,
    pub to: SessionState,
}

/// The host's immersive-session API.
pub trait SessionDevice {
    /// Launch an asynchronous entry request. Returns `false` when the host
    /// exposes no asynchronous result at all (capability absence); the
    /// outcome otherwise arrives later as [`SessionEvent::EntryResolved`].
    fn request_entry(&mut self) -> bool;

    fn is_active(&self) -> bool;

    /// Environment heuristic for automatic entry (mobile-class device).
    fn auto_entry_allowed(&self) -> bool;
}

/// The rendering surface and overlay host.
pub trait ViewSurface {
    fn device_pixel_ratio(&self) -> f32;
    fn default_render_scale(&self) -> f32;
    fn set_render_scale(&mut self, scale: f32);
    fn set_anisotropy(&mut self, level: u8);

    /// Construct the full-viewport entry affordance.
    fn show_entry_overlay(&mut self);

    /// Tear the affordance down. Must tolerate "already removed".
    fn remove_entry_overlay(&mut self);
}

pub struct SessionLifecycle<D: SessionDevice, S: ViewSurface> {
    config: SessionConfig,
    quality: QualityRamp,
    device: D,
    surface: S,
    state: SessionState,
    overlay_up: bool,
    /// Automatic entry is armed until it fires once; manual paths clear it.
    auto_pending: bool,
    auto_deadline: Option<Duration>,
    /// Implicit-rejection deadline for a host without an entry result.
    grace_deadline: Option<Duration>,
    vignette: TurnVignette,
    transitions: Listeners<SessionTransition>,
}

impl<D: SessionDevice, S: ViewSurface> SessionLifecycle<D, S> {
    pub fn new(
        config: SessionConfig,
        quality_config: QualityConfig,
        device: D,
        mut surface: S,
    ) -> SessionLifecycle<D, S> {
        let quality = QualityRamp::new(quality_config);
        quality.apply_startup(&mut surface);

        let auto_pending = config.enabled && device.auto_entry_allowed();
        let mut lifecycle = SessionLifecycle {
            config,
            quality,
            device,
            surface,
            state: SessionState::Idle,
            overlay_up: false,
            auto_pending,
            auto_deadline: None,
            grace_deadline: None,
            vignette: TurnVignette::default(),
            transitions: Listeners::new(),
        };
        // The host session may already be running (launched from a
        // system-level control); synchronize without re-requesting.
        if lifecycle.device.is_active() {
            lifecycle.enter_active();
        }
        lifecycle
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_session_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_up
    }

    pub fn vignette(&self) -> &TurnVignette {
        &self.vignette
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable host access for frontends that drive a simulated device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Observe state transitions. The disposer unregisters the callback;
    /// dropping the lifecycle drops all callbacks with it.
    pub fn on_transition(
        &self,
        callback: impl FnMut(&SessionTransition) + 'static,
    ) -> Disposer<SessionTransition> {
        self.transitions.subscribe(callback)
    }

    /// Per-frame evaluation of the pending deadlines.
    pub fn update(&mut self, now: Duration) {
        if self.auto_pending {
            match self.auto_deadline {
                None => self.auto_deadline = Some(now + self.config.startup_delay()),
                Some(deadline) if now >= deadline => {
                    self.auto_pending = false;
                    self.auto_deadline = None;
                    self.begin_entry_request(now);
                }
                Some(_) => {}
            }
        }

        if let Some(deadline) = self.grace_deadline {
            if now >= deadline {
                // Implicit rejection: the host never produced a result.
                self.grace_deadline = None;
                self.show_overlay();
            }
        }
    }

    pub fn handle_event(&mut self, event: SessionEvent, now: Duration) {
        match event {
            SessionEvent::EntryResolved(EntryOutcome::Succeeded) => self.enter_active(),
            SessionEvent::EntryResolved(EntryOutcome::Rejected) => {
                // Not an error: entry requires an explicit user gesture.
                self.grace_deadline = None;
                self.show_overlay();
            }
            SessionEvent::EntryResolved(EntryOutcome::Unsupported) => {
                if self.state == SessionState::Requesting && self.grace_deadline.is_none() {
                    self.grace_deadline = Some(now + self.config.unsupported_grace());
                }
            }
            SessionEvent::Entered => self.enter_active(),
            SessionEvent::Exited => self.exit_active(),
            SessionEvent::ContentReady => self.quality.on_content_ready(&mut self.surface),
        }
    }

    /// The overlay's single control was activated by direct user
    /// interaction, which satisfies the host's gesture requirement.
    pub fn overlay_activated(&mut self, now: Duration) {
        if !self.overlay_up {
            return;
        }
        self.begin_entry_request(now);
    }

    fn begin_entry_request(&mut self, now: Duration) {
        self.set_state(SessionState::Requesting);
        if !self.device.request_entry() {
            debug!("host has no asynchronous entry result; arming grace fallback");
            self.grace_deadline = Some(now + self.config.unsupported_grace());
        }
    }

    fn show_overlay(&mut self) {
        if self.state == SessionState::Active {
            return;
        }
        if !self.overlay_up {
            self.surface.show_entry_overlay();
            self.overlay_up = true;
        }
        self.set_state(SessionState::OverlayShown);
    }

    fn enter_active(&mut self) {
        if self.state == SessionState::Active {
            // Duplicate entry signal; all side effects already happened.
            return;
        }
        self.grace_deadline = None;
        self.auto_pending = false;
        if self.overlay_up {
            self.surface.remove_entry_overlay();
            self.overlay_up = false;
        }
        self.quality.on_enter(&mut self.surface);
        self.vignette.on_session_change(true);
        self.set_state(SessionState::Active);
    }

    fn exit_active(&mut self) {
        if self.state != SessionState::Active {
            return;
        }
        self.quality.on_exit(&mut self.surface);
        self.vignette.on_session_change(false);
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, to: SessionState) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        info!(?from, ?to, "session state changed");
        self.transitions.emit(&SessionTransition { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct MockDevice {
        supported: bool,
        auto: bool,
        active: bool,
        requests: u32,
    }

    impl MockDevice {
        fn new() -> MockDevice {
            MockDevice {
                supported: true,
                auto: true,
                active: false,
                requests: 0,
            }
        }
    }

    impl SessionDevice for MockDevice {
        fn request_entry(&mut self) -> bool {
            self.requests += 1;
            self.supported
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn auto_entry_allowed(&self) -> bool {
            self.auto
        }
    }

    #[derive(Default)]
    struct MockSurface {
        overlay_up: bool,
        overlay_shows: u32,
        overlay_removes: u32,
        scales: Vec<f32>,
        anisotropy: Vec<u8>,
    }

    impl ViewSurface for MockSurface {
        fn device_pixel_ratio(&self) -> f32 {
            2.0
        }
        fn default_render_scale(&self) -> f32 {
            1.0
        }
        fn set_render_scale(&mut self, scale: f32) {
            self.scales.push(scale);
        }
        fn set_anisotropy(&mut self, level: u8) {
            self.anisotropy.push(level);
        }
        fn show_entry_overlay(&mut self) {
            assert!(!self.overlay_up, "overlay shown twice");
            self.overlay_up = true;
            self.overlay_shows += 1;
        }
        fn remove_entry_overlay(&mut self) {
            // Tolerates already-removed; only counts real removals.
            if self.overlay_up {
                self.overlay_up = false;
                self.overlay_removes += 1;
            }
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn lifecycle() -> SessionLifecycle<MockDevice, MockSurface> {
        SessionLifecycle::new(
            SessionConfig::default(),
            QualityConfig::default(),
            MockDevice::new(),
            MockSurface::default(),
        )
    }

    #[test]
    fn test_startup_applies_reduced_scale() {
        let lifecycle = lifecycle();
        // dpr 2.0 * initial 0.5.
        assert_eq!(lifecycle.surface().scales, vec![1.0]);
        assert_eq!(lifecycle.state(), SessionState::Idle);
    }

    #[test]
    fn test_automatic_request_after_startup_delay() {
        let mut lifecycle = lifecycle();

        lifecycle.update(ms(0));
        lifecycle.update(ms(100));
        assert_eq!(lifecycle.device().requests, 0);
        assert_eq!(lifecycle.state(), SessionState::Idle);

        lifecycle.update(ms(200));
        assert_eq!(lifecycle.device().requests, 1);
        assert_eq!(lifecycle.state(), SessionState::Requesting);

        // Fires once, not every frame past the deadline.
        lifecycle.update(ms(300));
        assert_eq!(lifecycle.device().requests, 1);
    }

    #[test]
    fn test_already_active_host_synchronizes_at_construction() {
        let mut lifecycle = SessionLifecycle::new(
            SessionConfig::default(),
            QualityConfig::default(),
            MockDevice {
                active: true,
                ..MockDevice::new()
            },
            MockSurface::default(),
        );

        // Entry side effects happen once, with no entry request issued.
        assert_eq!(lifecycle.state(), SessionState::Active);
        assert_eq!(lifecycle.device().requests, 0);
        assert_eq!(lifecycle.surface().anisotropy, vec![8]);
        assert!(lifecycle.vignette().is_visible());

        // The automatic flow stays disarmed afterwards.
        lifecycle.update(ms(1000));
        assert_eq!(lifecycle.device().requests, 0);
    }

    #[test]
    fn test_disabled_automatic_entry_stays_idle_but_absorbs_entered() {
        let mut lifecycle = SessionLifecycle::new(
            SessionConfig {
                enabled: false,
                ..SessionConfig::default()
            },
            QualityConfig::default(),
            MockDevice::new(),
            MockSurface::default(),
        );

        lifecycle.update(ms(1000));
        assert_eq!(lifecycle.device().requests, 0);
        assert_eq!(lifecycle.state(), SessionState::Idle);

        // System-level entry still synchronizes state.
        lifecycle.handle_event(SessionEvent::Entered, ms(1000));
        assert_eq!(lifecycle.state(), SessionState::Active);
        assert_eq!(lifecycle.device().requests, 0);
    }

    #[test]
    fn test_rejection_shows_overlay_exactly_once() {
        let mut lifecycle = lifecycle();
        lifecycle.update(ms(0));
        lifecycle.update(ms(200));

        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Rejected), ms(250));
        assert_eq!(lifecycle.state(), SessionState::OverlayShown);
        assert_eq!(lifecycle.surface().overlay_shows, 1);

        // A second rejection does not rebuild the overlay.
        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Rejected), ms(260));
        assert_eq!(lifecycle.surface().overlay_shows, 1);
    }

    #[test]
    fn test_overlay_retry_reaches_active() {
        let mut lifecycle = lifecycle();
        lifecycle.update(ms(0));
        lifecycle.update(ms(200));
        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Rejected), ms(250));

        lifecycle.overlay_activated(ms(1000));
        assert_eq!(lifecycle.device().requests, 2);
        assert_eq!(lifecycle.state(), SessionState::Requesting);
        // Overlay stays up until the renewed request succeeds.
        assert!(lifecycle.overlay_visible());

        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Succeeded), ms(1100));
        assert_eq!(lifecycle.state(), SessionState::Active);
        assert!(!lifecycle.overlay_visible());
        assert_eq!(lifecycle.surface().overlay_removes, 1);
        assert!(lifecycle.vignette().is_visible());
    }

    #[test]
    fn test_overlay_activation_without_overlay_is_noop() {
        let mut lifecycle = lifecycle();
        lifecycle.overlay_activated(ms(0));
        assert_eq!(lifecycle.device().requests, 0);
        assert_eq!(lifecycle.state(), SessionState::Idle);
    }

    #[test]
    fn test_unsupported_host_falls_back_after_grace() {
        let mut lifecycle = SessionLifecycle::new(
            SessionConfig::default(),
            QualityConfig::default(),
            MockDevice {
                supported: false,
                ..MockDevice::new()
            },
            MockSurface::default(),
        );

        lifecycle.update(ms(0));
        lifecycle.update(ms(200));
        assert_eq!(lifecycle.state(), SessionState::Requesting);

        lifecycle.update(ms(1100));
        assert_eq!(lifecycle.device().requests, 1);
        lifecycle.update(ms(1200));
        assert_eq!(lifecycle.state(), SessionState::OverlayShown);
        assert_eq!(lifecycle.surface().overlay_shows, 1);
    }

    #[test]
    fn test_unsupported_outcome_event_arms_grace() {
        let mut lifecycle = lifecycle();
        lifecycle.update(ms(0));
        lifecycle.update(ms(200));

        lifecycle.handle_event(
            SessionEvent::EntryResolved(EntryOutcome::Unsupported),
            ms(250),
        );
        lifecycle.update(ms(1200));
        assert_eq!(lifecycle.state(), SessionState::Requesting);
        lifecycle.update(ms(1250));
        assert_eq!(lifecycle.state(), SessionState::OverlayShown);
    }

    #[test]
    fn test_external_entered_removes_overlay_without_rerequest() {
        let mut lifecycle = lifecycle();
        lifecycle.update(ms(0));
        lifecycle.update(ms(200));
        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Rejected), ms(250));
        assert!(lifecycle.overlay_visible());

        lifecycle.handle_event(SessionEvent::Entered, ms(500));
        assert_eq!(lifecycle.state(), SessionState::Active);
        assert!(!lifecycle.overlay_visible());
        assert_eq!(lifecycle.surface().overlay_removes, 1);
        assert_eq!(lifecycle.device().requests, 1);

        // A pending grace deadline must not resurrect the overlay.
        lifecycle.update(ms(5000));
        assert_eq!(lifecycle.state(), SessionState::Active);
        assert_eq!(lifecycle.surface().overlay_shows, 1);
    }

    #[test]
    fn test_reentering_active_has_no_duplicate_side_effects() {
        let mut lifecycle = lifecycle();
        lifecycle.handle_event(SessionEvent::Entered, ms(0));
        let scales = lifecycle.surface().scales.clone();
        let anisotropy = lifecycle.surface().anisotropy.clone();

        lifecycle.handle_event(SessionEvent::Entered, ms(10));
        lifecycle.handle_event(SessionEvent::EntryResolved(EntryOutcome::Succeeded), ms(20));
        assert_eq!(lifecycle.surface().scales, scales);
        assert_eq!(lifecycle.surface().anisotropy, anisotropy);
        assert_eq!(lifecycle.surface().overlay_removes, 0);
    }

    #[test]
    fn test_quality_ramp_on_entry_and_revert_on_exit() {
        let mut lifecycle = lifecycle();
        // Startup: 1.0. Entry ramps to min(2.0 * 1.0, 2.0) = 2.0.
        lifecycle.handle_event(SessionEvent::Entered, ms(0));
        assert_eq!(lifecycle.surface().scales, vec![1.0, 2.0]);
        assert_eq!(lifecycle.surface().anisotropy, vec![8]);

        lifecycle.handle_event(SessionEvent::Exited, ms(100));
        assert_eq!(lifecycle.state(), SessionState::Idle);
        assert_eq!(lifecycle.surface().scales, vec![1.0, 2.0, 1.0]);
        assert!(!lifecycle.vignette().is_visible());
    }

    #[test]
    fn test_content_ready_ramps_before_entry() {
        let mut lifecycle = lifecycle();
        lifecycle.handle_event(SessionEvent::ContentReady, ms(50));
        assert_eq!(lifecycle.surface().scales, vec![1.0, 2.0]);

        // Entry does not ramp a second time but still sets anisotropy.
        lifecycle.handle_event(SessionEvent::Entered, ms(100));
        assert_eq!(lifecycle.surface().scales, vec![1.0, 2.0]);
        assert_eq!(lifecycle.surface().anisotropy, vec![8]);
    }

    #[test]
    fn test_exited_while_not_active_is_noop() {
        let mut lifecycle = lifecycle();
        lifecycle.handle_event(SessionEvent::Exited, ms(0));
        assert_eq!(lifecycle.state(), SessionState::Idle);
        assert_eq!(lifecycle.surface().scales, vec![1.0]);
    }

    #[test]
    fn test_transition_listener_and_disposer() {
        let mut lifecycle = lifecycle();
        let log: Rc<RefCell<Vec<SessionTransition>>> = Rc::new(RefCell::new(Vec::new()));

        let log_clone = log.clone();
        let disposer = lifecycle.on_transition(move |transition| {
            log_clone.borrow_mut().push(*transition);
        });

        lifecycle.handle_event(SessionEvent::Entered, ms(0));
        assert_eq!(
            log.borrow().as_slice(),
            &[SessionTransition {
                from: SessionState::Idle,
                to: SessionState::Active,
            }]
        );

        disposer.dispose();
        lifecycle.handle_event(SessionEvent::Exited, ms(100));
        assert_eq!(log.borrow().len(), 1);
    }
}
