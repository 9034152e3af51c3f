// Sim Runtime - headless scripted run of the locomotion and session core
//
// Drives the rig controllers and the session lifecycle against a simulated
// host: a scripted input tape, a session device that rejects the first
// entry request (gesture policy) and accepts the retry, and a surface that
// logs overlay and render-scale changes instead of rendering.

use std::time::Duration;

use anyhow::Context;
use cgmath::vec3;
use clap::Parser;
use tracing::{info, Level};

use engine::input::{InputContext, InputEvent};
use engine::logging::{get_log_config, init_logging};
use engine::time::FrameClock;
use scenevr::{
    EntryOutcome, RigSystems, SceneOptions, SessionDevice, SessionEvent, SessionLifecycle,
    ViewSurface,
};

#[derive(Parser)]
#[command(name = "sim_runtime")]
#[command(about = "Headless scripted run of the VR locomotion core")]
struct Args {
    /// Number of frames to simulate
    #[arg(short, long, default_value = "300")]
    frames: u64,

    /// Milliseconds per simulated frame
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Scene options as a JSON file; defaults apply for missing fields
    #[arg(short, long)]
    config: Option<String>,

    /// Simulate a host whose entry API has no asynchronous result
    #[arg(long)]
    unsupported_host: bool,
}

/// Session device with a scripted gesture policy: the automatic request is
/// rejected, a request born from the overlay gesture succeeds.
struct SimDevice {
    supported: bool,
    requests: u32,
    active: bool,
    /// Frames until the pending request resolves.
    pending: Option<u32>,
}

impl SimDevice {
    fn new(supported: bool) -> SimDevice {
        SimDevice {
            supported,
            requests: 0,
            active: false,
            pending: None,
        }
    }

    /// Advance the simulated host by one frame.
    fn step(&mut self) -> Vec<SessionEvent> {
        let Some(frames_left) = self.pending else {
            return Vec::new();
        };
        if frames_left > 0 {
            self.pending = Some(frames_left - 1);
            return Vec::new();
        }
        self.pending = None;

        if self.requests == 1 {
            info!("host: entry request denied pending user gesture");
            vec![SessionEvent::EntryResolved(EntryOutcome::Rejected)]
        } else {
            info!("host: entry request granted");
            self.active = true;
            // The host also fires its own "entered" notification; the
            // lifecycle must absorb the duplicate.
            vec![
                SessionEvent::EntryResolved(EntryOutcome::Succeeded),
                SessionEvent::Entered,
            ]
        }
    }
}

impl SessionDevice for SimDevice {
    fn request_entry(&mut self) -> bool {
        self.requests += 1;
        if self.supported {
            self.pending = Some(5);
        }
        self.supported
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn auto_entry_allowed(&self) -> bool {
        true
    }
}

/// Surface that logs effects instead of rendering them.
struct SimSurface {
    overlay_up: bool,
    render_scale: f32,
}

impl SimSurface {
    fn new() -> SimSurface {
        SimSurface {
            overlay_up: false,
            render_scale: 1.0,
        }
    }
}

impl ViewSurface for SimSurface {
    fn device_pixel_ratio(&self) -> f32 {
        2.0
    }

    fn default_render_scale(&self) -> f32 {
        1.0
    }

    fn set_render_scale(&mut self, scale: f32) {
        info!(scale, "surface: render scale set");
        self.render_scale = scale;
    }

    fn set_anisotropy(&mut self, level: u8) {
        info!(level, "surface: anisotropy elevated");
    }

    fn show_entry_overlay(&mut self) {
        info!("surface: entry overlay shown");
        self.overlay_up = true;
    }

    fn remove_entry_overlay(&mut self) {
        if self.overlay_up {
            info!("surface: entry overlay removed");
            self.overlay_up = false;
        }
    }
}

/// Scripted input tape: (timestamp ms, event).
fn input_tape() -> Vec<(u64, InputEvent)> {
    vec![
        // Arm walking with a click, walk for a second.
        (500, InputEvent::Click),
        // Snap right twice; the second press lands inside the cooldown.
        (1600, InputEvent::KeyTurn { direction: 1 }),
        (1650, InputEvent::KeyTurn { direction: 1 }),
        // Teleport to a nav target, superseded mid-flight by another.
        (2000, InputEvent::Teleport {
            target: vec3(4.0, 0.0, -4.0),
            duration: Duration::from_millis(800),
        }),
        (2400, InputEvent::Teleport {
            target: vec3(-2.0, 0.0, -6.0),
            duration: Duration::from_millis(400),
        }),
        // Thumbstick turn left after the cooldown has long expired.
        (3200, InputEvent::TurnAxis { x: -1.0 }),
    ]
}

fn main() -> anyhow::Result<()> {
    init_logging("SCENEVR_LOG");

    let args = Args::parse();

    let options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scene options from {path}"))?;
            SceneOptions::from_json(&json).context("parsing scene options")?
        }
        None => SceneOptions::default(),
    };
    let options = options.validated().context("validating scene options")?;

    info!(
        frames = args.frames,
        frame_ms = args.frame_ms,
        "starting simulated run"
    );

    let mut systems = RigSystems::new(&options);
    let mut lifecycle = SessionLifecycle::new(
        options.session.clone(),
        options.quality.clone(),
        SimDevice::new(!args.unsupported_host),
        SimSurface::new(),
    );

    let transition_log = lifecycle.on_transition(|transition| {
        info!(from = ?transition.from, to = ?transition.to, "session transition");
    });

    let mut clock = FrameClock::new();
    let tape = input_tape();
    let mut tape_cursor = 0;
    let mut content_ready_sent = false;
    let mut overlay_gesture_sent = false;

    for frame in 0..args.frames {
        let now_ms = frame * args.frame_ms;
        let time = clock.tick(Duration::from_millis(now_ms));

        // Drain scripted events that fell inside this frame, in tape order.
        let mut events = Vec::new();
        while tape_cursor < tape.len() && tape[tape_cursor].0 <= now_ms {
            events.push(tape[tape_cursor].1);
            tape_cursor += 1;
        }

        // Content finishes loading partway through the run.
        if !content_ready_sent && now_ms >= 1000 {
            content_ready_sent = true;
            lifecycle.handle_event(SessionEvent::ContentReady, time.total);
        }

        // The simulated user taps the overlay's control shortly after it
        // appears.
        if lifecycle.overlay_visible() && !overlay_gesture_sent && now_ms >= 1200 {
            overlay_gesture_sent = true;
            info!("user: overlay control activated");
            lifecycle.overlay_activated(time.total);
        }

        for event in lifecycle.device_mut().step() {
            lifecycle.handle_event(event, time.total);
        }
        lifecycle.update(time.total);

        let session_active = lifecycle.is_session_active();
        systems.update(&time, &InputContext::default(), &events, session_active);

        if get_log_config().should_log("frames", Level::DEBUG) {
            let rig = systems.rig();
            tracing::debug!(
                frame,
                x = rig.position.x,
                y = rig.position.y,
                z = rig.position.z,
                yaw = rig.yaw.0,
                "frame state"
            );
        }
    }

    transition_log.dispose();

    let rig = systems.rig();
    info!(
        x = rig.position.x,
        y = rig.position.y,
        z = rig.position.z,
        yaw = rig.yaw.0,
        state = ?lifecycle.state(),
        vignette = lifecycle.vignette().is_visible(),
        "run complete"
    );

    Ok(())
}
