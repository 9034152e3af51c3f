// VR locomotion and immersive-session core.
//
// Moves a viewer's rig through a scene (eased teleport, continuous walk,
// debounced snap turns) and manages entry into the host's immersive mode
// with a gesture-fallback overlay and a render-quality ramp. Everything is
// single-threaded and frame-driven; the rig transform is the only shared
// mutable state, and each controller owns a disjoint slice of it.

pub mod config;
pub mod rig;
pub mod session;
pub mod snap_turn;
pub mod system;
pub mod teleport;
pub mod walk;

pub use config::{
    ConfigError, QualityConfig, SceneOptions, SessionConfig, SnapTurnConfig, WalkConfig,
};
pub use rig::RigTransform;
pub use session::{
    EntryOutcome, SessionDevice, SessionEvent, SessionLifecycle, SessionState, SessionTransition,
    ViewSurface,
};
pub use snap_turn::{SnapTurnController, TurnVignette};
pub use system::RigSystems;
pub use teleport::TeleportController;
pub use walk::WalkController;
