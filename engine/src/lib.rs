pub mod events;
pub mod input;
pub mod logging;
pub mod time;

pub use events::{Disposer, Listeners};
pub use input::{Head, InputContext, InputEvent};
pub use time::{FrameClock, Time};
