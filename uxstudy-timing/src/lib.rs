pub mod oneshot;
pub mod timer;

pub use oneshot::{OneShot, Ticket};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};
