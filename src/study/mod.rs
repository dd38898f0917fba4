//! Flip-card study sessions with auto-play

pub mod driver;
pub mod session;

pub use driver::SessionDriver;
pub use session::{Effect, StudyEvent, StudySession};
