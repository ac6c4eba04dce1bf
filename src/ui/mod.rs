//! Terminal user interface for the recording session.

pub mod screen;
pub mod session;

pub use screen::Screen;
pub use session::{SessionView, Toast};
