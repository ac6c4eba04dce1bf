//! Audio recording feature for flashrec.
//!
//! Provides the recorder state machine, the post-recording gain pass, and the
//! device-backed capture and playback used by the terminal host.

pub mod amplify;
pub mod capture;
pub mod devices;
pub mod playback;
pub mod recorder;

pub use amplify::{amplify_wav, AmplifyReport};
pub use capture::AudioCapture;
pub use playback::Player;
pub use recorder::{Recorder, RecorderError, Toggled};
