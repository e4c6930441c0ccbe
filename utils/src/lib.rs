pub mod audio;
pub mod capture;
pub mod frame;

#[cfg(feature = "microphone")]
pub mod device;
#[cfg(feature = "microphone")]
pub mod microphone;

pub use audio::{audio_tap, AudioChunk, AudioFeed, AudioTap, DropReporter, TapSource};
pub use capture::{CaptureDevice, CaptureSource};
pub use frame::{EncodedFrame, FrameDirectory};
