//! Video frames and encoding

pub mod encoder;
pub mod format;
pub mod frame;

pub use encoder::{SdpVideoFormat, VideoEncoder, VideoEncoderFactory};
pub use format::Resolution;
pub use frame::VideoFrame;
