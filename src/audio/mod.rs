pub mod accumulator;
pub mod marker;
pub mod wav;

pub use accumulator::AudioAccumulator;
pub use marker::{Detection, FrameDetector};
pub use wav::{AudioFormat, WavContainer, WAV_HEADER_LEN};
