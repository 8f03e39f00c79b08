//! Audio input: decoding, external conversion and normalization.

pub mod convert;
pub mod normalize;
pub mod wav;

pub use convert::{AudioConverter, FfmpegConverter};
pub use normalize::AudioNormalizer;
pub use wav::AudioBuffer;
