pub mod clip;
pub mod store;

pub use clip::{decode_wav, AudioClip, ClipData};
pub use store::{ClipProvider, ClipStore, SynthesisStatus};
