pub mod renderer;
pub mod wav;

pub use renderer::{export_wav, mix_source, ExportRequest, OfflineRenderer, RenderedMix};
pub use wav::{encode_wav, write_wav};
