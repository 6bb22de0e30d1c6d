pub mod recording;
pub mod sink;

pub use recording::{RecordingSink, SinkCall};
pub use sink::{PlaybackSink, TracingSink};
