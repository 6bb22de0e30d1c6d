pub mod cursor;
pub mod edit;
pub mod segment;

pub use cursor::SegmentCursor;
pub use edit::{retime_segment, split_segment, SplitOutcome};
pub use segment::{Segment, Timeline};
