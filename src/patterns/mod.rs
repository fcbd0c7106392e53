pub mod catalog;
pub mod sequence;

pub use catalog::{Catalog, Pattern, PatternKind};
pub use sequence::{effective_sequence, rearm_delay, total_duration_ms};
