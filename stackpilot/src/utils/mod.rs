//! Utility functions for clocks, timestamps and structured text.

mod clock;
pub mod structured;
pub mod timestamps;

pub use clock::{Clock, ManualClock, SystemClock};
pub use structured::{is_inline_document, parse_structured};
pub use timestamps::{clock_time, Timestamp};
