//! Data model: the upstream record shape, the per-ward aggregation and the
//! query date window.

mod record;
mod report;
mod window;

pub use record::{CollectionRecord, UNKNOWN_WARD};
pub use report::{WardReport, WardSummary};
pub use window::{QueryWindow, DATE_FORMAT};
