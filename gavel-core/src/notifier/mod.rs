//! Delivery of announcements, role grants and message removal

mod log;
mod recording;
mod traits;
mod types;

pub use log::LogNotifier;
pub use recording::{NotifierCall, RecordingNotifier};
pub use traits::Notifier;
pub use types::{Announcement, bid_prompt};
