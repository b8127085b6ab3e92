//! Notification infrastructure module

mod noop;
mod notify_rust;

pub use noop::NoopNotifier;
pub use notify_rust::NotifyRustNotifier;

use crate::application::ports::Notifier;

/// Create the notifier for the current settings
pub fn create_notifier(enabled: bool) -> Box<dyn Notifier> {
    if enabled {
        Box::new(NotifyRustNotifier::new())
    } else {
        Box::new(NoopNotifier)
    }
}
