//! Notifier used when desktop notifications are switched off

use async_trait::async_trait;

use crate::application::ports::{NotificationError, NotificationIcon, Notifier};

pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(
        &self,
        _title: &str,
        _message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}
