use crate::error::Error;
use events::{Notification, NotificationKind};
use hub::broadcast::generate_notification_id;
use serde::Deserialize;
use utoipa::ToSchema;

const DEFAULT_DURATION_SECS: u32 = 5;

/// A notification raised by an operator from the admin panel.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    #[serde(rename = "type")]
    pub(crate) kind: NotificationKind,
    pub(crate) title: String,
    pub(crate) message: String,
    /// Seconds to display; defaults to 5.
    pub(crate) duration: Option<u32>,
    /// Keep the notification until dismissed, overriding `duration`.
    #[serde(default)]
    pub(crate) persistent: bool,
}

impl CreateParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::invalid("Notification title must not be empty"));
        }
        if self.message.trim().is_empty() {
            return Err(Error::invalid("Notification message must not be empty"));
        }
        Ok(())
    }

    pub(crate) fn into_notification(self) -> Notification {
        let duration = if self.persistent {
            0
        } else {
            self.duration.unwrap_or(DEFAULT_DURATION_SECS)
        };

        Notification {
            id: generate_notification_id(),
            kind: self.kind,
            title: self.title,
            message: self.message,
            duration,
            actions: Vec::new(),
        }
    }
}
