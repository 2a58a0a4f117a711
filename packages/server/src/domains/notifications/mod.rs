pub mod channels;
pub mod dispatcher;
pub mod models;
pub mod types;

// Re-export commonly used types
pub use channels::{ChannelKind, NotificationChannel};
pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use types::{NotificationPayload, NotificationRequest, NotificationType, Recipient};
