pub mod cleanup;
pub mod email_client;
pub mod session_registry;
pub mod test_dependencies;
pub mod traits;
pub mod web_push_client;

pub use cleanup::{run_expiry_cleanup, start_cleanup_scheduler, CleanupStats};
pub use email_client::EmailClient;
pub use session_registry::{PushFrame, PushSession, SessionRegistry};
pub use traits::{BaseEmailService, BaseWebPushService};
pub use web_push_client::WebPushClient;
