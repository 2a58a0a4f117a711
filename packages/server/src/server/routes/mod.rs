pub mod health;
pub mod requests;
pub mod stream;

pub use health::health_handler;
pub use requests::{reject_interview_handler, replace_slots_handler, submit_request_handler};
pub use stream::stream_handler;
