pub mod interview_request;
pub mod time_slot;

pub use interview_request::InterviewRequest;
pub use time_slot::{SlotStatus, TimeSlot};
