// Peerprep - API Core
//
// This crate provides the backend API for matching interview candidates with
// interviewers by availability and mastery level. Matching, slot lifecycle,
// expiry cleanup and notification fan-out live in domains/ and kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
