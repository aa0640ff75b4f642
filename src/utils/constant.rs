//! # Application Constants
//!
//! This module defines configuration constants used throughout the application.

/// Page size used when a listing request does not specify `limit`.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Upper bound for `limit` on listing requests.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Number of tutor blocks detailed in the acknowledgement email.
/// Requests with more blocks still report the full count.
pub const MAX_ACKNOWLEDGED_TUTOR_BLOCKS: usize = 4;

/// Address the server binds to when `LISTEN_ADDR` is not set.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8090";
