//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the TutorMe backend.
//! Each handler is responsible for processing specific HTTP requests and returning
//! appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Tutor Request** (`tutor_request`) - Tutor request lifecycle endpoints

mod health_check;
mod tutor_request;

pub use health_check::*;
pub use tutor_request::*;
