//! # Utility Modules
//!
//! This module contains utility functions, constants, and validators used
//! throughout the application.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide configuration constants
//! - **HTML** (`html`) - HTML bodies for outgoing emails
//! - **Secrets** (`secret`) - Secret loading from files or environment variables
//! - **Static objects** (`static_object`) - Lazily initialized, environment-driven values
//! - **Validators** (`validator`) - Custom field validators

pub mod constant;
pub mod html;
pub mod secret;
pub mod static_object;
pub mod validator;
