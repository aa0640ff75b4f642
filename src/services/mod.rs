//! # Business Logic Services
//!
//! This module contains the core business logic services for the TutorMe backend.
//! Services encapsulate domain-specific functionality and provide clean interfaces
//! for use by HTTP handlers and other application components.
//!
//! ## Available Services
//!
//! - **Email** (`email`) - Email delivery transports with multiple implementations
//! - **Mailer** (`mailer`) - Templated notifications built on an email transport
//! - **Tutor Request** (`tutor_request`) - Tutor request lifecycle over a store

pub mod email;
pub mod mailer;
pub mod tutor_request;
