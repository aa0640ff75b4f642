use std::env;
use std::sync::LazyLock;

use regex::Regex;
use tracing::error;

/// Landing page for password reset links; the token is appended as `?token=`.
pub static RESET_PASSWORD_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("RESET_PASSWORD_URL").unwrap_or_else(|_| {
        error!("Missing RESET_PASSWORD_URL env var, using fallback 'https://tutorme-client.vercel.app/reset-password'");
        "https://tutorme-client.vercel.app/reset-password".to_string()
    })
});

/// Landing page for email verification links; the token is appended as `?token=`.
pub static VERIFY_EMAIL_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("VERIFY_EMAIL_URL").unwrap_or_else(|_| {
        error!("Missing VERIFY_EMAIL_URL env var, using fallback 'http://link-to-app/verify-email'");
        "http://link-to-app/verify-email".to_string()
    })
});

/// Phone numbers accepted on tutor requests: local `0XXXXXXXXX` or
/// international `+94XXXXXXXXX`, with optional spaces or dashes.
pub static PHONE_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+94|0)[0-9]{2}[ -]?[0-9]{3}[ -]?[0-9]{4}$").unwrap_or_else(|e| {
        error!("Failed to compile phone number regex: {}", e);
        std::process::exit(1);
    })
});
