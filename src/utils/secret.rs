use std::{env, fs};

use secrecy::SecretString;
use tracing::error;

/// Reads a secret from the file named by `file_env_var_name` if set,
/// otherwise from `env_var_name`.
pub fn get_secret(file_env_var_name: &str, env_var_name: &str) -> Option<SecretString> {
    get_secret_with(|name| env::var(name).ok(), file_env_var_name, env_var_name)
}

/// Same as [`get_secret`], resolving variables through `lookup`.
pub fn get_secret_with(
    lookup: impl Fn(&str) -> Option<String>,
    file_env_var_name: &str,
    env_var_name: &str,
) -> Option<SecretString> {
    if let Some(secret_file_path) = lookup(file_env_var_name) {
        // Found a file path, try to read the file
        match fs::read_to_string(&secret_file_path) {
            Ok(content) => Some(SecretString::from(content.trim().to_string())),
            Err(e) => {
                error!(%secret_file_path, ?e, "Error reading secret file");
                None
            }
        }
    } else {
        lookup(env_var_name).map(SecretString::from)
    }
}
