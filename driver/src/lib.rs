use error_stack::{Report, ResultExt};
use std::str::FromStr;

use kernel::KernelError;

pub mod database;
mod error;

pub(crate) fn env(key: &str) -> Option<String> {
    dotenvy::var(key).ok()
}

/// Reads `key` from the environment, falling back to `default` when unset.
pub fn env_or<T>(key: &str, default: T) -> error_stack::Result<T, KernelError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(Report::from)
            .change_context_lazy(|| KernelError::Internal)
            .attach_printable_lazy(|| format!("Invalid value for {key}: {raw}")),
    }
}
