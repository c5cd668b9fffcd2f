//! Credential source backed by the process environment.

use crate::ports::CredentialSource;

/// Reads credentials from the process environment on every lookup.
///
/// Nothing is cached: a variable exported after startup is seen by the
/// next request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl CredentialSource for ProcessEnvironment {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
