//! Credential port — where session secrets are looked up.

use std::collections::HashMap;
use std::sync::Arc;

/// Looks up a secret by its environment variable name.
pub trait CredentialSource: Send + Sync {
    /// Return the value for `key`, or `None` when it is not set.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: CredentialSource> CredentialSource for Arc<T> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}
