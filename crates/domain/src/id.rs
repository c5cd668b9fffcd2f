//! Typed identifier newtypes backed by UUIDs.
//!
//! Identifiers only correlate diagnostics; they never appear on the output
//! channel.

use std::fmt;

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id!(
    /// Identifier of one accepted input line.
    RequestId
);

define_id!(
    /// Identifier of one automation session.
    SessionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_display_as_hyphenated_uuid() {
        let rendered = SessionId::new().to_string();
        assert_eq!(rendered.len(), 36);
        assert!(uuid::Uuid::parse_str(&rendered).is_ok());
    }
}
