//! Newtype IDs for type-safe entity references.
//!
//! The remote API issues opaque string identifiers (document ids). Use the
//! `define_id!` macro to wrap them so an admin id can never be passed where
//! an alert id is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use dvs_core::define_id;
/// define_id!(SchoolId);
/// define_id!(TeacherId);
///
/// let school = SchoolId::new("64f0c2");
/// assert_eq!(school.as_str(), "64f0c2");
///
/// // These are different types, so this won't compile:
/// // let _: TeacherId = school;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the id is blank (absent in the API response).
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(SuperAdminId);
define_id!(AdminId);
define_id!(SchoolId);
define_id!(ThirdPartyId);
define_id!(AlertId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = AdminId::new("65a1f");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65a1f\"");

        let back: AdminId = serde_json::from_str("\"65a1f\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(AlertId::default().is_empty());
        assert!(AlertId::new("  ").is_empty());
        assert!(!AlertId::new("a1").is_empty());
    }

    #[test]
    fn test_display_matches_inner() {
        let id = SuperAdminId::from("s1");
        assert_eq!(id.to_string(), "s1");
    }
}
