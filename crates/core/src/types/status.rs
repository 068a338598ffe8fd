//! Enumerations shared by the console and the remote API.
//!
//! Wire values are lowercase strings (`"info"`, `"high"`, `"parents"`, ...).
//! Each enum exposes `ALL` in display order so forms can render their
//! select options without repeating the variant list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a wire value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident,
        { $($variant:ident => ($wire:literal, $label:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl $name {
            /// All variants in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Lowercase value used on the wire and in query strings.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Human readable label for forms and tables.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Visual category of a global alert.
    AlertType, "alert type", default = Info,
    {
        Info => ("info", "Information"),
        Warning => ("warning", "Warning"),
        Error => ("error", "Error"),
        Success => ("success", "Success"),
    }
);

wire_enum!(
    /// How prominently dashboards surface an alert.
    AlertPriority, "alert priority", default = Medium,
    {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
    }
);

wire_enum!(
    /// Which tenant users an alert is shown to.
    TargetAudience, "target audience", default = All,
    {
        All => ("all", "All Users"),
        Admins => ("admins", "School Admins"),
        Teachers => ("teachers", "Teachers"),
        Parents => ("parents", "Parents"),
    }
);

wire_enum!(
    /// Account status used by bulk activate/deactivate.
    AccountStatus, "account status", default = Active,
    {
        Active => ("active", "Active"),
        Inactive => ("inactive", "Inactive"),
    }
);

/// Role of the operator signed into the console.
///
/// Only super administrators can sign in today; the value is still carried
/// in the session so the dashboard can display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConsoleRole {
    /// Top-level operator managing admins, third-party users and alerts.
    #[default]
    SuperAdmin,
}

impl fmt::Display for ConsoleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperAdmin => f.write_str("SuperAdmin"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WARNING".parse::<AlertType>().unwrap(), AlertType::Warning);
        assert_eq!(" high ".parse::<AlertPriority>().unwrap(), AlertPriority::High);
        assert_eq!("Inactive".parse::<AccountStatus>().unwrap(), AccountStatus::Inactive);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "urgent".parse::<AlertPriority>().unwrap_err();
        assert_eq!(err.to_string(), "invalid alert priority: urgent");
    }

    #[test]
    fn test_wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&TargetAudience::Teachers).unwrap(),
            "\"teachers\""
        );
        let parsed: AlertType = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, AlertType::Success);
    }

    #[test]
    fn test_defaults_match_new_alert_form() {
        assert_eq!(AlertType::default(), AlertType::Info);
        assert_eq!(AlertPriority::default(), AlertPriority::Medium);
        assert_eq!(TargetAudience::default(), TargetAudience::All);
    }

    #[test]
    fn test_all_lists_every_variant_in_order() {
        let labels: Vec<&str> = TargetAudience::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["All Users", "School Admins", "Teachers", "Parents"]);
    }

    #[test]
    fn test_console_role_display() {
        assert_eq!(ConsoleRole::SuperAdmin.to_string(), "SuperAdmin");
    }
}
