use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(
    /// Triage severity, lowest to highest.
    Severity {
        Stable => "stable",
        Urgent => "urgent",
        Emergency => "emergency",
    }
);

str_enum!(
    /// Why the differential came from a canned payload instead of the model.
    FallbackKind {
        Unconfigured => "unconfigured",
        Exhausted => "exhausted",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips_through_str() {
        for sev in [Severity::Stable, Severity::Urgent, Severity::Emergency] {
            assert_eq!(sev.as_str().parse::<Severity>().unwrap(), sev);
        }
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Emergency).unwrap();
        assert_eq!(json, "\"emergency\"");
    }

    #[test]
    fn unknown_severity_is_invalid_enum() {
        let err = "critical".parse::<Severity>().unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }
}
