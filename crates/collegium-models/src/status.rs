//! String-backed status and role enumerations.
//!
//! Every enum here travels as plain text in the database and over serde, so
//! each one carries a canonical lowercase wire form plus parsing that accepts
//! any casing. Unknown values are rejected at the boundary rather than mapped
//! to a default.

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;

/// Error type for status parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusParseError {
    /// The role name is not recognized.
    UnknownRole(String),
    /// The attendance status is not recognized.
    UnknownAttendanceStatus(String),
    /// The result status is not recognized.
    UnknownResultStatus(String),
    /// The fee status is not recognized.
    UnknownFeeStatus(String),
    /// The routine kind is not recognized.
    UnknownRoutineKind(String),
}

impl std::error::Error for StatusParseError {}

impl fmt::Display for StatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRole(v) => write!(f, "'{}' is not a recognized role", v),
            Self::UnknownAttendanceStatus(v) => {
                write!(f, "'{}' is not a recognized attendance status", v)
            }
            Self::UnknownResultStatus(v) => {
                write!(f, "'{}' is not a recognized result status", v)
            }
            Self::UnknownFeeStatus(v) => write!(f, "'{}' is not a recognized fee status", v),
            Self::UnknownRoutineKind(v) => write!(f, "'{}' is not a recognized routine kind", v),
        }
    }
}

/// Macro to define a string-backed status enum.
///
/// Generates the enum plus the parsing, display, serde, and database codec
/// implementations so every status type behaves identically at the edges.
macro_rules! define_status {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// All variants, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            /// Canonical lowercase wire form.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StatusParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(StatusParseError::$err(s.to_string())),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        // Serde Deserialize with validation
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        // SQLx Type implementation for Postgres
        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        // SQLx Encode implementation
        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        // SQLx Decode implementation
        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        // SQLx array type support for Postgres
        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_status!(
    /// Authorization role attached to a login account.
    ///
    /// Students, faculty, and librarians additionally own a profile row of
    /// the matching kind; admins are account-only.
    Role, UnknownRole {
        Admin => "admin",
        Student => "student",
        Faculty => "faculty",
        Librarian => "librarian",
    }
);

impl Role {
    /// Roles that carry a paired profile record.
    pub fn has_profile(&self) -> bool {
        !matches!(self, Self::Admin)
    }
}

define_status!(
    /// Outcome recorded for one student on one course day.
    AttendanceStatus, UnknownAttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
);

define_status!(
    /// Standing assigned to a graded course result.
    ResultStatus, UnknownResultStatus {
        Pass => "pass",
        Fail => "fail",
        Incomplete => "incomplete",
    }
);

define_status!(
    /// Lifecycle state of a fee entry.
    FeeStatus, UnknownFeeStatus {
        Due => "due",
        Overdue => "overdue",
        Paid => "paid",
        Waived => "waived",
    }
);

impl FeeStatus {
    /// Settled fees accept no further transitions.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::Waived)
    }

    /// Whether a fee in this state may move to `next`.
    ///
    /// Open fees (due, overdue) may settle or escalate; settled fees are
    /// terminal.
    pub fn can_transition_to(&self, next: FeeStatus) -> bool {
        match self {
            Self::Due => matches!(next, Self::Overdue | Self::Paid | Self::Waived),
            Self::Overdue => matches!(next, Self::Paid | Self::Waived),
            Self::Paid | Self::Waived => false,
        }
    }
}

define_status!(
    /// Kind of scheduled routine slot.
    RoutineKind, UnknownRoutineKind {
        Class => "class",
        Exam => "exam",
    }
);
