//! # coastline-entity
//!
//! Domain entity models for CoastlineVibe: rows of the hosted backend's
//! tables, their status enums, the approval state machine, and the
//! notification kind table.

/// Implements `as_str`, `ALL`, `Display`, and case-insensitive `FromStr`
/// for a fieldless enum stored as text.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as stored in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = coastline_core::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        coastline_core::AppError::validation(format!(
                            "Invalid {}: '{s}'",
                            stringify!($name)
                        ))
                    })
            }
        }
    };
}

pub mod approval;
pub mod community;
pub mod favorite;
pub mod friend;
pub mod inquiry;
pub mod market;
pub mod notification;
pub mod post;
pub mod profile;
pub mod property;
pub mod sticker;
pub mod verification;
