//! Macro for implementing Display and FromStr for wire-level status enums
//!
//! The API reports statuses as lowercase strings. This macro keeps the
//! string mapping in one place for both directions.
//!
//! # Example
//!
//! ```rust
//! use nimbus_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum VolumeStatus {
//!     Creating,
//!     Available,
//! }
//!
//! impl_status_conversions!(VolumeStatus {
//!     Creating => "creating",
//!     Available => "available",
//! });
//!
//! assert_eq!(VolumeStatus::Available.to_string(), "available");
//! assert_eq!("CREATING".parse::<VolumeStatus>(), Ok(VolumeStatus::Creating));
//! ```

/// Implements Display and FromStr for status enums
///
/// Parsing is case-insensitive; display is the exact mapped string.
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
