//! The timestamp layout Asterisk uses on every event: `2024-01-02T03:04:05.123+0000`.
//!
//! Millisecond precision and a numeric `±HHMM` offset are mandatory. Anything else (a `Z`
//! suffix, a colon in the offset, a different number of fractional digits) is rejected rather
//! than coerced.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// `chrono` format string for the event timestamp layout.
pub const LAYOUT: &str = "%Y-%m-%dT%H:%M:%S.%3f%z";

/// Shape of a conforming timestamp: `d` is an ASCII digit, `s` the offset sign, anything else is
/// a literal separator.
const SHAPE: &[u8; 28] = b"dddd-dd-ddTdd:dd:dd.dddsdddd";

/// Byte range of the seconds field.
const SECONDS: std::ops::Range<usize> = 17..19;

/// Error returned when a timestamp does not follow [`LAYOUT`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimestamp {
    pub input: String,
}

impl fmt::Display for InvalidTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp {:?} does not match layout YYYY-MM-DDTHH:MM:SS.mmm±HHMM",
            self.input
        )
    }
}

impl std::error::Error for InvalidTimestamp {}

/// Parse a timestamp in the fixed event layout.
pub fn parse(input: &str) -> Result<DateTime<FixedOffset>, InvalidTimestamp> {
    let invalid = || InvalidTimestamp {
        input: input.to_owned(),
    };

    // chrono also accepts signed years, `+00:00` offsets and leap seconds
    if !has_shape(input.as_bytes()) || input.as_bytes().get(SECONDS) == Some(&b"60"[..]) {
        return Err(invalid());
    }

    DateTime::parse_from_str(input, LAYOUT).map_err(|_e| invalid())
}

fn has_shape(bytes: &[u8]) -> bool {
    bytes.len() == SHAPE.len()
        && bytes.iter().zip(SHAPE).all(|(&byte, &expected)| match expected {
            b'd' => byte.is_ascii_digit(),
            b's' => matches!(byte, b'+' | b'-'),
            literal => byte == literal,
        })
}

/// Render a timestamp in the fixed event layout.
#[must_use]
pub fn format(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format(LAYOUT).to_string()
}

/// `serde` adapter for `Option<DateTime<FixedOffset>>` fields in the event layout.
///
/// `null` and absent fields decode to `None`; a present string that does not match the layout
/// fails the enclosing object.
pub mod option {
    use super::{DateTime, Deserializer, FixedOffset, Serializer, Visitor, de, fmt};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = Option<DateTime<FixedOffset>>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a timestamp string like 2024-01-02T03:04:05.123+0000")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                super::parse(v).map(Some).map_err(E::custom)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_str(self)
            }
        }

        deserializer.deserialize_option(TimestampVisitor)
    }

    #[expect(
        clippy::ref_option,
        reason = "serde's `serialize_with` hands the field over by reference"
    )]
    pub fn serialize<S>(
        timestamp: &Option<DateTime<FixedOffset>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match timestamp {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }
}
