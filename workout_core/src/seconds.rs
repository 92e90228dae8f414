//! Serde helpers for durations in whole seconds.
//!
//! Exports from JavaScript tools often write integral durations as floats
//! (`180.0`). These accept any JSON number that is a non-negative whole
//! value fitting in a `u32` and reject everything else with a message
//! naming the offending value.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

struct Seconds(u32);

struct SecondsVisitor;

impl<'de> Visitor<'de> for SecondsVisitor {
    type Value = Seconds;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative whole number of seconds")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Seconds, E> {
        u32::try_from(v)
            .map(Seconds)
            .map_err(|_| E::custom(format!("duration {} is out of range", v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Seconds, E> {
        u32::try_from(v)
            .map(Seconds)
            .map_err(|_| E::custom(format!("duration {} must be non-negative", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Seconds, E> {
        if v.fract() != 0.0 {
            return Err(E::custom(format!("duration {} is not a whole number of seconds", v)));
        }
        if v < 0.0 {
            return Err(E::custom(format!("duration {} must be non-negative", v)));
        }
        if v > f64::from(u32::MAX) {
            return Err(E::custom(format!("duration {} is out of range", v)));
        }
        Ok(Seconds(v as u32))
    }
}

impl<'de> Deserialize<'de> for Seconds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SecondsVisitor)
    }
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Seconds::deserialize(deserializer).map(|s| s.0)
}

pub(crate) mod option {
    use super::Seconds;
    use serde::{Deserialize, Deserializer};

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        Option::<Seconds>::deserialize(deserializer).map(|s| s.map(|s| s.0))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Timed {
        #[serde(deserialize_with = "super::deserialize")]
        duration: u32,
        #[serde(default, deserialize_with = "super::option::deserialize")]
        rest_after: Option<u32>,
    }

    fn parse(value: serde_json::Value) -> Result<Timed, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_accepts_integers_and_whole_floats() {
        let timed = parse(json!({ "duration": 180.0, "rest_after": 30 })).unwrap();
        assert_eq!(timed.duration, 180);
        assert_eq!(timed.rest_after, Some(30));

        let timed = parse(json!({ "duration": 45, "rest_after": 15.0 })).unwrap();
        assert_eq!(timed.duration, 45);
        assert_eq!(timed.rest_after, Some(15));
    }

    #[test]
    fn test_optional_missing_or_null() {
        assert_eq!(parse(json!({ "duration": 1 })).unwrap().rest_after, None);
        assert_eq!(
            parse(json!({ "duration": 1, "rest_after": null })).unwrap().rest_after,
            None
        );
    }

    #[test]
    fn test_rejects_fractional_negative_and_oversized() {
        let err = parse(json!({ "duration": 12.5 })).unwrap_err();
        assert!(err.to_string().contains("not a whole number"));

        let err = parse(json!({ "duration": -5 })).unwrap_err();
        assert!(err.to_string().contains("non-negative"));

        let err = parse(json!({ "duration": -5.0 })).unwrap_err();
        assert!(err.to_string().contains("non-negative"));

        let err = parse(json!({ "duration": 5_000_000_000u64 })).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        assert!(parse(json!({ "duration": "60" })).is_err());
    }
}
