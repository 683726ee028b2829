use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;
use std::fmt;

pub type UserId = i64;
pub type SessionId = i64;
pub type EpochMillis = i64;

/// Accepts `12`, `12.0`, `"12"`; `null` and `""` become `None`.
pub fn deserialize_optional_flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionalFlexibleI64Visitor;
    impl<'de> Visitor<'de> for OptionalFlexibleI64Visitor {
        type Value = Option<i64>;
        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("integer, null, empty string, or string int")
        }

        #[inline]
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }
        #[inline]
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(v)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }
        #[inline]
        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                Ok(Some(v as i64))
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &"whole number"))
            }
        }
        #[inline]
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let t = v.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<i64>()
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &"string int"))
        }
        #[inline]
        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
        #[inline]
        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }
    deserializer.deserialize_any(OptionalFlexibleI64Visitor)
}

/// Like [`deserialize_optional_flexible_i64`] but the value must be present.
pub fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_flexible_i64(deserializer)?
        .ok_or_else(|| de::Error::invalid_value(Unexpected::Unit, &"integer"))
}

/// Accepts numbers and numeric strings; `null`, `""` and `NaN` become `None`.
pub fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OptionalF64Visitor;
    impl<'de> Visitor<'de> for OptionalF64Visitor {
        type Value = Option<f64>;
        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("number, null, or numeric string")
        }
        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v).filter(|v| v.is_finite()))
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let t = v.trim();
            if t.is_empty() {
                return Ok(None);
            }
            t.parse::<f64>()
                .map(|v| Some(v).filter(|v| v.is_finite()))
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }
    deserializer.deserialize_any(OptionalF64Visitor)
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(deserializer)?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_optional_flexible_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_optional_f64")]
        length: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        name: Option<String>,
    }

    #[test]
    fn user_ids_arrive_as_strings_or_blanks() {
        let p: Probe = serde_json::from_str(r#"{"id": "39", "length": 218.93, "name": "x"}"#).unwrap();
        assert_eq!(p.id, Some(39));
        assert_eq!(p.length, Some(218.93));
        assert_eq!(p.name.as_deref(), Some("x"));

        let p: Probe = serde_json::from_str(r#"{"id": "", "length": null, "name": "  "}"#).unwrap();
        assert_eq!(p.id, None);
        assert_eq!(p.length, None);
        assert_eq!(p.name, None);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let r: Result<Probe, _> = serde_json::from_str(r#"{"id": "abc"}"#);
        assert!(r.is_err());
    }
}
