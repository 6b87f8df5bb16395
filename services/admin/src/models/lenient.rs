//! Form-style deserializers for admin payloads
//!
//! Admin forms send ids either as JSON numbers or as numeric strings, and
//! blank strings for unset selects. These helpers accept the same shapes the
//! request validator does.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use std::fmt;

struct IntegerVisitor;

impl<'de> Visitor<'de> for IntegerVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer or a numeric string")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(value)
            .map(Some)
            .map_err(|_| E::custom(format!("integer {} is out of range", value)))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }

        value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IntegerVisitor)
    }
}

/// A required integer given as a number or numeric string
pub fn integer<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserializer
        .deserialize_any(IntegerVisitor)?
        .ok_or_else(|| <D::Error as de::Error>::custom("expected an integer, found a blank value"))?;

    i32::try_from(value).map_err(|_| de::Error::custom(format!("integer {} is out of range", value)))
}

/// An optional integer; blank strings and null read as `None`
pub fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntegerVisitor)
}

/// A list of ids, each a number or numeric string; null reads as empty
pub fn integer_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ListVisitor;

    impl<'de> Visitor<'de> for ListVisitor {
        type Value = Vec<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of integers")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut ids = Vec::new();
            while let Some(id) = seq.next_element::<LenientId>()? {
                ids.push(id.0);
            }
            Ok(ids)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(ListVisitor)
        }
    }

    deserializer.deserialize_any(ListVisitor)
}

struct LenientId(i64);

impl<'de> serde::Deserialize<'de> for LenientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(IntegerVisitor)?
            .map(LenientId)
            .ok_or_else(|| de::Error::custom("expected an id, found a blank value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(deserialize_with = "integer")]
        role: i32,
        #[serde(default, deserialize_with = "optional_integer")]
        company_id: Option<i64>,
        #[serde(default, deserialize_with = "integer_list")]
        ids: Vec<i64>,
    }

    #[test]
    fn test_numbers_and_numeric_strings_are_accepted() {
        let form: Form =
            serde_json::from_value(json!({ "role": "2", "company_id": 7, "ids": ["3", 4] })).unwrap();

        assert_eq!(form.role, 2);
        assert_eq!(form.company_id, Some(7));
        assert_eq!(form.ids, vec![3, 4]);
    }

    #[test]
    fn test_blank_and_null_values_read_as_absent() {
        let form: Form =
            serde_json::from_value(json!({ "role": 1, "company_id": "", "ids": null })).unwrap();

        assert_eq!(form.company_id, None);
        assert!(form.ids.is_empty());

        let form: Form = serde_json::from_value(json!({ "role": 1 })).unwrap();
        assert_eq!(form.company_id, None);
        assert!(form.ids.is_empty());
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        assert!(serde_json::from_value::<Form>(json!({ "role": "abc" })).is_err());
        assert!(serde_json::from_value::<Form>(json!({ "role": "" })).is_err());
        assert!(serde_json::from_value::<Form>(json!({ "role": 1, "ids": [""] })).is_err());
    }
}
