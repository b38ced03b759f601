//! Streaming bundle reader
//!
//! Walks a `{"Records": [...]}` document with a `DeserializeSeed` so each
//! record is handed to the visitor as soon as it is parsed. Neither the
//! `Records` array nor sibling keys are ever held in memory as a whole.

use std::fmt;
use std::io::Read;

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::Value;

use crate::config::RECORDS_KEY;

/// Stream every element of the top-level `Records` array into `visit`.
///
/// Returns the number of records delivered, or `None` when the document has
/// no `Records` key. Records delivered before a parse error are not
/// retracted.
pub fn stream_records<R, F>(reader: R, mut visit: F) -> Result<Option<usize>, serde_json::Error>
where
    R: Read,
    F: FnMut(Value),
{
    let mut deserializer = serde_json::Deserializer::from_reader(reader);
    let count = BundleSeed { visit: &mut visit }.deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(count)
}

struct BundleSeed<'a, F> {
    visit: &'a mut F,
}

impl<'de, 'a, F> DeserializeSeed<'de> for BundleSeed<'a, F>
where
    F: FnMut(Value),
{
    type Value = Option<usize>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, 'a, F> Visitor<'de> for BundleSeed<'a, F>
where
    F: FnMut(Value),
{
    type Value = Option<usize>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an object with a `{}` array", RECORDS_KEY)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut count = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == RECORDS_KEY {
                let delivered = map.next_value_seed(RecordsSeed {
                    visit: &mut *self.visit,
                })?;
                count = Some(count.unwrap_or(0) + delivered);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(count)
    }
}

struct RecordsSeed<'a, F> {
    visit: &'a mut F,
}

impl<'de, 'a, F> DeserializeSeed<'de> for RecordsSeed<'a, F>
where
    F: FnMut(Value),
{
    type Value = usize;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a, F> Visitor<'de> for RecordsSeed<'a, F>
where
    F: FnMut(Value),
{
    type Value = usize;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an array of records")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut count = 0;
        while let Some(record) = seq.next_element::<Value>()? {
            (self.visit)(record);
            count += 1;
        }
        Ok(count)
    }

    // `"Records": null` carries no records
    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collect(input: &str) -> (Result<Option<usize>, serde_json::Error>, Vec<Value>) {
        let mut records = Vec::new();
        let result = stream_records(input.as_bytes(), |record| records.push(record));
        (result, records)
    }

    #[test]
    fn test_streams_records_in_order() {
        let (result, records) = collect(
            r#"{"Records": [{"eventName": "A"}, {"eventName": "B"}, {"eventName": "C"}]}"#,
        );

        assert_eq!(result.unwrap(), Some(3));
        let names: Vec<&Value> = records.iter().map(|r| &r["eventName"]).collect();
        assert_eq!(names, vec![&json!("A"), &json!("B"), &json!("C")]);
    }

    #[test]
    fn test_skips_sibling_keys() {
        let (result, records) = collect(
            r#"{"Meta": {"nested": [1, 2, {"Records": [{"eventName": "X"}]}]},
                "Records": [{"eventName": "A"}],
                "Trailer": "done"}"#,
        );

        assert_eq!(result.unwrap(), Some(1));
        assert_eq!(records, vec![json!({"eventName": "A"})]);
    }

    #[test]
    fn test_missing_records_key() {
        let (result, records) = collect(r#"{"Other": []}"#);
        assert_eq!(result.unwrap(), None);
        assert!(records.is_empty());
    }

    #[test]
    fn test_null_and_empty_records() {
        assert_eq!(collect(r#"{"Records": null}"#).0.unwrap(), Some(0));
        assert_eq!(collect(r#"{"Records": []}"#).0.unwrap(), Some(0));
    }

    #[test]
    fn test_non_object_elements_are_delivered() {
        let (result, records) = collect(r#"{"Records": [1, "two", {"eventName": "A"}]}"#);
        assert_eq!(result.unwrap(), Some(3));
        assert_eq!(records[0], json!(1));
    }

    #[test]
    fn test_wrong_top_level_shape_is_an_error() {
        assert!(collect(r#"[{"eventName": "A"}]"#).0.is_err());
        assert!(collect(r#"{"Records": {"eventName": "A"}}"#).0.is_err());
    }

    #[test]
    fn test_truncated_document_keeps_delivered_records() {
        let (result, records) = collect(r#"{"Records": [{"eventName": "A"}, {"eventName": "B"}, {"even"#);

        assert!(result.is_err());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        assert!(collect(r#"{"Records": []} {"Records": []}"#).0.is_err());
    }
}
