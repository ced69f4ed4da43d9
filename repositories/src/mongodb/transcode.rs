//! Converts stored documents into plain JSON that can go straight back to clients.

use bson::{Bson, Document};
use chrono::SecondsFormat;
use serde_json::{Map, Value};

/// Key MongoDB assigns to every document. Never leaves the repository.
pub const NATIVE_ID_KEY: &str = "_id";

/// Drops `_id` keys and renders datetimes as ISO-8601 text and object ids as hex,
/// all the way down through nested documents and arrays.
pub fn transcode(document: Document) -> Value {
    Value::Object(transcode_document(document))
}

fn transcode_document(document: Document) -> Map<String, Value> {
    document
        .into_iter()
        .filter(|(key, _)| key != NATIVE_ID_KEY)
        .map(|(key, value)| (key, transcode_value(value)))
        .collect()
}

fn transcode_value(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => {
            Value::String(dt.to_chrono().to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::Document(document) => Value::Object(transcode_document(document)),
        Bson::Array(values) => Value::Array(values.into_iter().map(transcode_value).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use bson::oid::ObjectId;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn strips_native_ids_at_every_level() {
        let document = doc! {
            "_id": ObjectId::new(),
            "id": "abc",
            "nested": { "_id": ObjectId::new(), "kept": 1 },
            "list": [ { "_id": ObjectId::new(), "kept": true } ],
        };

        assert_eq!(
            json!({
                "id": "abc",
                "nested": { "kept": 1 },
                "list": [ { "kept": true } ],
            }),
            transcode(document)
        );
    }

    #[test]
    fn renders_datetimes_as_iso_text() {
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let document = doc! {
            "added_date": bson::DateTime::from_chrono(at),
            "preferences": { "last_seen": bson::DateTime::from_chrono(at) },
            "history": [ bson::DateTime::from_chrono(at) ],
        };

        let value = transcode(document);

        assert_eq!(json!("2025-02-03T04:05:06Z"), value["added_date"]);
        assert_eq!(json!("2025-02-03T04:05:06Z"), value["preferences"]["last_seen"]);
        assert_eq!(json!(["2025-02-03T04:05:06Z"]), value["history"]);
    }

    #[test]
    fn object_ids_outside_the_native_key_become_hex() {
        let id = ObjectId::new();

        let value = transcode(doc! { "owner": id });

        assert_eq!(json!(id.to_hex()), value["owner"]);
    }

    #[test]
    fn plain_values_pass_through() {
        let value = transcode(doc! {
            "name": "Milk",
            "quantity": 2_i64,
            "small": 3_i32,
            "price": 1.5,
            "sponsored": false,
            "image_url": Bson::Null,
        });

        assert_eq!(
            json!({
                "name": "Milk",
                "quantity": 2,
                "small": 3,
                "price": 1.5,
                "sponsored": false,
                "image_url": null,
            }),
            value
        );
    }
}
