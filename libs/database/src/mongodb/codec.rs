//! Document encoding shared by the MongoDB repositories.
//!
//! Entities are written with [`to_stored_document`]. UUIDs are stored as
//! hyphenated strings, matching [`uuid_bson`]. Timestamps are RFC 3339
//! strings; fields that are range-filtered or sorted use [`fixed_rfc3339`]
//! so that string order is time order, and [`datetime_bson`] builds filter
//! values in the same layout.
//!
//! Entities served directly over the API serialize their key as `id`; it is
//! stored as `_id`.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use serde::Serialize;
use uuid::Uuid;

const DUPLICATE_KEY: i32 = 11000;

pub fn to_stored_document<T: Serialize>(value: &T) -> Result<Document, bson::ser::Error> {
    let mut document = bson::to_document(value)?;
    if !document.contains_key("_id") {
        if let Some(id) = document.remove("id") {
            document.insert("_id", id);
        }
    }
    Ok(document)
}

pub fn uuid_bson(id: Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// Filter value for a field stored with [`fixed_rfc3339`]
pub fn datetime_bson(at: DateTime<Utc>) -> Bson {
    Bson::String(fixed_rfc3339::format(&at))
}

/// Serde adapter writing UTC timestamps with all nine fraction digits.
///
/// Chrono's default layout drops a zero fraction, and `"09:00:00Z"` sorts
/// after `"09:00:00.5Z"` as a string.
///
/// ```ignore
/// #[serde(with = "database::mongodb::fixed_rfc3339")]
/// pub starts_at: DateTime<Utc>,
/// ```
pub mod fixed_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }

    /// Same layout for optional fields; pair with `#[serde(default)]`
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            at: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match at {
                Some(at) => serializer.serialize_some(&format(at)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(deserializer)
        }
    }
}

/// `true` for unique index violations (E11000)
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
