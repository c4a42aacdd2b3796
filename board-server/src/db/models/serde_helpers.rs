//! Serde helpers for values coming back from SurrealDB.
//!
//! Record ids arrive in two shapes: the native structured form when read
//! from the database and the string form `table:key` when a client sends
//! one over JSON. Both deserialize to [`surrealdb::RecordId`] here; we
//! always serialize the string form.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;
use surrealdb::RecordId;

/// Missing or null bool reads as false (`blocked`, `is_resolved`).
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<bool>::deserialize(deserializer)?;
    Ok(value.unwrap_or(false))
}

/// Missing or null bool reads as true (`is_active`).
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<bool>::deserialize(deserializer)?;
    Ok(value.unwrap_or(true))
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a 'table:key' string or a native record id")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value
            .parse::<RecordId>()
            .map_err(|_| de::Error::custom(format!("invalid record id: {}", value)))
    }

    fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        RecordId::deserialize(de::value::MapAccessDeserializer::new(map))
    }
}

fn flexible_record_id<'de, D>(d: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_any(RecordIdVisitor)
}

/// `Option<RecordId>` as an optional `table:key` string, accepting the
/// native form on the way in.
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match id {
            Some(id) => s.serialize_some(&id.to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrap(#[serde(deserialize_with = "super::flexible_record_id")] RecordId);

        let value = Option::<Wrap>::deserialize(d)?;
        Ok(value.map(|w| w.0))
    }
}
