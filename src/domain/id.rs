//! Record identifiers.
//!
//! Ids are opaque strings to the rest of the crate. Tables created from the
//! hosted store's default template use integer keys, so rows may carry either
//! form and both decode to the same string the store accepts in filters.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

/// Deserializes an id given as a JSON string or integer into a `String`.
pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Signed(id) => id.to_string(),
        RawId::Unsigned(id) => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "super::opaque_id")]
        id: String,
    }

    #[test]
    fn accepts_text_and_integer_keys() {
        let text: Row = serde_json::from_value(json!({"id": "5b1c-uuid"})).unwrap();
        assert_eq!(text.id, "5b1c-uuid");

        let int8: Row = serde_json::from_value(json!({"id": 9_007_199_254_740_993_i64})).unwrap();
        assert_eq!(int8.id, "9007199254740993");
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_value::<Row>(json!({"id": 1.5})).is_err());
        assert!(serde_json::from_value::<Row>(json!({"id": null})).is_err());
    }
}
