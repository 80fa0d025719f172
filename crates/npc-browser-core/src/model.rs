// NPC records: the raw Strapi envelope and the flat, normalized shape.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Display name used when the source record has none.
pub const UNNAMED_NPC: &str = "Unnamed NPC";

/// Built-in portrait used when the source record carries no image relation.
pub const PLACEHOLDER_PORTRAIT: &str = "icons/svg/mystery-man.svg";

// ---------------------------------------------------------------------------
// NpcId
// ---------------------------------------------------------------------------

/// Opaque record identifier. Strapi hands out integers, but string ids are
/// accepted and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NpcId {
    Int(i64),
    Text(String),
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NpcId::Int(n) => write!(f, "{n}"),
            NpcId::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// NpcRecord
// ---------------------------------------------------------------------------

/// A normalized NPC. Every field is concrete; absence upstream has already
/// been replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcRecord {
    pub id: NpcId,
    pub name: String,
    pub content: String,
    pub campaign: String,
    pub group: String,
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Raw Strapi shapes
// ---------------------------------------------------------------------------

/// `{ "data": [ ... ] }`
#[derive(Debug, Deserialize)]
pub struct RawEnvelope {
    pub data: Vec<RawNpc>,
}

#[derive(Debug, Deserialize)]
pub struct RawNpc {
    pub id: NpcId,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<RawAttributes>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAttributes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campanha: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nucleo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub img: Option<RawRelation>,
}

/// `img: { data: { attributes: { url } } }`, with `data: null` when unset.
#[derive(Debug, Default, Deserialize)]
pub struct RawRelation {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<RawRelationData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRelationData {
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Option<RawMedia>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMedia {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
}

impl RawNpc {
    /// Flatten into an `NpcRecord`, defaulting every missing field.
    ///
    /// A present image relation is resolved by prefixing `base_url` verbatim.
    pub fn normalize(self, base_url: &str) -> NpcRecord {
        let attrs = self.attributes.unwrap_or_default();

        let image_url = attrs
            .img
            .and_then(|img| img.data)
            .and_then(|data| data.attributes)
            .and_then(|media| media.url)
            .filter(|url| !url.is_empty())
            .map(|url| format!("{base_url}{url}"))
            .unwrap_or_else(|| PLACEHOLDER_PORTRAIT.to_string());

        NpcRecord {
            id: self.id,
            name: attrs
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNNAMED_NPC.to_string()),
            content: attrs.content.unwrap_or_default(),
            campaign: attrs.campanha.unwrap_or_default(),
            group: attrs.nucleo.unwrap_or_default(),
            image_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

/// Accept any JSON value; keep it only if it is a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Accept any JSON value; keep it only if it deserializes as `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example.com";

    fn raw(json: &str) -> RawNpc {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_record_normalizes_verbatim() {
        let npc = raw(r#"{
            "id": 7,
            "attributes": {
                "name": "Goblin Chief",
                "content": "Leads the raiders.",
                "campanha": "Ashes",
                "nucleo": "Raiders",
                "img": { "data": { "attributes": { "url": "/uploads/goblin.png" } } }
            }
        }"#)
        .normalize(BASE);

        assert_eq!(npc.id, NpcId::Int(7));
        assert_eq!(npc.name, "Goblin Chief");
        assert_eq!(npc.content, "Leads the raiders.");
        assert_eq!(npc.campaign, "Ashes");
        assert_eq!(npc.group, "Raiders");
        assert_eq!(npc.image_url, "https://api.example.com/uploads/goblin.png");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let npc = raw(r#"{ "id": 1, "attributes": {} }"#).normalize(BASE);
        assert_eq!(npc.name, UNNAMED_NPC);
        assert_eq!(npc.content, "");
        assert_eq!(npc.campaign, "");
        assert_eq!(npc.group, "");
        assert_eq!(npc.image_url, PLACEHOLDER_PORTRAIT);
    }

    #[test]
    fn null_and_empty_fields_take_defaults() {
        let npc = raw(r#"{
            "id": 2,
            "attributes": {
                "name": "",
                "content": null,
                "campanha": null,
                "nucleo": null,
                "img": { "data": null }
            }
        }"#)
        .normalize(BASE);
        assert_eq!(npc.name, UNNAMED_NPC);
        assert_eq!(npc.content, "");
        assert_eq!(npc.campaign, "");
        assert_eq!(npc.group, "");
        assert_eq!(npc.image_url, PLACEHOLDER_PORTRAIT);
    }

    #[test]
    fn garbled_fields_are_tolerated() {
        let npc = raw(r#"{
            "id": "abc",
            "attributes": {
                "name": 42,
                "content": ["not", "text"],
                "campanha": true,
                "img": "nonsense"
            }
        }"#)
        .normalize(BASE);
        assert_eq!(npc.id, NpcId::Text("abc".into()));
        assert_eq!(npc.name, UNNAMED_NPC);
        assert_eq!(npc.content, "");
        assert_eq!(npc.campaign, "");
        assert_eq!(npc.image_url, PLACEHOLDER_PORTRAIT);
    }

    #[test]
    fn missing_attributes_object_is_tolerated() {
        let npc = raw(r#"{ "id": 3 }"#).normalize(BASE);
        assert_eq!(npc.name, UNNAMED_NPC);
        assert_eq!(npc.image_url, PLACEHOLDER_PORTRAIT);
    }

    #[test]
    fn missing_id_is_rejected() {
        let result: Result<RawNpc, _> = serde_json::from_str(r#"{ "attributes": {} }"#);
        assert!(result.is_err());
    }

    #[test]
    fn id_display() {
        assert_eq!(NpcId::Int(12).to_string(), "12");
        assert_eq!(NpcId::Text("x-1".into()).to_string(), "x-1");
    }
}
