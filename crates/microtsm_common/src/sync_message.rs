use serde::{Deserialize, Serialize};

use crate::ImportMap;

/// Messages a page posts to the module transform worker.
///
/// `SET_IMPORT_MAP` is the only message the worker acts on; anything else deserializes to
/// [`SyncMessage::Unknown`] and is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
  #[serde(rename = "SET_IMPORT_MAP", rename_all = "camelCase")]
  SetImportMap { import_map: ImportMap },
  #[serde(other)]
  Unknown,
}

impl SyncMessage {
  pub fn set_import_map(import_map: ImportMap) -> Self {
    Self::SetImportMap { import_map }
  }

  pub fn from_json(raw: &str) -> anyhow::Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }

  pub fn to_json(&self) -> anyhow::Result<String> {
    Ok(serde_json::to_string(self)?)
  }
}

#[test]
fn parses_set_import_map() {
  let message = SyncMessage::from_json(
    r#"{ "type": "SET_IMPORT_MAP", "importMap": { "vue": "https://cdn.example/vue.js" } }"#,
  )
  .unwrap();
  let SyncMessage::SetImportMap { import_map } = message else {
    panic!("expected SET_IMPORT_MAP, got {message:?}");
  };
  assert_eq!(import_map.get_exact("vue"), Some("https://cdn.example/vue.js"));
}

#[test]
fn unknown_types_are_tolerated() {
  let message = SyncMessage::from_json(r#"{ "type": "SKIP_WAITING" }"#).unwrap();
  assert_eq!(message, SyncMessage::Unknown);
}

#[test]
fn serializes_with_wire_names() {
  let message = SyncMessage::set_import_map(ImportMap::from_iter([("vue", "https://a/vue.js")]));
  assert_eq!(
    message.to_json().unwrap(),
    r#"{"type":"SET_IMPORT_MAP","importMap":{"vue":"https://a/vue.js"}}"#
  );
}
