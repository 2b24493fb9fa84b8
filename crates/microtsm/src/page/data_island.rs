use std::sync::LazyLock;

use microtsm_common::{ImportMap, ImportMapDocument, IMPORT_MAP_SCRIPT_TYPE};
use regex::Regex;
use tracing::warn;

static DATA_ISLAND: LazyLock<Regex> = LazyLock::new(|| {
  let ty = regex::escape(IMPORT_MAP_SCRIPT_TYPE);
  Regex::new(&format!(
    r#"(?is)<script\b[^>]*?\btype\s*=\s*(?:"{ty}"|'{ty}'|{ty})(?:\s[^>]*)?>(.*?)</script\s*>"#
  ))
  .unwrap()
});

/// Reads the import map the build embedded in the page.
///
/// A page without the element, or with a body that is not an import map document, yields an
/// empty map; everything stays unresolved until a later sync.
pub fn read_import_map_data_island(html: &str) -> ImportMap {
  let Some(captures) = DATA_ISLAND.captures(html) else {
    warn!("no import map data island in the page");
    return ImportMap::new();
  };
  let raw = captures.get(1).map_or("", |body| body.as_str().trim());
  match serde_json::from_str::<ImportMapDocument>(raw) {
    Ok(document) => document.imports,
    Err(error) => {
      warn!(%error, "import map data island is not valid json");
      ImportMap::new()
    }
  }
}

/// Parses developer overrides layered over the embedded map.
///
/// Both a full `{ "imports": {...} }` document and a bare specifier table are accepted.
/// Anything else is ignored.
pub fn parse_import_map_overrides(raw: &str) -> ImportMap {
  let value = match serde_json::from_str::<serde_json::Value>(raw) {
    Ok(value) => value,
    Err(error) => {
      warn!(%error, "import map overrides are not valid json");
      return ImportMap::new();
    }
  };
  let table = match value {
    serde_json::Value::Object(mut object)
      if object.get("imports").is_some_and(serde_json::Value::is_object) =>
    {
      object.remove("imports").unwrap_or_default()
    }
    other => other,
  };
  serde_json::from_value(table).unwrap_or_else(|error| {
    warn!(%error, "import map overrides are not a specifier table");
    ImportMap::new()
  })
}
