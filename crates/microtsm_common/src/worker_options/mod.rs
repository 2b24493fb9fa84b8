pub mod normalized_worker_options;

use serde::Deserialize;

/// Root-relative path the page registers the module transform worker at.
pub const WORKER_SCRIPT_URL: &str = "/module-transform.sw.js";
/// `type` attribute of the inline `<script>` carrying the import map document.
pub const IMPORT_MAP_SCRIPT_TYPE: &str = "microtsm-importmap";
/// Event the host application dispatches on the window when it relaunches.
pub const RELAUNCH_EVENT: &str = "microtsm:root-app-relaunch";
/// Page storage key holding developer overrides layered over the embedded import map.
pub const IMPORT_MAP_OVERRIDES_KEY: &str = "importMapOverrides";

/// Scripts the bootstrap sequence depends on before an import map exists.
pub const DEFAULT_EXCLUDED_URL_PARTS: [&str; 2] = ["polyfill", "module-loader"];
pub const DEFAULT_LOADER: &str = "MicroTSM.load";
/// Suffixes tried, in order, against a prefix mapping's base URL.
pub const DEFAULT_PROBE_CANDIDATES: [&str; 8] = [
  ".js",
  ".mjs",
  ".es.js",
  ".esm.js",
  "/index.js",
  "/index.mjs",
  "/index.es.js",
  "/index.esm.js",
];
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkerOptions {
  /// Request URLs containing any of these substrings are never rewritten.
  pub excluded_url_parts: Option<Vec<String>>,
  /// Callee that rewritten dynamic imports are routed through.
  pub loader: Option<String>,
  pub probe_candidates: Option<Vec<String>>,
  pub probe_timeout_ms: Option<u64>,
  pub script_url: Option<String>,
}

impl WorkerOptions {
  pub fn from_json(raw: &str) -> anyhow::Result<Self> {
    Ok(serde_json::from_str(raw)?)
  }
}

#[test]
fn deserializes_camel_case_fields() {
  let options = WorkerOptions::from_json(
    r#"{ "excludedUrlParts": ["polyfill"], "loader": "Loader.import", "probeTimeoutMs": 250 }"#,
  )
  .unwrap();
  assert_eq!(options.excluded_url_parts, Some(vec!["polyfill".to_string()]));
  assert_eq!(options.loader.as_deref(), Some("Loader.import"));
  assert_eq!(options.probe_timeout_ms, Some(250));
  assert!(options.probe_candidates.is_none());

  assert!(WorkerOptions::from_json(r#"{ "excludedUrls": [] }"#).is_err());
}
