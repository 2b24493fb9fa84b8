use std::time::Duration;

use microtsm_common::{
  NormalizedWorkerOptions, WorkerOptions, DEFAULT_EXCLUDED_URL_PARTS, DEFAULT_LOADER,
  DEFAULT_PROBE_CANDIDATES, DEFAULT_PROBE_TIMEOUT_MS, WORKER_SCRIPT_URL,
};

pub fn normalize_options(raw_options: WorkerOptions) -> NormalizedWorkerOptions {
  NormalizedWorkerOptions {
    excluded_url_parts: raw_options
      .excluded_url_parts
      .unwrap_or_else(|| DEFAULT_EXCLUDED_URL_PARTS.iter().map(ToString::to_string).collect()),
    loader: raw_options
      .loader
      .filter(|loader| !loader.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_LOADER.to_string()),
    probe_candidates: raw_options
      .probe_candidates
      .unwrap_or_else(|| DEFAULT_PROBE_CANDIDATES.iter().map(ToString::to_string).collect()),
    probe_timeout: Duration::from_millis(
      raw_options.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
    ),
    script_url: raw_options.script_url.unwrap_or_else(|| WORKER_SCRIPT_URL.to_string()),
  }
}

#[test]
fn fills_in_defaults() {
  let options = normalize_options(WorkerOptions::default());
  assert_eq!(options.excluded_url_parts, vec!["polyfill", "module-loader"]);
  assert_eq!(options.loader, "MicroTSM.load");
  assert_eq!(options.probe_candidates.first().map(String::as_str), Some(".js"));
  assert_eq!(options.probe_candidates.last().map(String::as_str), Some("/index.esm.js"));
  assert_eq!(options.probe_timeout, Duration::from_secs(5));
  assert_eq!(options.script_url, "/module-transform.sw.js");
  assert!(options.is_excluded("https://app.test/js/polyfill.js"));
  assert!(!options.is_excluded("https://app.test/js/main.js"));
}

#[test]
fn keeps_user_values() {
  let options = normalize_options(WorkerOptions {
    excluded_url_parts: Some(vec![]),
    loader: Some("  ".to_string()),
    probe_candidates: Some(vec![".mjs".to_string()]),
    probe_timeout_ms: Some(10),
    script_url: Some("/sw.js".to_string()),
  });
  assert!(options.excluded_url_parts.is_empty());
  assert_eq!(options.loader, "MicroTSM.load");
  assert_eq!(options.probe_candidates, vec![".mjs"]);
  assert_eq!(options.probe_timeout, Duration::from_millis(10));
  assert_eq!(options.script_url, "/sw.js");
}
