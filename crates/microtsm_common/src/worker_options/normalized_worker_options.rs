use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NormalizedWorkerOptions {
  pub excluded_url_parts: Vec<String>,
  pub loader: String,
  pub probe_candidates: Vec<String>,
  pub probe_timeout: Duration,
  pub script_url: String,
}

impl NormalizedWorkerOptions {
  pub fn is_excluded(&self, url: &str) -> bool {
    microtsm_utils::url::contains_any_part(url, &self.excluded_url_parts)
  }
}
