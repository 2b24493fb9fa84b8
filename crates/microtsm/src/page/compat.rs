use std::{fmt, sync::Arc};

use itertools::Itertools;
use microtsm_utils::concat_string;

use crate::worker::ServiceWorkerContainer;

/// Oldest release of each browser able to run the module transform worker.
const MINIMUM_VERSIONS: [(Browser, u32); 5] = [
  (Browser::Chrome, 40),
  (Browser::Firefox, 44),
  (Browser::Edge, 17),
  (Browser::Opera, 27),
  (Browser::Safari, 11),
];

#[derive(Clone, Default)]
pub struct Navigator {
  pub user_agent: String,
  /// `None` when the browser cannot run interception workers at all.
  pub service_worker: Option<Arc<ServiceWorkerContainer>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
  Chrome,
  Edge,
  Firefox,
  InternetExplorer,
  Opera,
  Safari,
}

impl fmt::Display for Browser {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Chrome => "Chrome",
      Self::Edge => "Edge",
      Self::Firefox => "Firefox",
      Self::InternetExplorer => "Internet Explorer",
      Self::Opera => "Opera",
      Self::Safari => "Safari",
    })
  }
}

impl Browser {
  pub fn minimum_version(self) -> Option<u32> {
    MINIMUM_VERSIONS.iter().find(|(browser, _)| *browser == self).map(|(_, version)| *version)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserVersion {
  pub browser: Browser,
  pub major: u32,
}

/// Best effort detection from a user agent string. Order matters: Edge and Opera also claim
/// to be Chrome, and Chrome claims to be Safari.
pub fn detect_browser(user_agent: &str) -> Option<BrowserVersion> {
  let detected = |browser, major| Some(BrowserVersion { browser, major });
  let any_of = |tokens: &[&str]| tokens.iter().find_map(|token| version_after(user_agent, token));
  if let Some(major) = any_of(&["Edge/", "Edg/"]) {
    return detected(Browser::Edge, major);
  }
  if let Some(major) = any_of(&["OPR/", "Opera/"]) {
    return detected(Browser::Opera, major);
  }
  if let Some(major) = version_after(user_agent, "Firefox/") {
    return detected(Browser::Firefox, major);
  }
  if let Some(major) = version_after(user_agent, "Chrome/") {
    return detected(Browser::Chrome, major);
  }
  if user_agent.contains("Safari/") {
    if let Some(major) = version_after(user_agent, "Version/") {
      return detected(Browser::Safari, major);
    }
  }
  if let Some(major) = version_after(user_agent, "MSIE ") {
    return detected(Browser::InternetExplorer, major);
  }
  if user_agent.contains("Trident/") {
    return detected(Browser::InternetExplorer, version_after(user_agent, "rv:").unwrap_or(11));
  }
  None
}

fn version_after(haystack: &str, token: &str) -> Option<u32> {
  let start = haystack.find(token)? + token.len();
  let digits = haystack[start..].bytes().take_while(u8::is_ascii_digit).count();
  haystack[start..start + digits].parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
  Proceed,
  /// Bootstrapping must stop and the page is replaced with `document`.
  Unsupported { document: String },
}

pub struct CompatibilityGate;

impl CompatibilityGate {
  pub fn check(navigator: &Navigator) -> GateDecision {
    if navigator.service_worker.is_some() {
      return GateDecision::Proceed;
    }
    let diagnostic = diagnose(detect_browser(&navigator.user_agent));
    GateDecision::Unsupported { document: unsupported_document(&diagnostic) }
  }
}

fn diagnose(version: Option<BrowserVersion>) -> String {
  match version {
    Some(BrowserVersion { browser: Browser::InternetExplorer, .. }) => {
      "Internet Explorer cannot run this application. Please switch to a modern browser."
        .to_string()
    }
    Some(BrowserVersion { browser, major }) => match browser.minimum_version() {
      Some(minimum) if major < minimum => format!(
        "{browser} {major} is not supported. Please update to {browser} {minimum} or newer."
      ),
      _ => format!(
        "{browser} {major} has service workers turned off. Leave private browsing or enable them \
         in the browser settings."
      ),
    },
    None => "This browser does not support service workers.".to_string(),
  }
}

fn unsupported_document(diagnostic: &str) -> String {
  let supported =
    MINIMUM_VERSIONS.iter().map(|(browser, version)| format!("{browser} {version}+")).join(", ");
  concat_string!(
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n",
    "<title>Unsupported browser</title>\n</head>\n<body>\n",
    "<h1>Your browser is not supported</h1>\n<p>",
    diagnostic,
    "</p>\n<p>Supported browsers: ",
    supported,
    ".</p>\n</body>\n</html>\n"
  )
}
