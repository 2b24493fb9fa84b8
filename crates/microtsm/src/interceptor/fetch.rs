use std::future::Future;

use bytes::Bytes;
use reqwest::{
  header::{HeaderMap, HeaderValue, CONTENT_TYPE},
  Method, StatusCode,
};
use tracing::{debug, instrument};

/// What a request is for, in the `Sec-Fetch-Dest` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
  Script,
  Document,
  Style,
  Image,
  Font,
  Worker,
  Empty,
  Other,
}

impl RequestDestination {
  pub fn from_sec_fetch_dest(value: &str) -> Self {
    match value.trim() {
      "script" => Self::Script,
      "document" | "iframe" | "frame" => Self::Document,
      "style" => Self::Style,
      "image" => Self::Image,
      "font" => Self::Font,
      "worker" | "sharedworker" | "serviceworker" => Self::Worker,
      "" | "empty" => Self::Empty,
      _ => Self::Other,
    }
  }
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
  pub url: String,
  pub method: Method,
  pub destination: RequestDestination,
}

impl FetchRequest {
  pub fn new(url: impl Into<String>, method: Method, destination: RequestDestination) -> Self {
    Self { url: url.into(), method, destination }
  }

  /// A `GET` issued by a `<script>` element or a module graph edge.
  pub fn script(url: impl Into<String>) -> Self {
    Self::new(url, Method::GET, RequestDestination::Script)
  }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: Bytes,
}

impl FetchResponse {
  /// A freshly built script response. Upstream headers are not carried over since the body
  /// no longer matches their length, encoding or validators.
  pub fn javascript(status: StatusCode, body: impl Into<Bytes>) -> Self {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/javascript"));
    Self { status, headers, body: body.into() }
  }

  pub fn content_type(&self) -> Option<&str> {
    self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
  }

  pub fn is_script(&self) -> bool {
    self.content_type().is_some_and(is_script_content_type)
  }

  /// The body as text, `None` unless it is valid UTF-8.
  pub fn text(&self) -> Option<&str> {
    simdutf8::basic::from_utf8(&self.body).ok()
  }
}

fn is_script_content_type(raw: &str) -> bool {
  match raw.parse::<mime::Mime>() {
    Ok(mime) => matches!(
      mime.subtype().as_str(),
      "javascript" | "ecmascript" | "x-javascript" | "x-ecmascript"
    ),
    Err(_) => raw.to_ascii_lowercase().contains("javascript"),
  }
}

/// The real network behind the interceptor.
pub trait Fetcher: Send + Sync {
  fn fetch(&self, request: &FetchRequest)
    -> impl Future<Output = anyhow::Result<FetchResponse>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

impl HttpFetcher {
  pub fn new(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl Fetcher for HttpFetcher {
  #[instrument(level = "debug", skip_all, fields(url = %request.url))]
  async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchResponse> {
    let response = self.client.request(request.method.clone(), request.url.as_str()).send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    debug!(%status, len = body.len(), "upstream answered");
    Ok(FetchResponse { status, headers, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_content_type(value: &'static str) -> FetchResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
    FetchResponse { status: StatusCode::OK, headers, body: Bytes::new() }
  }

  #[test]
  fn script_content_types() {
    assert!(with_content_type("text/javascript").is_script());
    assert!(with_content_type("application/javascript; charset=utf-8").is_script());
    assert!(with_content_type("application/x-javascript").is_script());
    assert!(with_content_type("text/ecmascript").is_script());
    assert!(!with_content_type("text/css").is_script());
    assert!(!with_content_type("application/json").is_script());
    assert!(!FetchResponse { status: StatusCode::OK, headers: HeaderMap::new(), body: Bytes::new() }
      .is_script());
  }

  #[test]
  fn destinations() {
    assert_eq!(RequestDestination::from_sec_fetch_dest("script"), RequestDestination::Script);
    assert_eq!(RequestDestination::from_sec_fetch_dest("iframe"), RequestDestination::Document);
    assert_eq!(RequestDestination::from_sec_fetch_dest(""), RequestDestination::Empty);
    assert_eq!(RequestDestination::from_sec_fetch_dest("track"), RequestDestination::Other);
  }

  #[test]
  fn rewritten_responses_only_carry_a_script_content_type() {
    let response = FetchResponse::javascript(StatusCode::OK, "export {}");
    assert_eq!(response.headers.len(), 1);
    assert_eq!(response.content_type(), Some("text/javascript"));
    assert_eq!(response.text(), Some("export {}"));
  }

  #[test]
  fn non_utf8_bodies_have_no_text() {
    let response = FetchResponse::javascript(StatusCode::OK, vec![0xff, 0xfe, 0x00]);
    assert_eq!(response.text(), None);
  }
}
