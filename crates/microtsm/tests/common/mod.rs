#![allow(dead_code)]

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use bytes::Bytes;
use microtsm::{
  normalize_options, FetchOutcome, FetchRequest, FetchResponse, Fetcher, ModuleTransformWorker,
  Prober, ServiceWorkerContainer, SharedOptions, WorkerOptions, WORKER_SCRIPT_URL,
};
use parking_lot::Mutex;
use reqwest::{
  header::{HeaderMap, HeaderValue, CONTENT_TYPE},
  StatusCode,
};
use rustc_hash::FxHashMap;

pub const UNREACHABLE_HOST: &str = "https://down.test/";

struct Resource {
  content_type: &'static str,
  body: Bytes,
}

#[derive(Default)]
struct Resources {
  served: Mutex<FxHashMap<String, Resource>>,
  fetches: AtomicUsize,
  probes: AtomicUsize,
}

/// An in-memory origin plus CDN. Unknown URLs answer 404, `UNREACHABLE_HOST` refuses
/// connections.
#[derive(Clone, Default)]
pub struct FakeNetwork(Arc<Resources>);

impl FakeNetwork {
  pub fn serve(&self, url: &str, content_type: &'static str, body: &str) -> &Self {
    self
      .0
      .served
      .lock()
      .insert(
        url.to_string(),
        Resource { content_type, body: Bytes::copy_from_slice(body.as_bytes()) },
      );
    self
  }

  pub fn script(&self, url: &str, body: &str) -> &Self {
    self.serve(url, "application/javascript; charset=utf-8", body)
  }

  pub fn fetches(&self) -> usize {
    self.0.fetches.load(Ordering::SeqCst)
  }

  pub fn probes(&self) -> usize {
    self.0.probes.load(Ordering::SeqCst)
  }
}

impl Prober for FakeNetwork {
  async fn probe(&self, url: &str) -> bool {
    self.0.probes.fetch_add(1, Ordering::SeqCst);
    self.0.served.lock().contains_key(url)
  }
}

impl Fetcher for FakeNetwork {
  async fn fetch(&self, request: &FetchRequest) -> anyhow::Result<FetchResponse> {
    self.0.fetches.fetch_add(1, Ordering::SeqCst);
    if request.url.starts_with(UNREACHABLE_HOST) {
      anyhow::bail!("connection refused: {}", request.url);
    }
    let served = self.0.served.lock();
    let (status, content_type, body) = match served.get(&request.url) {
      Some(resource) => (StatusCode::OK, resource.content_type, resource.body.clone()),
      None => (StatusCode::NOT_FOUND, "text/plain", Bytes::from_static(b"not found")),
    };
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    Ok(FetchResponse { status, headers, body })
  }
}

pub fn options() -> SharedOptions {
  Arc::new(normalize_options(WorkerOptions::default()))
}

pub fn worker(network: &FakeNetwork) -> ModuleTransformWorker<FakeNetwork, FakeNetwork> {
  ModuleTransformWorker::new(options(), network.clone(), network.clone())
}

/// A container hosting the module transform worker at its well-known path.
pub fn container(network: &FakeNetwork) -> Arc<ServiceWorkerContainer> {
  let network = network.clone();
  Arc::new(
    ServiceWorkerContainer::new()
      .host_module_transform_worker(WORKER_SCRIPT_URL, move || Ok(worker(&network))),
  )
}

pub fn body(outcome: &FetchOutcome) -> &str {
  match outcome {
    FetchOutcome::Respond(response) => response.text().expect("utf-8 body"),
    FetchOutcome::Passthrough => panic!("expected a response, got a passthrough"),
  }
}
