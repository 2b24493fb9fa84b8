mod interceptor;
mod page;
mod transform_imports;
mod types;
mod utils;
mod worker;

pub use crate::{
  interceptor::{
    FetchInterceptor, FetchOutcome, FetchRequest, FetchResponse, Fetcher, HttpFetcher,
    RequestDestination,
  },
  page::{
    bootstrap, detect_browser, parse_import_map_overrides, read_import_map_data_island,
    BootstrapOutcome, Browser, BrowserVersion, CompatibilityGate, GateDecision, ImportMapSync,
    LocalStorage, Navigator, Page, PageEvent, StartedPage, Visibility,
  },
  transform_imports::transform_imports,
  types::SharedOptions,
  utils::normalize_options::normalize_options,
  worker::{
    ClientId, ModuleTransformWorker, RegistrationOptions, ServiceWorkerContainer, WorkerFactory,
    WorkerHandle, WorkerRuntime, WorkerState, WorkerType,
  },
};
pub use microtsm_common::*;
pub use microtsm_ecmascript::rewrite_imports;
pub use microtsm_resolver::{HttpProber, ImportMapSnapshot, ImportMapStore, Prober, Resolver};
