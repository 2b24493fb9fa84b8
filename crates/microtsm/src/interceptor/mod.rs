mod fetch;

use std::borrow::Cow;

use microtsm_resolver::{ImportMapSnapshot, Prober, Resolver};
use tracing::{debug, instrument};

pub use self::fetch::{FetchRequest, FetchResponse, Fetcher, HttpFetcher, RequestDestination};
use crate::{transform_imports::transform_imports, types::SharedOptions};

#[derive(Debug, Clone)]
pub enum FetchOutcome {
  /// Not ours to handle; the host fetches the request natively.
  Passthrough,
  Respond(FetchResponse),
}

/// Sits between script requests and the network, rewriting module sources on the way back.
#[derive(Debug)]
pub struct FetchInterceptor<F: Fetcher = HttpFetcher> {
  fetcher: F,
  options: SharedOptions,
}

impl<F: Fetcher> FetchInterceptor<F> {
  pub fn new(fetcher: F, options: SharedOptions) -> Self {
    Self { fetcher, options }
  }

  /// Upstream failures are returned as is, the caller surfaces them like any failed fetch.
  #[instrument(level = "debug", skip_all, fields(url = %request.url))]
  pub async fn intercept<P: Prober>(
    &self,
    request: &FetchRequest,
    snapshot: &ImportMapSnapshot,
    resolver: &Resolver<P>,
  ) -> anyhow::Result<FetchOutcome> {
    if request.destination != RequestDestination::Script {
      return Ok(FetchOutcome::Passthrough);
    }

    let response = self.fetcher.fetch(request).await?;
    if self.options.is_excluded(&request.url) {
      debug!("excluded url, passing through");
      return Ok(FetchOutcome::Respond(response));
    }
    if !response.is_script() {
      debug!(content_type = response.content_type(), "not a script, passing through");
      return Ok(FetchOutcome::Respond(response));
    }
    let Some(source) = response.text() else {
      debug!("body is not utf-8, passing through");
      return Ok(FetchOutcome::Respond(response));
    };

    let rewritten =
      match transform_imports(source, snapshot, resolver, &self.options).await {
        Cow::Owned(code) => Some(code),
        Cow::Borrowed(_) => None,
      };
    Ok(FetchOutcome::Respond(match rewritten {
      Some(code) => {
        debug!(generation = snapshot.generation(), "serving rewritten module");
        FetchResponse::javascript(response.status, code)
      }
      None => response,
    }))
  }
}
