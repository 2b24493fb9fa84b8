use std::{future::Future, time::Duration};

use tracing::{debug, instrument};

/// Existence check for a candidate module URL.
///
/// Implementations report failures as `false`; a probe never errors.
pub trait Prober: Send + Sync {
  fn probe(&self, url: &str) -> impl Future<Output = bool> + Send;
}

/// Probes with header-only `HEAD` requests.
#[derive(Debug, Clone)]
pub struct HttpProber {
  client: reqwest::Client,
}

impl HttpProber {
  pub fn new(timeout: Duration) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("microtsm/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client })
  }

  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

impl Prober for HttpProber {
  #[instrument(level = "debug", skip(self))]
  async fn probe(&self, url: &str) -> bool {
    match self.client.head(url).send().await {
      Ok(response) => {
        let status = response.status();
        debug!(%status, "probe answered");
        status.is_success()
      }
      Err(error) => {
        debug!(%error, "probe failed");
        false
      }
    }
  }
}
