use std::{env, fs, io::Write};

use microtsm::{
  normalize_options, transform_imports, HttpProber, ImportMap, ImportMapSnapshot, Resolver,
  WorkerOptions,
};
use tracing_subscriber::EnvFilter;

/// Rewrites one module against an import map document, probing the network like the worker
/// would. Set `RUST_LOG=microtsm=debug` to follow resolution.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  let mut args = env::args().skip(1);
  let (Some(module_path), Some(import_map_path)) = (args.next(), args.next()) else {
    anyhow::bail!("usage: rewrite <module.js> <importmap.json>");
  };

  let options = normalize_options(WorkerOptions::default());
  let import_map = ImportMap::from_json(&fs::read_to_string(import_map_path)?)?;
  let source = fs::read_to_string(module_path)?;

  let resolver =
    Resolver::new(HttpProber::new(options.probe_timeout)?, options.probe_candidates.clone());
  let snapshot = ImportMapSnapshot::new(import_map, 1);
  let output = transform_imports(&source, &snapshot, &resolver, &options).await;

  std::io::stdout().write_all(output.as_bytes())?;
  Ok(())
}
