// Resolution of bare specifiers against the worker's import map.

mod cache;
mod prober;
mod resolver;
mod store;

pub use crate::{
  cache::ResolutionCache,
  prober::{HttpProber, Prober},
  resolver::Resolver,
  store::{ImportMapSnapshot, ImportMapStore},
};
