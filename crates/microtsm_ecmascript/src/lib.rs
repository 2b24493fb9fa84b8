mod ecma_compiler;
mod import_scanner;
mod render;

pub use crate::{
  ecma_compiler::{EcmaCompiler, ScanReturn},
  import_scanner::ImportScanner,
  render::{render_rewrites, rewrite_imports},
};
