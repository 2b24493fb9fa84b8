use memchr::memmem;
use microtsm_common::ImportRecord;
use microtsm_error::BuildResult;
use oxc::{
  allocator::Allocator,
  ast_visit::Visit,
  parser::Parser,
  span::{SourceType, Span},
};

use crate::ImportScanner;

pub struct EcmaCompiler;

#[derive(Debug)]
pub struct ScanReturn {
  pub records: Vec<ImportRecord>,
  pub source_type: SourceType,
  /// Spans of every comment in the source.
  pub comments: Vec<Span>,
}

impl ScanReturn {
  pub fn is_module(&self) -> bool {
    self.source_type.is_module()
  }

  /// Whether a comment starts inside `start..end`.
  pub fn has_comment_in(&self, start: u32, end: u32) -> bool {
    self.comments.iter().any(|comment| (start..end).contains(&comment.start))
  }
}

impl EcmaCompiler {
  /// Parses `source` as an ES module, falling back to a classic script, and collects its import
  /// constructs. Errors are the module-goal diagnostics.
  pub fn scan_imports(source: &str) -> BuildResult<ScanReturn> {
    if !may_contain_imports(source) {
      return Ok(ScanReturn {
        records: Vec::new(),
        source_type: SourceType::mjs(),
        comments: Vec::new(),
      });
    }

    match Self::scan_with(source, SourceType::mjs()) {
      Ok(ret) => Ok(ret),
      Err(module_errors) => {
        Self::scan_with(source, SourceType::mjs().with_module(false)).map_err(|_| module_errors)
      }
    }
  }

  fn scan_with(source: &str, source_type: SourceType) -> BuildResult<ScanReturn> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
      let mut errors =
        ret.errors.into_iter().map(|error| anyhow::anyhow!("{error:?}")).collect::<Vec<_>>();
      if errors.is_empty() {
        errors.push(anyhow::anyhow!("Failed to parse source as {source_type:?}"));
      }
      return Err(errors.into());
    }

    let mut scanner = ImportScanner::default();
    scanner.visit_program(&ret.program);
    let comments = ret.program.comments.iter().map(|comment| comment.span).collect();
    Ok(ScanReturn { records: scanner.into_records(), source_type, comments })
  }
}

fn may_contain_imports(source: &str) -> bool {
  let bytes = source.as_bytes();
  memmem::find(bytes, b"import").is_some() || memmem::find(bytes, b"export").is_some()
}
