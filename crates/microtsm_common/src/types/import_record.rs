use arcstr::ArcStr;
use oxc::span::Span;

use crate::{ImportKind, SpecifierKind};

/// One import construct found in a module source.
///
/// Records only live between scanning and rendering; offsets index into the scanned source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
  pub kind: ImportKind,
  /// The whole statement for static forms, the whole `import(...)` call for dynamic ones.
  pub span: Span,
  /// The string literal (quotes included) for static forms, the argument expression for
  /// dynamic ones.
  pub source_span: Span,
  /// `vue` in `import { ref } from "vue"`. `None` for a dynamic import of a non-literal.
  pub specifier: Option<ArcStr>,
}

impl ImportRecord {
  pub fn new(kind: ImportKind, span: Span, source_span: Span, specifier: Option<ArcStr>) -> Self {
    Self { kind, span, source_span, specifier }
  }

  /// The specifier, if it is a literal that should go through the import map.
  pub fn bare_specifier(&self) -> Option<&ArcStr> {
    self.specifier.as_ref().filter(|specifier| SpecifierKind::of(specifier).is_bare())
  }

  /// The quote character the literal was written with. Only meaningful for static forms.
  pub fn quote(&self, source: &str) -> char {
    source
      .get(self.source_span.start as usize..)
      .and_then(|rest| rest.chars().next())
      .filter(|c| matches!(c, '"' | '\''))
      .unwrap_or('"')
  }
}

#[test]
fn bare_specifier_skips_relative() {
  let relative = ImportRecord::new(
    ImportKind::Import,
    Span::new(0, 10),
    Span::new(5, 10),
    Some("./a.js".into()),
  );
  assert!(relative.bare_specifier().is_none());

  let bare =
    ImportRecord::new(ImportKind::Import, Span::new(0, 10), Span::new(5, 10), Some("vue".into()));
  assert_eq!(bare.bare_specifier().map(ArcStr::as_str), Some("vue"));

  let source = "import x from 'vue'";
  let record =
    ImportRecord::new(ImportKind::Import, Span::new(0, 19), Span::new(14, 19), Some("vue".into()));
  assert_eq!(record.quote(source), '\'');
}
