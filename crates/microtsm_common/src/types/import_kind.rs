use std::fmt::Display;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ImportKind {
  /// `import foo from 'foo'`, `import { a } from 'foo'`, `import * as ns from 'foo'`
  Import,
  /// `import 'foo'`
  SideEffect,
  /// `export { a } from 'foo'`, `export * from 'foo'`
  ReExport,
  /// `import('foo')`, `import(name)`
  DynamicImport,
}

impl ImportKind {
  pub fn is_static(&self) -> bool {
    !matches!(self, Self::DynamicImport)
  }
}

impl Display for ImportKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Import => write!(f, "import"),
      Self::SideEffect => write!(f, "side-effect-import"),
      Self::ReExport => write!(f, "re-export"),
      Self::DynamicImport => write!(f, "dynamic-import"),
    }
  }
}

#[test]
fn display_names() {
  assert_eq!(ImportKind::SideEffect.to_string(), "side-effect-import");
  assert_eq!(ImportKind::DynamicImport.to_string(), "dynamic-import");
}
