/// How a module specifier is treated by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
  /// `./a.js`, `../a.js`, `/a.js`. Resolved by the browser against the importing module and
  /// never touched.
  Relative,
  /// Anything else, e.g. `vue` or `@scope/pkg/sub`. Resolved through the import map.
  Bare,
}

impl SpecifierKind {
  pub fn of(specifier: &str) -> Self {
    if specifier.starts_with('.') || specifier.starts_with('/') {
      Self::Relative
    } else {
      Self::Bare
    }
  }

  pub fn is_bare(self) -> bool {
    matches!(self, Self::Bare)
  }
}

#[test]
fn classifies_specifiers() {
  assert_eq!(SpecifierKind::of("./utils.js"), SpecifierKind::Relative);
  assert_eq!(SpecifierKind::of("../utils.js"), SpecifierKind::Relative);
  assert_eq!(SpecifierKind::of("/js/main.js"), SpecifierKind::Relative);
  assert_eq!(SpecifierKind::of("vue"), SpecifierKind::Bare);
  assert_eq!(SpecifierKind::of("@scope/pkg"), SpecifierKind::Bare);
  assert_eq!(SpecifierKind::of("pkg/button"), SpecifierKind::Bare);
}
