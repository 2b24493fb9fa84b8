use arcstr::ArcStr;
use microtsm_common::{ImportKind, ImportRecord};
use oxc::{
  ast::ast::{self, Expression},
  ast_visit::{walk, Visit},
  span::{GetSpan, Span},
};

/// Collects every import construct the rewriter may need to touch.
#[derive(Debug, Default)]
pub struct ImportScanner {
  records: Vec<ImportRecord>,
}

impl ImportScanner {
  /// Records ordered by their position in the source.
  pub fn into_records(mut self) -> Vec<ImportRecord> {
    self.records.sort_by_key(|record| (record.span.start, record.span.end));
    self.records
  }

  fn add_static_record(&mut self, kind: ImportKind, span: Span, source: &ast::StringLiteral) {
    let specifier = Some(ArcStr::from(source.value.as_str()));
    self.records.push(ImportRecord::new(kind, span, source.span, specifier));
  }
}

impl<'ast> Visit<'ast> for ImportScanner {
  fn visit_import_declaration(&mut self, decl: &ast::ImportDeclaration<'ast>) {
    // `import {} from 'a'` still carries a clause, only `import 'a'` has none.
    let kind = if decl.specifiers.is_some() { ImportKind::Import } else { ImportKind::SideEffect };
    self.add_static_record(kind, decl.span, &decl.source);
  }

  fn visit_export_all_declaration(&mut self, decl: &ast::ExportAllDeclaration<'ast>) {
    self.add_static_record(ImportKind::ReExport, decl.span, &decl.source);
  }

  fn visit_export_named_declaration(&mut self, decl: &ast::ExportNamedDeclaration<'ast>) {
    if let Some(source) = &decl.source {
      self.add_static_record(ImportKind::ReExport, decl.span, source);
    }
    walk::walk_export_named_declaration(self, decl);
  }

  fn visit_import_expression(&mut self, expr: &ast::ImportExpression<'ast>) {
    let specifier = match &expr.source {
      Expression::StringLiteral(request) => Some(ArcStr::from(request.value.as_str())),
      _ => None,
    };
    self.records.push(ImportRecord::new(
      ImportKind::DynamicImport,
      expr.span,
      expr.source.span(),
      specifier,
    ));
    walk::walk_import_expression(self, expr);
  }
}
