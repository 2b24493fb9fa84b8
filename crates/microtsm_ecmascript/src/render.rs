use std::borrow::Cow;

use microtsm_common::{ImportKind, ImportRecord};
use microtsm_utils::concat_string;
use string_wizard::MagicString;
use tracing::{trace, warn};

use crate::{EcmaCompiler, ScanReturn};

/// Rewrites `source` in one pass, resolving bare specifiers through `resolve`.
///
/// Static imports whose specifier resolves are re-emitted against the resolved URL, every
/// `import(...)` call is routed through `loader`. Sources that fail to parse come back unchanged.
pub fn rewrite_imports<'s, F>(source: &'s str, loader: &str, resolve: F) -> Cow<'s, str>
where
  F: FnMut(&str) -> Option<String>,
{
  match EcmaCompiler::scan_imports(source) {
    Ok(scan) => render_rewrites(source, &scan, loader, resolve),
    Err(errors) => {
      warn!(errors = %errors, "module source could not be parsed, leaving it untouched");
      Cow::Borrowed(source)
    }
  }
}

/// Applies the edits implied by `scan` to `source`.
pub fn render_rewrites<'s, F>(
  source: &'s str,
  scan: &ScanReturn,
  loader: &str,
  mut resolve: F,
) -> Cow<'s, str>
where
  F: FnMut(&str) -> Option<String>,
{
  if scan.records.is_empty() {
    return Cow::Borrowed(source);
  }

  let mut magic_string = MagicString::new(source);
  let mut changed = false;

  for record in &scan.records {
    let start = record.span.start as usize;
    let end = record.span.end as usize;
    let source_start = record.source_span.start as usize;
    let source_end = record.source_span.end as usize;
    trace!(kind = %record.kind, specifier = record.specifier.as_deref(), "rewriting import");

    match record.kind {
      ImportKind::Import | ImportKind::SideEffect => {
        let Some(url) = record.bare_specifier().and_then(|specifier| resolve(specifier.as_str()))
        else {
          continue;
        };
        let literal = quote_url(&url, record.quote(source));
        // Comments ahead of the literal may hide a `from`, so only the literal is swapped.
        if scan.has_comment_in(record.span.start, record.source_span.start) {
          magic_string.update(source_start, source_end, literal);
          changed = true;
          continue;
        }
        let head = if record.kind == ImportKind::Import {
          concat_string!("import ", import_clause(source, record), " from ", literal)
        } else {
          concat_string!("import ", literal)
        };
        magic_string.update(start, source_end, head);
        changed = true;
      }
      ImportKind::ReExport => {
        let Some(url) = record.bare_specifier().and_then(|specifier| resolve(specifier.as_str()))
        else {
          continue;
        };
        magic_string.update(source_start, source_end, quote_url(&url, record.quote(source)));
        changed = true;
      }
      ImportKind::DynamicImport => {
        // Only the call head and tail are replaced so nested `import()`s inside the argument
        // keep their own edits.
        magic_string.update(start, source_start, concat_string!(loader, "("));
        let tail = if scan.is_module() { ", import.meta.url)" } else { ")" };
        magic_string.update(source_end, end, tail);
        changed = true;
      }
    }
  }

  if changed {
    Cow::Owned(magic_string.to_string())
  } else {
    Cow::Borrowed(source)
  }
}

/// `{ ref, computed }` in `import { ref, computed } from "vue"`.
fn import_clause<'s>(source: &'s str, record: &ImportRecord) -> &'s str {
  let clause_start = record.span.start as usize + "import".len();
  let head = source.get(clause_start..record.source_span.start as usize).unwrap_or_default();
  // The `from` keyword always follows the clause, so the last occurrence is the keyword.
  let clause = head.rfind("from").map_or(head, |idx| &head[..idx]);
  clause.trim()
}

fn quote_url(url: &str, quote: char) -> String {
  let mut literal = String::with_capacity(url.len() + 2);
  literal.push(quote);
  for c in url.chars() {
    if c == quote || c == '\\' {
      literal.push('\\');
    }
    literal.push(c);
  }
  literal.push(quote);
  literal
}

#[cfg(test)]
mod tests {
  use super::*;

  const LOADER: &str = "MicroTSM.load";

  fn resolve(specifier: &str) -> Option<String> {
    match specifier {
      "vue" => Some("https://cdn.example/vue.js".to_string()),
      "@scope/pkg" => Some("https://cdn.example/pkg.js".to_string()),
      "axios" => Some("https://cdn.example/axios.js".to_string()),
      _ => None,
    }
  }

  fn rewrite(source: &str) -> String {
    rewrite_imports(source, LOADER, resolve).into_owned()
  }

  #[test]
  fn side_effect_import() {
    assert_eq!(rewrite(r#"import "@scope/pkg";"#), r#"import "https://cdn.example/pkg.js";"#);
  }

  #[test]
  fn compact_clause_import_is_normalized() {
    assert_eq!(
      rewrite(r#"import{createApp}from"vue";"#),
      r#"import {createApp} from "https://cdn.example/vue.js";"#
    );
  }

  #[test]
  fn clause_and_quote_style_are_preserved() {
    assert_eq!(
      rewrite("import axios, { AxiosError } from 'axios';"),
      "import axios, { AxiosError } from 'https://cdn.example/axios.js';"
    );
    assert_eq!(
      rewrite(r#"import { createApp as from } from "vue""#),
      r#"import { createApp as from } from "https://cdn.example/vue.js""#
    );
  }

  #[test]
  fn relative_imports_are_untouched() {
    let source = r#"import { helper } from "./utils.js";
import "../side.js";
import x from "/abs.js";
export * from "./re.js";"#;
    assert!(matches!(rewrite_imports(source, LOADER, resolve), Cow::Borrowed(_)));
    assert_eq!(rewrite(source), source);
  }

  #[test]
  fn unresolved_bare_imports_are_untouched() {
    let source = r#"import { x } from "left-pad";"#;
    assert_eq!(rewrite(source), source);
  }

  #[test]
  fn dynamic_imports_go_through_the_loader() {
    assert_eq!(
      rewrite(r#"await import("axios")"#),
      r#"await MicroTSM.load("axios", import.meta.url)"#
    );
    assert_eq!(
      rewrite("await import(moduleName)"),
      "await MicroTSM.load(moduleName, import.meta.url)"
    );
    assert_eq!(
      rewrite("const m = import('./page.js');"),
      "const m = MicroTSM.load('./page.js', import.meta.url);"
    );
  }

  #[test]
  fn nested_dynamic_imports_keep_offsets() {
    assert_eq!(
      rewrite(r#"import(await import("a").then((m) => m.name))"#),
      concat!(
        r#"MicroTSM.load(await MicroTSM.load("a", import.meta.url)"#,
        ".then((m) => m.name), import.meta.url)"
      )
    );
  }

  #[test]
  fn every_occurrence_is_rewritten() {
    let source = r#"import { ref } from "vue";
import { computed } from "vue";
import "./local.js";
import axios from "axios";
const lazy = () => import("vue");
"#;
    let expected = r#"import { ref } from "https://cdn.example/vue.js";
import { computed } from "https://cdn.example/vue.js";
import "./local.js";
import axios from "https://cdn.example/axios.js";
const lazy = () => MicroTSM.load("vue", import.meta.url);
"#;
    assert_eq!(rewrite(source), expected);
  }

  #[test]
  fn re_exports_only_swap_the_literal() {
    assert_eq!(
      rewrite("export { ref }from'vue';\nexport * as pkg from \"@scope/pkg\";"),
      concat!(
        "export { ref }from'https://cdn.example/vue.js';\n",
        "export * as pkg from \"https://cdn.example/pkg.js\";"
      )
    );
  }

  #[test]
  fn import_attributes_survive() {
    assert_eq!(
      rewrite(r#"import data from "vue" with { type: "json" };"#),
      r#"import data from "https://cdn.example/vue.js" with { type: "json" };"#
    );
  }

  #[test]
  fn lookalike_strings_are_untouched() {
    let source = r#"const code = 'import { a } from "vue"'; const call = "import('vue')";"#;
    assert_eq!(rewrite(source), source);
  }

  #[test]
  fn unparsable_sources_are_returned_as_is() {
    let source = r#"import { from "vue"; import("axios")"#;
    assert_eq!(rewrite(source), source);
  }

  #[test]
  fn comments_before_the_literal_are_kept() {
    let cases = [
      (
        r#"import x from /* from */ "vue";"#,
        r#"import x from /* from */ "https://cdn.example/vue.js";"#,
      ),
      (
        "import { a } from // from vue\n\"vue\";",
        "import { a } from // from vue\n\"https://cdn.example/vue.js\";",
      ),
      (r#"import /* vue */ "vue";"#, r#"import /* vue */ "https://cdn.example/vue.js";"#),
    ];
    for (source, expected) in cases {
      let output = rewrite(source);
      assert_eq!(output, expected);
      assert!(EcmaCompiler::scan_imports(&output).is_ok());
    }
  }

  #[test]
  fn resolved_urls_are_escaped_for_the_quote() {
    assert_eq!(quote_url(r#"https://a/"b".js"#, '"'), r#""https://a/\"b\".js""#);
    assert_eq!(quote_url("https://a/b.js", '\''), "'https://a/b.js'");
  }
}
