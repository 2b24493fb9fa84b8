/// Returns `true` when `url` contains any of `parts` as a plain substring.
pub fn contains_any_part<S: AsRef<str>>(url: &str, parts: &[S]) -> bool {
  parts.iter().any(|part| {
    let part = part.as_ref();
    !part.is_empty() && url.contains(part)
  })
}

#[test]
fn test_contains_any_part() {
  let parts = ["polyfill", "module-loader", ""];
  assert!(contains_any_part("https://app.test/js/polyfill-abc.js", &parts));
  assert!(contains_any_part("https://app.test/module-loader.js", &parts));
  assert!(!contains_any_part("https://app.test/js/main.js", &parts));
}
