/// Concatenate string-like values with a single allocation.
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($s:expr),+ $(,)?) => {{
    let mut len = 0;
    $(len += AsRef::<str>::as_ref(&$s).len();)+
    let mut buf = String::with_capacity(len);
    $(buf.push_str(AsRef::<str>::as_ref(&$s));)+
    buf
  }};
}

#[test]
fn test_concat_string() {
  let quote = '"'.to_string();
  let joined = concat_string!("import ", quote, "vue", quote);
  assert_eq!(joined, "import \"vue\"");
  assert_eq!(joined.capacity(), joined.len());
  assert_eq!(concat_string!(), "");
}
