/* src/server/engine/rust/src/escape.rs */

/// Escape text for HTML content and double- or single-quoted attributes.
///
/// Braces are encoded as numeric references as well, so a value can never
/// reintroduce a `{{PLACEHOLDER}}` token into a rendered template.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      '{' => out.push_str("&#123;"),
      '}' => out.push_str("&#125;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Serialize a JSON value and escape it for an HTML attribute. The browser
/// decodes the entities, so `JSON.parse(el.dataset.x)` sees the original JSON.
pub fn json_for_html_attr(value: &serde_json::Value) -> String {
  escape_html(&value.to_string())
}

/// Quote a string as a JavaScript literal that is safe inside an inline
/// `<script>` block: no `</script>`, no HTML comment openers, no braces,
/// no raw line separators.
pub fn script_string_literal(s: &str) -> String {
  let quoted = serde_json::Value::String(s.to_string()).to_string();
  let mut out = String::with_capacity(quoted.len());
  for ch in quoted.chars() {
    match ch {
      '<' => out.push_str("\\u003c"),
      '>' => out.push_str("\\u003e"),
      '&' => out.push_str("\\u0026"),
      '{' => out.push_str("\\u007b"),
      '}' => out.push_str("\\u007d"),
      '\u{2028}' => out.push_str("\\u2028"),
      '\u{2029}' => out.push_str("\\u2029"),
      _ => out.push(ch),
    }
  }
  out
}
