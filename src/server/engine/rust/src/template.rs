/* src/server/engine/rust/src/template.rs */

//! `{{NAME}}` placeholder substitution for the virtual HTML templates.
//!
//! Rendering is closed: every placeholder in the template needs a value, and
//! the output is rejected if any `{{` survives. Values are inserted verbatim,
//! so callers escape them for their context first.

use crate::error::{EngineError, Result};

pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String> {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(start) = rest.find("{{") {
    out.push_str(&rest[..start]);
    let after = &rest[start + 2..];
    let Some(end) = after.find("}}") else {
      return Err(EngineError::UnresolvedPlaceholder(after.chars().take(32).collect()));
    };
    let name = after[..end].trim();
    let value = values
      .iter()
      .find(|(k, _)| *k == name)
      .map(|(_, v)| *v)
      .ok_or_else(|| EngineError::UnresolvedPlaceholder(name.to_string()))?;
    out.push_str(value);
    rest = &after[end + 2..];
  }
  out.push_str(rest);

  if let Some(pos) = out.find("{{") {
    let token: String = out[pos + 2..].chars().take_while(|c| *c != '}').take(32).collect();
    return Err(EngineError::UnresolvedPlaceholder(token));
  }
  Ok(out)
}

/// Insert `tag` right before the first `</head>`; append it when there is no head.
pub fn inject_before_head_close(html: &str, tag: &str) -> String {
  match html.find("</head>") {
    Some(pos) => {
      let mut out = String::with_capacity(html.len() + tag.len());
      out.push_str(&html[..pos]);
      out.push_str(tag);
      out.push_str(&html[pos..]);
      out
    }
    None => format!("{tag}{html}"),
  }
}
