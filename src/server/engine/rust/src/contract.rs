/* src/server/engine/rust/src/contract.rs */

// Component contract for single-entry (IIFE) builds. The entry source must
// default-export a binding named `Component`; the compiled artifact is then
// stamped with a marker banner and a registration call into the host page.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::entry::EntryKey;
use crate::escape::script_string_literal;

pub const REQUIRED_EXPORT: &str = "export default Component";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: component entry is missing `{required}`; IIFE builds register the default export named Component", file.display())]
pub struct ContractViolation {
  pub file: PathBuf,
  pub required: &'static str,
}

fn export_re() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\bexport\s+default\s+Component\b").unwrap())
}

/// Replace `//` and `/* */` comments with a space. String and template
/// literals are copied through, so a URL such as `"https://..."` is not
/// mistaken for a line comment. Quoted strings end at a newline, which keeps
/// a stray apostrophe in JSX text from swallowing the rest of the file.
fn strip_comments(source: &str) -> String {
  let mut out = String::with_capacity(source.len());
  let mut chars = source.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\'' | '"' | '`' => {
        out.push(c);
        while let Some(inner) = chars.next() {
          out.push(inner);
          if inner == '\\' {
            if let Some(escaped) = chars.next() {
              out.push(escaped);
            }
          } else if inner == c || (inner == '\n' && c != '`') {
            break;
          }
        }
      }
      '/' if chars.peek() == Some(&'/') => {
        while chars.next_if(|&next| next != '\n').is_some() {}
        out.push(' ');
      }
      '/' if chars.peek() == Some(&'*') => {
        chars.next();
        let mut prev = '\0';
        for inner in chars.by_ref() {
          if prev == '*' && inner == '/' {
            break;
          }
          prev = inner;
        }
        out.push(' ');
      }
      _ => out.push(c),
    }
  }
  out
}

/// ASCII JavaScript identifier, not a reserved word we would collide with.
pub fn is_js_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  (first.is_ascii_alphabetic() || first == '_' || first == '$')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    && !matches!(name, "default" | "window" | "undefined" | "function" | "var" | "let" | "const")
}

/// Artifact marker placed at the top of every IIFE bundle.
pub fn marker_banner(key: &EntryKey) -> String {
  format!("/* @axhub-component {key} */")
}

#[derive(Debug, Clone)]
pub struct ComponentContract {
  /// IIFE global the bundler assigns the default export to.
  pub global_name: String,
  /// Window property called with the component once the bundle runs.
  pub hook: String,
}

impl ComponentContract {
  pub fn new(global_name: impl Into<String>, hook: impl Into<String>) -> Self {
    Self { global_name: global_name.into(), hook: hook.into() }
  }

  /// Comments are stripped first so a commented-out export does not count.
  pub fn check(&self, source: &str, file: impl Into<PathBuf>) -> Result<(), ContractViolation> {
    let code = strip_comments(source);
    if export_re().is_match(&code) {
      Ok(())
    } else {
      Err(ContractViolation { file: file.into(), required: REQUIRED_EXPORT })
    }
  }

  pub fn registration_snippet(&self) -> String {
    let hook = script_string_literal(&self.hook);
    let global = &self.global_name;
    format!(
      ";(function(){{var d=typeof window!==\"undefined\"?window[{hook}]:undefined;\
       if(typeof d===\"function\"&&typeof {global}!==\"undefined\"){{d({global});}}}})();\n"
    )
  }

  /// Stamp a compiled artifact. Idempotent and free of timestamps, so the
  /// same bundler output always finalizes to the same bytes.
  pub fn finalize(&self, code: &str, key: &EntryKey) -> String {
    let banner = marker_banner(key);
    let snippet = self.registration_snippet();
    let body = code.trim_end();

    let mut out = String::with_capacity(banner.len() + body.len() + snippet.len() + 2);
    if !body.starts_with(&banner) {
      out.push_str(&banner);
      out.push('\n');
    }
    out.push_str(body);
    out.push('\n');
    if !body.ends_with(snippet.trim_end()) {
      out.push_str(&snippet);
    }
    out
  }

  pub fn is_finalized(&self, code: &str, key: &EntryKey) -> bool {
    code.starts_with(&marker_banner(key)) && code.trim_end().ends_with(self.registration_snippet().trim_end())
  }
}
