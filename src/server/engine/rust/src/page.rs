/* src/server/engine/rust/src/page.rs */

//! Synthesized HTML documents: component preview shells and the doc viewer.
//!
//! Every value reaching a template goes through `escape`, and the template
//! renderer refuses to return a page with a placeholder left in it.

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::escape::{escape_html, json_for_html_attr, script_string_literal};
use crate::template::{inject_before_head_close, render};

const PREVIEW_SOURCE: &str = include_str!("../templates/preview-source.html");
const PREVIEW_COMPILED: &str = include_str!("../templates/preview-compiled.html");
const SPEC_VIEWER: &str = include_str!("../templates/spec-viewer.html");

/// How the preview page obtains the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptRef {
  /// ES module served by the Vite dev server, e.g. `/src/elements/button/index.tsx`.
  Module { src: String },
  /// IIFE artifact plus the React UMD globals it expects.
  Compiled { url: String, react_url: String, react_dom_url: String },
}

#[derive(Debug, Clone)]
pub struct PreviewDocument {
  pub title: String,
  pub script: ScriptRef,
  pub stylesheet: Option<String>,
  /// Window property the compiled artifact calls to register itself.
  pub hook: String,
}

impl PreviewDocument {
  pub fn render(&self) -> Result<String> {
    let title = escape_html(&self.title);
    let html = match &self.script {
      ScriptRef::Module { src } => {
        let entry = script_string_literal(src);
        render(PREVIEW_SOURCE, &[("TITLE", &title), ("ENTRY_SRC", &entry)])?
      }
      ScriptRef::Compiled { url, react_url, react_dom_url } => {
        let hook = script_string_literal(&self.hook);
        render(
          PREVIEW_COMPILED,
          &[
            ("TITLE", &title),
            ("REACT_URL", &escape_html(react_url)),
            ("REACT_DOM_URL", &escape_html(react_dom_url)),
            ("HOOK", &hook),
            ("SCRIPT_URL", &escape_html(url)),
          ],
        )?
      }
    };
    Ok(match &self.stylesheet {
      Some(href) => {
        let link = format!("<link rel=\"stylesheet\" href=\"{}\">", escape_html(href));
        inject_before_head_close(&html, &link)
      }
      None => html,
    })
  }
}

pub fn preview_title(group: &str, name: &str) -> String {
  format!("{name} ({group}) | Axhub Preview")
}

/// One document offered by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocLink {
  pub key: String,
  pub label: String,
  pub url: String,
}

#[derive(Debug, Clone)]
pub struct DocViewerDocument {
  pub title: String,
  pub docs: Vec<DocLink>,
}

impl DocViewerDocument {
  /// Single doc: `SPEC_URL` set, `DOCS_CONFIG` empty, `MULTI_DOC=false`.
  /// Several: `DOCS_CONFIG` lists them all, `SPEC_URL` empty, `MULTI_DOC=true`.
  pub fn render(&self) -> Result<String> {
    let title = escape_html(&self.title);
    let (spec_url, docs_config, multi) = match self.docs.as_slice() {
      [single] => (escape_html(&single.url), String::new(), "false"),
      docs => {
        let value = serde_json::to_value(docs)
          .map_err(|source| EngineError::Serialize { what: "docs config", source })?;
        (String::new(), json_for_html_attr(&value), "true")
      }
    };
    render(
      SPEC_VIEWER,
      &[("TITLE", &title), ("SPEC_URL", &spec_url), ("DOCS_CONFIG", &docs_config), ("MULTI_DOC", multi)],
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn link(key: &str, url: &str) -> DocLink {
    DocLink { key: key.into(), label: key.to_uppercase(), url: url.into() }
  }

  #[test]
  fn source_preview_imports_entry_module() {
    let doc = PreviewDocument {
      title: preview_title("elements", "button"),
      script: ScriptRef::Module { src: "/src/elements/button/index.tsx".into() },
      stylesheet: None,
      hook: "__AXHUB_DEFINE_COMPONENT__".into(),
    };
    let html = doc.render().unwrap();
    assert!(html.contains("/@vite/client"));
    assert!(html.contains(r#"import Component from "/src/elements/button/index.tsx";"#));
    assert!(html.contains("<title>button (elements) | Axhub Preview</title>"));
    assert!(!html.contains("{{"));
    assert!(!html.contains("stylesheet"));
  }

  #[test]
  fn compiled_preview_loads_artifact_and_globals() {
    let doc = PreviewDocument {
      title: "home".into(),
      script: ScriptRef::Compiled {
        url: "/build/pages/home.js".into(),
        react_url: "https://cdn/react.js".into(),
        react_dom_url: "https://cdn/react-dom.js".into(),
      },
      stylesheet: Some("/src/pages/home/style.css".into()),
      hook: "__AXHUB_DEFINE_COMPONENT__".into(),
    };
    let html = doc.render().unwrap();
    assert!(html.contains(r#"<script src="/build/pages/home.js"></script>"#));
    assert!(html.contains(r#"src="https://cdn/react.js""#));
    assert!(html.contains(r#"window["__AXHUB_DEFINE_COMPONENT__"]"#));
    let link = html.find(r#"<link rel="stylesheet" href="/src/pages/home/style.css">"#).unwrap();
    assert!(link < html.find("</head>").unwrap());
    assert!(!html.contains("{{"));
  }

  #[test]
  fn hostile_title_is_escaped() {
    let doc = PreviewDocument {
      title: "<script>alert(1)</script>{{TITLE}}".into(),
      script: ScriptRef::Module { src: "/src/pages/x/index.tsx".into() },
      stylesheet: None,
      hook: "h".into(),
    };
    let html = doc.render().unwrap();
    assert!(!html.contains("<script>alert"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("{{"));
  }

  #[test]
  fn hostile_module_src_cannot_close_script() {
    let doc = PreviewDocument {
      title: "x".into(),
      script: ScriptRef::Module { src: "/src/</script><script>evil()".into() },
      stylesheet: None,
      hook: "h".into(),
    };
    let html = doc.render().unwrap();
    assert!(!html.contains("</script><script>evil"));
  }

  #[test]
  fn viewer_single_doc() {
    let doc = DocViewerDocument { title: "button".into(), docs: vec![link("spec", "/elements/button/spec.md")] };
    let html = doc.render().unwrap();
    assert!(html.contains(r#"data-spec-url="/elements/button/spec.md""#));
    assert!(html.contains(r#"data-docs-config="""#));
    assert!(html.contains(r#"data-multi-doc="false""#));
  }

  #[test]
  fn viewer_multi_doc_is_escaped_json() {
    let doc = DocViewerDocument {
      title: "home".into(),
      docs: vec![link("spec", "/pages/home/spec.md"), link("prd", "/pages/home/prd.md")],
    };
    let html = doc.render().unwrap();
    assert!(html.contains(r#"data-spec-url="""#));
    assert!(html.contains(r#"data-multi-doc="true""#));
    assert!(html.contains("&quot;key&quot;:&quot;spec&quot;"));
    assert!(html.contains("&quot;url&quot;:&quot;/pages/home/prd.md&quot;"));
    assert!(!html.contains("{{"));
  }
}
