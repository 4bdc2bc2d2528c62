//! Full-page assembly on top of the embedded `layout.html` template.

use crate::config::Config;
use crate::error::AppError;
use crate::handlers::Asset;
use crate::models::{ResolvedDocument, TreeNode};
use crate::tree_view::{escape_html, render_tree};
use minijinja::{context, Environment, Value};

const LAYOUT: &str = "layout.html";
const WELCOME_EXAMPLE: &str = "2025/11-17-notes.md";

/// Builds the template environment. Templates are looked up by name in the
/// embedded `templates/` directory.
pub fn template_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(|name| {
        Ok(Asset::get(&format!("templates/{name}"))
            .map(|file| String::from_utf8_lossy(&file.data).into_owned()))
    });
    env
}

/// Everything that varies between pages.
pub struct PageContent<'a> {
    pub title: &'a str,
    pub main_html: String,
    pub main_title: &'a str,
    pub main_path: &'a str,
    pub path_input: &'a str,
    pub selected: Option<&'a str>,
    pub body_class: Option<&'a str>,
}

pub fn render_page(
    env: &Environment<'_>,
    config: &Config,
    tree: &TreeNode,
    content: PageContent<'_>,
) -> Result<String, AppError> {
    let template = env.get_template(LAYOUT)?;
    let html = template.render(context! {
        title => content.title,
        main => Value::from_safe_string(content.main_html),
        main_title => content.main_title,
        main_path => content.main_path,
        path_input => content.path_input,
        base => config.base_dir.to_string_lossy().into_owned(),
        base_short => config.base_short(),
        tree => Value::from_safe_string(render_tree(tree, content.selected)),
        body_class => content.body_class.unwrap_or_default(),
    })?;
    Ok(html)
}

pub fn render_index_page(env: &Environment<'_>, config: &Config, tree: &TreeNode) -> Result<String, AppError> {
    let main_html = format!(
        r#"
<h2>Welcome</h2>
<p>
  This is a simple Markdown viewer for your <code>.md</code> files.
  Use the file list on the left or type a relative path into the box above.
</p>
<p>
  Example: if a file on disk is <code>{example}</code>, type
  <code>{example}</code> and press <strong>Open</strong>.
</p>
<hr />
<p>
  The left side can be collapsed with the round button on its edge.
  The A-/A+ buttons adjust only text size, without changing the layout.
</p>
"#,
        example = escape_html(WELCOME_EXAMPLE),
    );

    render_page(
        env,
        config,
        tree,
        PageContent {
            title: "Markdown viewer",
            main_html,
            main_title: "Markdown viewer",
            main_path: "No file selected",
            path_input: "",
            selected: None,
            body_class: None,
        },
    )
}

pub fn render_file_page(
    env: &Environment<'_>,
    config: &Config,
    tree: &TreeNode,
    doc: &ResolvedDocument,
    body_html: &str,
) -> Result<String, AppError> {
    let rel = doc.rel_str();
    let name = doc.file_name();
    let main_html = format!("\n<h2>Preview</h2>\n<hr />\n{body_html}\n");

    render_page(
        env,
        config,
        tree,
        PageContent {
            title: &name,
            main_html,
            main_title: &name,
            main_path: &rel,
            path_input: &rel,
            selected: Some(&rel),
            body_class: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::insert_file;
    use std::path::PathBuf;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let root = dir.path().join("notes");
        std::fs::create_dir_all(&root).unwrap();
        Config {
            base_dir: root.canonicalize().unwrap(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            tls: None,
            allow_raw_html: false,
        }
    }

    #[test]
    fn test_layout_template_is_embedded() {
        let env = template_env();
        assert!(env.get_template(LAYOUT).is_ok());
        assert!(env.get_template("missing.html").is_err());
    }

    #[test]
    fn test_index_page() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let env = template_env();
        let mut tree = TreeNode::default();
        insert_file(&mut tree, PathBuf::from("a.md"));

        let html = render_index_page(&env, &config, &tree).unwrap();

        assert!(html.contains("<title>Markdown viewer</title>"));
        assert!(html.contains("<h2>Welcome</h2>"));
        assert!(html.contains("No file selected"));
        assert!(html.contains("<code>2025/11-17-notes.md</code>"));
        assert!(html.contains(">notes<"));
        assert!(html.contains("<ul class=\"tree\">"));
        assert!(!html.contains("file-row selected"));
    }

    #[test]
    fn test_values_are_escaped_but_fragments_are_not() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        let env = template_env();

        let html = render_page(
            &env,
            &config,
            &TreeNode::default(),
            PageContent {
                title: "<i>title</i>",
                main_html: "<p id=\"main\">body</p>".to_string(),
                main_title: "a & b",
                main_path: "x\"y",
                path_input: "x\"y",
                selected: None,
                body_class: Some("wide"),
            },
        )
        .unwrap();

        assert!(html.contains("&lt;i&gt;title&lt;/i&gt;"));
        assert!(!html.contains("<i>title</i>"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("x\"y"));
        assert!(html.contains("<p id=\"main\">body</p>"));
        assert!(html.contains("No markdown files found"));
        assert!(html.contains("<body class=\"wide\">"));
    }
}
