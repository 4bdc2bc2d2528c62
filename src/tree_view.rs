//! Sidebar tree rendering.
//!
//! At every level files come first, sorted by their relative path, followed
//! by subdirectories sorted by name. Folders are always emitted expanded;
//! collapsing them is left to the browser.

use crate::models::{to_slash, TreeNode};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt::Write;
use std::path::Path;

/// Characters escaped inside the `file` query value of a tree link.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Link to the view action for a relative path.
pub fn file_href(rel: &str) -> String {
    format!("/?file={}", utf8_percent_encode(rel, QUERY_VALUE))
}

/// Renders the whole tree as a `<ul class="tree">` list.
///
/// `selected` is compared as a plain string against each file's
/// forward-slash relative path.
pub fn render_tree(tree: &TreeNode, selected: Option<&str>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<ul class=\"tree\">");
    if tree.is_empty() {
        html.push_str("<li class=\"empty\">No markdown files found</li>");
    } else {
        render_level(&mut html, tree, selected);
    }
    html.push_str("</ul>");
    html
}

fn render_level(html: &mut String, node: &TreeNode, selected: Option<&str>) {
    let mut files: Vec<String> = node.files.iter().map(|p| to_slash(p)).collect();
    files.sort();
    for rel in &files {
        render_file_item(html, rel, selected);
    }

    let mut dirs: Vec<(&String, &TreeNode)> = node.dirs.iter().collect();
    dirs.sort_by(|a, b| a.0.cmp(b.0));
    for (name, child) in dirs {
        render_folder(html, name, child, selected);
    }
}

fn render_file_item(html: &mut String, rel: &str, selected: Option<&str>) {
    let label = Path::new(rel)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| rel.to_string());
    let selected_class = if selected == Some(rel) { " selected" } else { "" };

    let _ = write!(
        html,
        "<li class=\"file\"><div class=\"tree-row file-row{}\"><a href=\"{}\" title=\"{}\">\
         <span class=\"icon\">📄</span><span class=\"label\">{}</span></a></div></li>",
        selected_class,
        escape_html(&file_href(rel)),
        escape_html(rel),
        escape_html(&label),
    );
}

fn render_folder(html: &mut String, name: &str, node: &TreeNode, selected: Option<&str>) {
    let _ = write!(
        html,
        "<li class=\"folder\"><div class=\"tree-row folder-row\">\
         <span class=\"toggle-arrow\">▼</span><span class=\"icon\">📁</span>\
         <span class=\"label\">{}</span></div><div class=\"children\"><ul class=\"tree\">",
        escape_html(name),
    );
    render_level(html, node, selected);
    html.push_str("</ul></div></li>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_system::insert_file;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn tree_of(paths: &[&str]) -> TreeNode {
        let mut root = TreeNode::default();
        for rel in paths {
            insert_file(&mut root, PathBuf::from(rel));
        }
        root
    }

    fn position(html: &str, needle: &str) -> usize {
        html.find(needle)
            .unwrap_or_else(|| panic!("'{needle}' not found in {html}"))
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_file_href_encodes_query_value() {
        assert_eq!(file_href("2025/11-17-notes.md"), "/?file=2025/11-17-notes.md");
        assert_eq!(file_href("a b&c#d.md"), "/?file=a%20b%26c%23d.md");
    }

    #[test]
    fn test_files_before_directories() {
        let tree = tree_of(&["b.md", "a.md", "zdir/c.md"]);
        let html = render_tree(&tree, None);

        let a = position(&html, ">a.md<");
        let b = position(&html, ">b.md<");
        let zdir = position(&html, ">zdir<");
        let c = position(&html, ">c.md<");
        assert!(a < b);
        assert!(b < zdir);
        assert!(zdir < c);
    }

    #[test]
    fn test_nested_levels_use_same_ordering() {
        let tree = tree_of(&["top/sub/x.md", "top/b.md", "top/a.md", "top/asub/y.md"]);
        let html = render_tree(&tree, None);

        let a = position(&html, ">a.md<");
        let b = position(&html, ">b.md<");
        let asub = position(&html, ">asub<");
        let sub = position(&html, ">sub<");
        assert!(a < b && b < asub && asub < sub);
    }

    #[test]
    fn test_selected_marks_exactly_one_entry() {
        let tree = tree_of(&["note.md", "sub/note.md", "sub/other.md"]);
        let html = render_tree(&tree, Some("sub/note.md"));

        assert_eq!(html.matches("file-row selected").count(), 1);
        let selected = position(&html, "file-row selected");
        let link = position(&html, "href=\"/?file=sub/note.md\"");
        assert!(selected < link);
        assert!(!html[selected..link].contains("<li"));
    }

    #[test]
    fn test_selection_is_string_equality() {
        let tree = tree_of(&["sub/note.md"]);
        assert_eq!(render_tree(&tree, Some("sub/Note.md")).matches(" selected").count(), 0);
        assert_eq!(render_tree(&tree, Some("./sub/note.md")).matches(" selected").count(), 0);
        assert_eq!(render_tree(&tree, None).matches(" selected").count(), 0);
    }

    #[test]
    fn test_names_are_escaped() {
        let tree = tree_of(&["<script>.md", "<b>dir/x.md"]);
        let html = render_tree(&tree, None);

        assert!(html.contains("&lt;script&gt;.md"));
        assert!(html.contains("&lt;b&gt;dir"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("href=\"/?file=%3Cscript%3E.md\""));
    }

    #[test]
    fn test_empty_tree() {
        let html = render_tree(&TreeNode::default(), None);
        assert_eq!(html, "<ul class=\"tree\"><li class=\"empty\">No markdown files found</li></ul>");
    }

    #[test]
    fn test_folder_markup() {
        let tree = tree_of(&["2025/11-17-notes.md"]);
        let html = render_tree(&tree, Some("2025/11-17-notes.md"));
        assert_eq!(
            html,
            "<ul class=\"tree\"><li class=\"folder\"><div class=\"tree-row folder-row\">\
             <span class=\"toggle-arrow\">▼</span><span class=\"icon\">📁</span>\
             <span class=\"label\">2025</span></div><div class=\"children\"><ul class=\"tree\">\
             <li class=\"file\"><div class=\"tree-row file-row selected\">\
             <a href=\"/?file=2025/11-17-notes.md\" title=\"2025/11-17-notes.md\">\
             <span class=\"icon\">📄</span><span class=\"label\">11-17-notes.md</span></a></div></li>\
             </ul></div></li></ul>"
        );
    }
}
