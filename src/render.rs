use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::form::BookForm;
use crate::model::{BookId, ValidationErrors};
use crate::view_state::ViewSnapshot;

/// 列表项（以书籍 ID 作为 key）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListItem {
    pub key: BookId,
    pub title: String,
}

/// 错误列表视图
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorListView {
    /// 每条错误一项，格式为 "<字段> <信息>"
    pub messages: Vec<String>,
}

impl ErrorListView {
    pub fn project(errors: &ValidationErrors) -> Self {
        let messages = errors
            .iter()
            .flat_map(|(field, messages)| {
                let label = humanize_field(field);
                messages.iter().map(move |message| format!("{} {}", label, message))
            })
            .collect();
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 页面视图：状态快照的纯投影
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookListView {
    pub items: Vec<BookListItem>,
    pub errors: ErrorListView,
}

impl BookListView {
    pub fn project(snapshot: &ViewSnapshot) -> Self {
        let items = snapshot
            .books
            .iter()
            .map(|book| BookListItem {
                key: book.id.clone(),
                title: book.title.clone(),
            })
            .collect();
        Self {
            items,
            errors: ErrorListView::project(&snapshot.errors),
        }
    }
}

/// "first_name" -> "First name"
fn humanize_field(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 渲染为 HTML
pub fn render_html(view: &BookListView, form: &BookForm) -> String {
    let mut html = String::new();
    html.push_str("<div>\n  <h1>Books</h1>\n  <ul>\n");
    for item in &view.items {
        let _ = writeln!(
            html,
            "    <li data-key=\"{}\">{}</li>",
            encode_double_quoted_attribute(&item.key.to_string()),
            encode_text(&item.title)
        );
    }
    html.push_str("  </ul>\n  <hr />\n");
    html.push_str(&render_error_list_html(&view.errors));
    html.push_str(&render_form_html(form));
    html.push_str("</div>\n");
    html
}

fn render_error_list_html(errors: &ErrorListView) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut html = String::from("  <div class=\"callout alert\">\n    <ul>\n");
    for message in &errors.messages {
        let _ = writeln!(html, "      <li>{}</li>", encode_text(message));
    }
    html.push_str("    </ul>\n  </div>\n");
    html
}

fn render_form_html(form: &BookForm) -> String {
    let mut html = String::from("  <form>\n");
    for (name, value) in form.fields() {
        let name_attr = encode_double_quoted_attribute(name);
        let _ = writeln!(
            html,
            "    <label>{}\n      <input type=\"text\" name=\"{}\" id=\"{}\" value=\"{}\" />\n    </label>",
            encode_text(&humanize_field(name)),
            name_attr,
            name_attr,
            encode_double_quoted_attribute(value)
        );
    }
    html.push_str("    <input type=\"submit\" value=\"Add Book\" />\n  </form>\n");
    html
}

/// 渲染为终端文本
pub fn render_text(view: &BookListView) -> String {
    let mut text = String::from("Books\n");
    if view.items.is_empty() {
        text.push_str("  (none)\n");
    }
    for item in &view.items {
        let _ = writeln!(text, "  [{}] {}", item.key, item.title);
    }
    if !view.errors.is_empty() {
        text.push_str("Errors\n");
        for message in &view.errors.messages {
            let _ = writeln!(text, "  - {}", message);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Book;
    use std::sync::Arc;

    fn snapshot(books: Vec<Book>, errors: ValidationErrors) -> ViewSnapshot {
        ViewSnapshot {
            books: Arc::new(books),
            errors: Arc::new(errors),
        }
    }

    #[test]
    fn test_project_keeps_order_and_count() {
        let books = vec![Book::new(9, "Z"), Book::new(1, "A"), Book::new(5, "M")];
        let view = BookListView::project(&snapshot(books, ValidationErrors::new()));

        assert_eq!(view.items.len(), 3);
        let keys: Vec<_> = view.items.iter().map(|i| i.key.clone()).collect();
        assert_eq!(keys, vec![BookId::from(9), BookId::from(1), BookId::from(5)]);
        assert!(view.errors.is_empty());
    }

    #[test]
    fn test_error_messages_are_humanized() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "can't be blank");
        errors.push("page_count", "is not a number");
        errors.push("page_count", "must be positive");

        let view = ErrorListView::project(&errors);
        assert_eq!(
            view.messages,
            vec![
                "Title can't be blank".to_string(),
                "Page count is not a number".to_string(),
                "Page count must be positive".to_string(),
            ]
        );
    }

    #[test]
    fn test_string_ids_used_as_keys() {
        let books = vec![Book::new("64b0c1", "Dune"), Book::new(2, "Emma")];
        let view = BookListView::project(&snapshot(books, ValidationErrors::new()));

        let html = render_html(&view, &BookForm::new());
        assert!(html.contains("<li data-key=\"64b0c1\">Dune</li>"));
        assert!(html.contains("<li data-key=\"2\">Emma</li>"));
        assert!(render_text(&view).contains("  [64b0c1] Dune\n"));
    }

    #[test]
    fn test_html_escapes_titles() {
        let books = vec![Book::new(1, "<script>alert(1)</script>")];
        let view = BookListView::project(&snapshot(books, ValidationErrors::new()));
        let html = render_html(&view, &BookForm::new());

        assert!(html.contains("<h1>Books</h1>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("callout"));
    }

    #[test]
    fn test_html_contains_error_list_and_form() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "can't be blank");
        let view = BookListView::project(&snapshot(Vec::new(), errors));
        let mut form = BookForm::new();
        form.set_field("title", "\"quoted\"");

        let html = render_html(&view, &form);

        assert!(html.contains("<li>Title can&#x27;t be blank</li>") || html.contains("<li>Title can't be blank</li>"));
        assert!(html.contains("name=\"title\""));
        assert!(html.contains("&quot;quoted&quot;"));
    }

    #[test]
    fn test_text_rendering() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "can't be blank");
        let view = BookListView::project(&snapshot(vec![Book::new(1, "Dune")], errors));

        let text = render_text(&view);
        assert_eq!(text, "Books\n  [1] Dune\nErrors\n  - Title can't be blank\n");
    }

    #[test]
    fn test_text_rendering_empty() {
        let view = BookListView::default();
        assert_eq!(render_text(&view), "Books\n  (none)\n");
    }
}
