use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 书籍 ID（由服务端分配）
///
/// 服务端可能返回数字或字符串（如 UUID），两种都接受
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Int(i64),
    Str(String),
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookId::Int(id) => write!(f, "{}", id),
            BookId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        BookId::Int(id)
    }
}

impl From<i32> for BookId {
    fn from(id: i32) -> Self {
        BookId::Int(i64::from(id))
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        BookId::Str(id.to_string())
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        BookId::Str(id)
    }
}

/// 书籍记录
///
/// 由服务端在创建时生成，客户端只读。除 `id` 和 `title` 以外的字段原样保留。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Book {
    pub fn new(id: impl Into<BookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// 校验错误映射
///
/// 字段名 -> 错误信息列表。每次校验失败整体替换，每次提交成功整体清空，从不合并。
/// 字段保持服务端返回的顺序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 添加一条错误信息（用于构造测试数据和本地错误）
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// 按服务端返回的字段顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// 表单提交内容
///
/// 任意可序列化为 JSON 对象的字段集合，原样作为 POST 请求体发送。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormPayload(serde_json::Map<String, serde_json::Value>);

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let mut payload = Self::new();
        payload.insert("title", title.into());
        payload
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }
}

/// GET /api/v1/books 的响应体
#[derive(Debug, Deserialize)]
pub(crate) struct BookListResponse {
    pub books: Vec<Book>,
}

/// POST /api/v1/books 成功时的响应体
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedBookResponse {
    pub book: Book,
}

/// POST /api/v1/books 返回 422 时的响应体
#[derive(Debug, Deserialize)]
pub(crate) struct ValidationFailedResponse {
    pub errors: ValidationErrors,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_book_keeps_extra_fields() {
        let book: Book = serde_json::from_value(json!({
            "id": 3,
            "title": "沙丘",
            "author": "Frank Herbert"
        }))
        .unwrap();

        assert_eq!(book.id, BookId::Int(3));
        assert_eq!(book.title, "沙丘");
        assert_eq!(book.extra.get("author"), Some(&json!("Frank Herbert")));

        let back = serde_json::to_value(&book).unwrap();
        assert_eq!(back["author"], "Frank Herbert");
    }

    #[test]
    fn test_book_ids_accept_numbers_and_strings() {
        let body: BookListResponse = serde_json::from_value(json!({
            "books": [
                { "id": 1, "title": "A" },
                { "id": "64b0c1", "title": "B" }
            ]
        }))
        .unwrap();

        assert_eq!(body.books[0].id, BookId::Int(1));
        assert_eq!(body.books[1].id, BookId::from("64b0c1"));
        assert_eq!(body.books[0].id.to_string(), "1");
        assert_eq!(body.books[1].id.to_string(), "64b0c1");
        assert_eq!(serde_json::to_value(&body.books[1].id).unwrap(), json!("64b0c1"));
    }

    #[test]
    fn test_validation_errors_keep_server_order() {
        let errors: ValidationErrors = serde_json::from_str(
            r#"{ "title": ["can't be blank"], "author": ["is missing"], "isbn": ["is invalid"] }"#,
        )
        .unwrap();

        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["title", "author", "isbn"]);
    }

    #[test]
    fn test_validation_errors_from_server_shape() {
        let body: ValidationFailedResponse = serde_json::from_value(json!({
            "errors": { "title": ["can't be blank"], "author": ["is too short", "is invalid"] }
        }))
        .unwrap();

        assert_eq!(body.errors.len(), 2);
        assert_eq!(body.errors.get("title").unwrap(), ["can't be blank".to_string()]);
        assert_eq!(body.errors.get("author").unwrap().len(), 2);
    }

    #[test]
    fn test_validation_response_requires_errors_field() {
        let result: Result<ValidationFailedResponse, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_form_payload_serializes_as_object() {
        let mut payload = FormPayload::with_title("Foo");
        payload.insert("pages", 120);

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({ "title": "Foo", "pages": 120 }));
    }
}
