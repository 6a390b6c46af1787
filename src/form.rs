use crate::model::FormPayload;

/// 新书表单
///
/// 收集字段输入并生成提交内容。不做客户端校验，校验交给服务端。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    /// 字段按添加顺序保存，`title` 总是第一个
    fields: Vec<(String, String)>,
}

impl BookForm {
    pub fn new() -> Self {
        Self {
            fields: vec![("title".to_string(), String::new())],
        }
    }

    /// 设置字段值，字段不存在时追加
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_field("title", title);
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// 清空所有字段的输入
    pub fn clear(&mut self) {
        for (_, value) in self.fields.iter_mut() {
            value.clear();
        }
    }

    /// 生成提交内容（原样保留输入，不去除空白）
    pub fn payload(&self) -> FormPayload {
        let mut payload = FormPayload::new();
        for (name, value) in &self.fields {
            payload.insert(name.clone(), value.clone());
        }
        payload
    }
}

impl Default for BookForm {
    fn default() -> Self {
        Self::new()
    }
}
