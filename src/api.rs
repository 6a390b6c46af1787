//! 书籍接口客户端
//!
//! 封装 `/api/v1/books` 的两个调用，并把 HTTP 状态码归类为类型化错误：
//! 422 单独归为校验失败，其余非 2xx 只保留 "<status> (<statusText>)"。

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::AppConfig;
use crate::model::{
    Book, BookListResponse, CreatedBookResponse, FormPayload, ValidationErrors,
    ValidationFailedResponse,
};

/// 非标准状态码没有原因短语时使用
const UNKNOWN_STATUS_TEXT: &str = "Unknown Status";

#[derive(Error, Debug)]
pub enum ApiError {
    /// 服务端返回 422，携带字段错误映射
    #[error("提交内容未通过校验 ({} 个字段)", .0.len())]
    Validation(ValidationErrors),
    /// 其余非 2xx 响应
    #[error("{status} ({status_text})")]
    Status { status: u16, status_text: String },
    #[error("网络错误: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    fn from_status(status: StatusCode) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or(UNKNOWN_STATUS_TEXT).to_string(),
        }
    }
}

/// 书籍集合接口
///
/// 组件只依赖此 trait，测试中可以换成内存实现
#[async_trait]
pub trait BooksApi: Send + Sync {
    /// GET /api/v1/books
    async fn list_books(&self) -> Result<Vec<Book>, ApiError>;

    /// POST /api/v1/books
    ///
    /// 422 返回 `ApiError::Validation`
    async fn create_book(&self, payload: &FormPayload) -> Result<Book, ApiError>;
}

/// 基于 reqwest 的接口实现
///
/// 不设置超时，也不重试
#[derive(Debug, Clone)]
pub struct HttpBooksApi {
    client: Client,
    books_url: Url,
}

impl HttpBooksApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            books_url: config.books_url().clone(),
        }
    }
}

#[async_trait]
impl BooksApi for HttpBooksApi {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        tracing::debug!(url = %self.books_url, "GET 书籍列表");
        let response = self.client.get(self.books_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }

        let body: BookListResponse = read_json(response).await?;
        Ok(body.books)
    }

    async fn create_book(&self, payload: &FormPayload) -> Result<Book, ApiError> {
        tracing::debug!(url = %self.books_url, "POST 新书籍");
        // json() 会设置 Content-Type: application/json
        let response = self
            .client
            .post(self.books_url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body: ValidationFailedResponse = read_json(response).await?;
            return Err(ApiError::Validation(body.errors));
        }
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }

        let body: CreatedBookResponse = read_json(response).await?;
        Ok(body.book)
    }
}

/// 读取完整响应体再解析，区分网络错误与解析错误
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
