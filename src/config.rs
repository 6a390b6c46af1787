use reqwest::Url;
use thiserror::Error;

/// 默认后端地址
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
/// 默认日志过滤规则
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const ENV_API_BASE_URL: &str = "BOOK_SHELF_API_URL";
pub const ENV_LOG_FILTER: &str = "BOOK_SHELF_LOG";

/// 书籍接口相对路径
const BOOKS_PATH: &str = "api/v1/books";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无效的后端地址 {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("后端地址不能作为基础路径: {0}")]
    CannotBeBase(String),
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 后端服务根地址
    pub api_base_url: Url,
    /// tracing 过滤规则
    pub log_filter: String,
    books_url: Url,
}

impl AppConfig {
    /// 使用给定地址创建配置
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let base = parse_base_url(api_base_url)?;
        // parse_base_url 保证以 '/' 结尾，join 不会丢掉已有路径
        let books_url = base.join(BOOKS_PATH).map_err(|e| ConfigError::InvalidUrl {
            url: api_base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            api_base_url: base,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            books_url,
        })
    }

    /// 解析最终配置：显式参数优先，其次环境变量，最后默认值
    ///
    /// # 参数
    /// - `api_url`: 命令行给出的后端地址
    /// - `log_filter`: 命令行给出的日志过滤规则
    pub fn resolve(api_url: Option<&str>, log_filter: Option<&str>) -> Result<Self, ConfigError> {
        let url = match api_url {
            Some(url) => url.to_string(),
            None => std::env::var(ENV_API_BASE_URL).unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
        };
        let mut config = Self::new(&url)?;
        if let Some(filter) = log_filter
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_LOG_FILTER).ok())
        {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// 书籍集合接口地址：`<base>/api/v1/books`
    pub fn books_url(&self) -> &Url {
        &self.books_url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::CannotBeBase(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
