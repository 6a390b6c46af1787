use tracing_subscriber::EnvFilter;

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod model;
pub mod render;
pub mod view_state;


// 重新导出主要类型
pub use api::{ApiError, BooksApi, HttpBooksApi};
pub use app::{BookListApp, LoadOutcome, SubmitOutcome};
pub use config::{AppConfig, ConfigError};
pub use form::BookForm;
pub use model::{Book, BookId, FormPayload, ValidationErrors};
pub use render::{render_html, render_text, BookListView};
pub use view_state::{ViewSnapshot, ViewStore};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
}

/// 初始化日志，输出到 stderr
///
/// 过滤规则无效时退回到 `info`
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("日志过滤规则无效 ({}), 使用 info", e);
        EnvFilter::new(config::DEFAULT_LOG_FILTER)
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// 核心入口：挂载组件 -> 等待加载 -> 逐个提交表单 -> 输出最终视图
pub async fn run(config: AppConfig, forms: Vec<BookForm>, format: OutputFormat) -> String {
    tracing::info!(url = %config.books_url(), "启动书籍列表");

    let app = BookListApp::new(HttpBooksApi::new(&config));
    app.mount();
    if let Some(outcome) = app.loaded().await {
        tracing::debug!(?outcome, "加载结束");
    }

    let mut last_form = BookForm::new();
    for mut form in forms {
        let outcome = app.add_book(form.payload()).await;
        tracing::debug!(?outcome, "提交结束");
        // 创建成功后清空输入；失败时保留，方便在 HTML 中回显
        if let SubmitOutcome::Created(_) = outcome {
            form.clear();
        }
        last_form = form;
    }

    let view = app.view();
    app.unmount();

    match format {
        OutputFormat::Text => render_text(&view),
        OutputFormat::Html => render_html(&view, &last_form),
    }
}
