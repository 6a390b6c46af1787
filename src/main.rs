use book_shelf_lib::{AppConfig, BookForm, OutputFormat};
use clap::Parser;
use std::process::ExitCode;

/// 单页书籍列表客户端
#[derive(Parser, Debug)]
#[command(name = "book-shelf", version, about)]
struct Cli {
    /// 后端服务根地址（默认读取 BOOK_SHELF_API_URL）
    #[arg(long)]
    api_url: Option<String>,

    /// tracing 过滤规则（默认读取 BOOK_SHELF_LOG）
    #[arg(long = "log")]
    log_filter: Option<String>,

    /// 加载完成后提交的书名，可重复
    #[arg(long = "add", value_name = "TITLE")]
    titles: Vec<String>,

    /// 每个表单附带的额外字段，格式 NAME=VALUE
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,

    /// 输出 HTML 而不是文本
    #[arg(long)]
    html: bool,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("字段格式应为 NAME=VALUE: {}", raw)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::resolve(cli.api_url.as_deref(), cli.log_filter.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("配置错误: {}", e);
            return ExitCode::FAILURE;
        }
    };
    book_shelf_lib::init_logging(&config.log_filter);

    let forms = cli
        .titles
        .iter()
        .map(|title| {
            let mut form = BookForm::new();
            form.set_title(title.as_str());
            for (name, value) in &cli.fields {
                form.set_field(name.as_str(), value.as_str());
            }
            form
        })
        .collect();

    let format = if cli.html { OutputFormat::Html } else { OutputFormat::Text };
    print!("{}", book_shelf_lib::run(config, forms, format).await);
    ExitCode::SUCCESS
}
