//! rstechcrawl 命令行入口
//!
//! 解析参数、初始化日志，启动爬取并在收到停止信号后保存结果。

use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rstechcrawl::{
    ConcurrentCrawler, CustomConfigBuilder, GlobalConfig, OutputFormat, Response, ResultSink, TechCrawlError,
    WebAnalyzer,
};

const DEFAULT_SEEDS: &str = "https://google.com";

/// 并发爬取网站并识别其技术栈
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// 种子URL，逗号分隔
    #[arg(long, default_value = DEFAULT_SEEDS)]
    urls: String,

    /// 是否跟随外部站点链接
    #[arg(long, default_value_t = true, num_args = 0..=1, default_missing_value = "true", action = clap::ArgAction::Set)]
    follow_external: bool,

    /// 同时抓取的页面数上限
    #[arg(long, default_value_t = rstechcrawl::config::DEFAULT_MAX_CONCURRENCY)]
    concurrency: usize,

    /// 指纹库路径或 http(s) URL
    #[arg(long, default_value = "technologies.json")]
    catalog: String,

    /// 结果文件路径
    #[arg(long, default_value = "fingerprints.json")]
    output: PathBuf,

    /// 结果文件格式：json | msgpack
    #[arg(long, default_value = "json", value_parser = OutputFormat::from_str)]
    format: OutputFormat,

    /// 单次请求超时（秒）
    #[arg(long)]
    timeout: Option<u64>,

    /// 没有待抓取与在途链接时自动结束
    #[arg(long)]
    exit_when_done: bool,

    /// 输出调试日志
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn seeds(&self) -> Vec<String> {
        self.urls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    fn to_config(&self) -> GlobalConfig {
        CustomConfigBuilder::default()
            .catalog_location(self.catalog.clone())
            .result_path(self.output.clone())
            .output_format(self.format)
            .max_concurrency(self.concurrency)
            .follow_external_links(self.follow_external)
            .http_timeout(self.timeout)
            .exit_when_idle(self.exit_when_done)
            .verbose(self.verbose)
            .build()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();
    init_logger(config.verbose);

    let analyzer = Arc::new(
        WebAnalyzer::new(&config)
            .await
            .with_context(|| format!("无法加载指纹库：{}", config.catalog_location))?,
    );
    let crawler = ConcurrentCrawler::new(&config).context("无法创建HTTP客户端")?;
    let sink = ResultSink::from_config(&config);

    println!("Starting to crawl...Press enter to stop crawling.");

    let stop = CancellationToken::new();
    watch_stdin(stop.clone(), config.exit_when_idle);
    let progress = tokio::spawn(show_progress(stop.clone()));

    let on_response = {
        let analyzer = Arc::clone(&analyzer);
        move |response: Response| analyzer.analyze(&response)
    };
    let on_quit = {
        let analyzer = Arc::clone(&analyzer);
        move || {
            let report = analyzer.report();
            let path = sink.save(&report)?;
            let echo = ResultSink::to_pretty_json(&report)?;
            Ok::<_, TechCrawlError>((path, echo))
        }
    };

    let saved = crawler.crawl(&cli.seeds(), on_response, on_quit, stop.clone()).await;

    // 先停止进度提示，再输出结果
    stop.cancel();
    let _ = progress.await;
    println!();

    let (path, echo) = saved.context("无法保存检测结果")?;
    println!("{}", echo);
    println!("Results saved in '{}'.", path.display());
    Ok(())
}

/// 日志写入标准错误，避免干扰标准输出上的进度与结果
fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rstechcrawl=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 在独立线程阻塞读取标准输入，读到任意字节即发出停止信号
///
/// 标准输入已关闭（EOF）时，若启用了空闲退出则不视为停止信号。
fn watch_stdin(stop: CancellationToken, exit_when_idle: bool) {
    std::thread::spawn(move || {
        let mut buf = [0u8; 1];
        match std::io::stdin().read(&mut buf) {
            Ok(0) if exit_when_idle => {}
            _ => stop.cancel(),
        }
    });
}

/// 每 500ms 刷新一次 "Crawling" 进度提示
async fn show_progress(stop: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    let mut dots = 0usize;
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                print!("\r{:<12}", format!("Crawling{}", ".".repeat(dots)));
                let _ = std::io::stdout().flush();
                dots = (dots + 1) % 5;
            }
        }
    }
}
