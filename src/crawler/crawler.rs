//! 并发爬虫
//! 信号量限制并发、按URL去重、可选同站限制、收到停止信号后协作退出

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::fetcher::{HttpFetcher, PageFetcher};
use super::response::{CrawlLink, Response, Seed};
use crate::config::GlobalConfig;
use crate::error::TcResult;
use crate::utils::UrlResolver;

type ResponseCallback = Arc<dyn Fn(Response) + Send + Sync>;

/// 并发爬虫
#[derive(Clone)]
pub struct ConcurrentCrawler {
    fetcher: Arc<dyn PageFetcher>,
    max_concurrency: usize,
    follow_external_links: bool,
    exit_when_idle: bool,
}

impl ConcurrentCrawler {
    /// 使用默认HTTP抓取器创建
    pub fn new(config: &GlobalConfig) -> TcResult<Self> {
        Ok(Self::with_fetcher(Arc::new(HttpFetcher::new(config)?), config))
    }

    /// 使用自定义抓取器创建
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>, config: &GlobalConfig) -> Self {
        Self {
            fetcher,
            max_concurrency: config.effective_concurrency(),
            follow_external_links: config.follow_external_links,
            exit_when_idle: config.exit_when_idle,
        }
    }

    /// 开始爬取，直到 `stop` 被取消（或开启 exit_when_idle 后队列耗尽）
    ///
    /// 每个成功抓取的页面都会同步调用一次 `on_response`，调用可能来自多个任务。
    /// 退出调度循环后调用且仅调用一次 `on_quit`，其返回值作为本函数的返回值。
    /// 已持有许可的在途任务不会被中止，它们的结果可能在 `on_quit` 之后才送达。
    pub async fn crawl<R, Q, T>(
        &self,
        seeds: &[String],
        on_response: R,
        on_quit: Q,
        stop: CancellationToken,
    ) -> T
    where
        R: Fn(Response) + Send + Sync + 'static,
        Q: FnOnce() -> T,
    {
        let (pending_tx, mut pending_rx) = mpsc::unbounded_channel();
        let run = Arc::new(CrawlRun {
            fetcher: Arc::clone(&self.fetcher),
            semaphore: Arc::new(Semaphore::new(self.max_concurrency)),
            visited: Mutex::new(HashSet::new()),
            pending_tx,
            in_flight: AtomicUsize::new(0),
            follow_external_links: self.follow_external_links,
            exit_when_idle: self.exit_when_idle,
            done: stop.child_token(),
            on_response: Arc::new(on_response),
        });

        run.enqueue_seeds(seeds);

        let mut dispatched = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = run.done.cancelled() => break,
                next = pending_rx.recv() => match next {
                    Some(link) => {
                        dispatched += 1;
                        tokio::spawn(Arc::clone(&run).process(link));
                    }
                    None => break,
                },
            }
        }

        // 关闭队列，丢弃尚未调度的链接，在途任务的后续入队直接失败
        pending_rx.close();
        let mut drained = 0usize;
        while pending_rx.try_recv().is_ok() {
            drained += 1;
        }
        info!("爬取结束：已调度{}个链接，丢弃未调度{}个", dispatched, drained);

        on_quit()
    }
}

/// 单次爬取的共享状态
struct CrawlRun {
    fetcher: Arc<dyn PageFetcher>,
    semaphore: Arc<Semaphore>,
    // 已入队的URL，只增不减
    visited: Mutex<HashSet<Url>>,
    pending_tx: UnboundedSender<CrawlLink>,
    // 已入队但尚未处理完的链接数
    in_flight: AtomicUsize,
    follow_external_links: bool,
    exit_when_idle: bool,
    done: CancellationToken,
    on_response: ResponseCallback,
}

impl CrawlRun {
    /// 种子不参与去重判断，但会记入已访问集合
    fn enqueue_seeds(&self, seeds: &[String]) {
        {
            let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
            for raw in seeds {
                let Some(seed) = Seed::parse(raw) else {
                    debug!("种子URL解析失败，已忽略：{}", raw);
                    continue;
                };
                visited.insert(seed.url.clone());
                self.in_flight.fetch_add(1, Ordering::AcqRel);
                let _ = self.pending_tx.send(CrawlLink::seed(Arc::new(seed)));
            }
        }

        if self.in_flight.load(Ordering::Acquire) == 0 && self.exit_when_idle {
            debug!("没有可用的种子URL");
            self.done.cancel();
        }
    }

    /// 处理单个链接：获取许可 → 抓取 → 回调 → 出站链接入队 → 释放许可
    async fn process(self: Arc<Self>, link: CrawlLink) {
        let permit = tokio::select! {
            biased;
            _ = self.done.cancelled() => None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            self.finish();
            return;
        };

        match self.fetcher.fetch(&link).await {
            Ok(page) => {
                (self.on_response)(page.response);
                self.enqueue_links(&link.seed, page.links);
            }
            Err(e) => debug!("页面抓取失败，已丢弃：{}，错误：{}", link.url, e),
        }

        drop(permit);
        self.finish();
    }

    /// 出站链接过滤 + 去重 + 入队，在同一临界区内完成
    fn enqueue_links(&self, seed: &Arc<Seed>, links: Vec<Url>) {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        for url in links {
            if !self.follow_external_links && !UrlResolver::same_host(&url, &seed.url) {
                continue;
            }
            if visited.contains(&url) {
                continue;
            }
            visited.insert(url.clone());
            self.in_flight.fetch_add(1, Ordering::AcqRel);
            let _ = self.pending_tx.send(CrawlLink {
                url,
                seed: Arc::clone(seed),
            });
        }
    }

    fn finish(&self) {
        if self.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 && self.exit_when_idle {
            debug!("待抓取队列已空且无在途任务");
            self.done.cancel();
        }
    }
}
