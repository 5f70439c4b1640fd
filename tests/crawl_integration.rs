use std::sync::{Arc, Mutex};
use std::time::Duration;

use rstechcrawl::{
    CatalogLoader, ConcurrentCrawler, ConfigManager, CrawlReport, GlobalConfig, OutputFormat, Response,
    ResultSink, WebAnalyzer,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"{
    "categories": {
        "1": {"name": "CMS"},
        "12": {"name": "JavaScript frameworks"},
        "22": {"name": "Web servers"},
        "66": {"name": "UI frameworks"}
    },
    "technologies": {
        "Nginx": {"headers": {"Server": "nginx(?:/([\\d.]+))?"}, "cats": [22], "website": "https://nginx.org"},
        "Tengine": {"headers": {"Server": "nginx/([\\d.]+)\\;version:\\1"}},
        "PHP": {"cookies": {"PHPSESSID": ""}, "cats": [27]},
        "jQuery": {"scripts": "jquery.*\\.js", "cats": [12]},
        "Vue.js": {"js": {"Vue.version": "Vue\\.component"}, "cats": [12], "implies": "Node.js"},
        "Bootstrap": {"css": "\\.bootstrap-grid", "cats": [66]},
        "Hugo": {"html": "<meta name=\"generator\" content=\"Hugo", "cats": [1], "excludes": ["WordPress"]},
        "Broken": {"scripts": ["(?<=x)broken", "broken\\.js"]}
    }
}"#;

async fn mount_page(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(body.to_string())
}

fn config(follow_external: bool) -> GlobalConfig {
    ConfigManager::custom()
        .follow_external_links(follow_external)
        .exit_when_idle(true)
        .http_timeout(Some(5))
        .max_concurrency(4)
        .build()
}

/// 爬取到空闲为止，返回分析器累积的结果
async fn crawl(config: &GlobalConfig, seeds: &[String]) -> (CrawlReport, Vec<String>) {
    let analyzer = Arc::new(WebAnalyzer::from_catalog(&CatalogLoader::from_json_str(CATALOG).unwrap()));
    let visited = Arc::new(Mutex::new(Vec::new()));

    let on_response = {
        let analyzer = Arc::clone(&analyzer);
        let visited = Arc::clone(&visited);
        move |response: Response| {
            visited.lock().unwrap().push(response.url.path().to_string());
            analyzer.analyze(&response);
        }
    };
    let crawler = ConcurrentCrawler::new(config).unwrap();
    let report = tokio::time::timeout(
        Duration::from_secs(20),
        crawler.crawl(seeds, on_response, || analyzer.report(), CancellationToken::new()),
    )
    .await
    .expect("crawl did not finish");

    let mut visited = visited.lock().unwrap().clone();
    visited.sort();
    (report, visited)
}

fn names(report: &CrawlReport, seed: &str) -> Vec<String> {
    report[seed]
        .detected_technologies
        .iter()
        .map(|t| t.name.clone())
        .collect()
}

#[tokio::test]
async fn test_header_and_cookie_detection() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html("<html><body>hello</body></html>")
            .insert_header("server", "nginx/1.25.3")
            .insert_header("set-cookie", "PHPSESSID=abc123; Path=/"),
    )
    .await;

    let seed = format!("{}/", server.uri());
    let (report, visited) = crawl(&config(false), &[seed.clone()]).await;

    assert_eq!(visited, vec!["/"]);
    assert_eq!(names(&report, &seed), vec!["Nginx", "PHP"]);
    assert_eq!(report[&seed].detected_technologies[0].website, "https://nginx.org");
    // 分类27不存在于指纹库
    assert_eq!(report[&seed].categories, vec!["", "Web servers"]);
}

#[tokio::test]
async fn test_scripts_styles_and_html() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            r#"<html><head>
                <meta name="generator" content="Hugo 0.120.0">
                <link rel="stylesheet" href="/css/site.css">
                <script src="/js/jquery-3.7.1.min.js"></script>
                <script src="/js/app.js"></script>
                <script src="http://127.0.0.1:1/broken.js"></script>
            </head><body></body></html>"#,
        ),
    )
    .await;
    mount_page(&server, "/css/site.css", ResponseTemplate::new(200).set_body_string(".bootstrap-grid{display:block}")).await;
    mount_page(&server, "/js/jquery-3.7.1.min.js", ResponseTemplate::new(200).set_body_string("/*! jQuery */")).await;
    mount_page(&server, "/js/app.js", ResponseTemplate::new(200).set_body_string("Vue.component('app', {})")).await;

    let seed = format!("{}/", server.uri());
    let (report, _) = crawl(&config(false), &[seed.clone()]).await;

    // 拉取失败的脚本既不记录链接也不记录内容
    assert_eq!(names(&report, &seed), vec!["Bootstrap", "Hugo", "Vue.js", "jQuery"]);
    assert_eq!(report[&seed].implies, vec!["Node.js"]);
    assert_eq!(report[&seed].excludes, vec!["WordPress"]);
    assert_eq!(
        report[&seed].categories,
        vec!["CMS", "JavaScript frameworks", "UI frameworks"]
    );
}

#[tokio::test]
async fn test_same_site_scope() {
    let site_a = MockServer::start().await;
    let site_b = MockServer::start().await;

    mount_page(
        &site_a,
        "/",
        html(&format!(
            r#"<a href="/x">x</a><a href="{}/y">y</a><a href="/x#top">x again</a>"#,
            site_b.uri()
        )),
    )
    .await;
    mount_page(&site_a, "/x", html(r#"<a href="/">home</a>"#)).await;
    Mock::given(method("GET"))
        .respond_with(html("<p>external</p>"))
        .expect(0)
        .mount(&site_b)
        .await;

    let seed = format!("{}/", site_a.uri());
    let (report, visited) = crawl(&config(false), &[seed.clone()]).await;

    assert_eq!(visited, vec!["/", "/x", "/x"]);
    assert_eq!(report.len(), 1);
    assert!(report.contains_key(&seed));
}

#[tokio::test]
async fn test_follow_external_groups_by_seed() {
    let site_a = MockServer::start().await;
    let site_b = MockServer::start().await;

    mount_page(&site_a, "/", html(&format!(r#"<a href="{}/y">y</a>"#, site_b.uri()))).await;
    mount_page(&site_b, "/y", html("<p>b</p>").insert_header("server", "nginx")).await;

    let seed = format!("{}/", site_a.uri());
    let (report, visited) = crawl(&config(true), &[seed.clone()]).await;

    assert_eq!(visited, vec!["/", "/y"]);
    // 外部页面的结果归入发现它的种子
    assert_eq!(names(&report, &seed), vec!["Nginx"]);
}

#[tokio::test]
async fn test_non_success_page_is_analyzed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        ResponseTemplate::new(404)
            .insert_header("server", "nginx")
            .set_body_string("not found"),
    )
    .await;

    let seed = format!("{}/", server.uri());
    let (report, visited) = crawl(&config(false), &[seed.clone()]).await;
    assert_eq!(visited, vec!["/"]);
    assert_eq!(names(&report, &seed), vec!["Nginx"]);
}

#[tokio::test]
async fn test_full_pipeline_to_result_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html(r#"<a href="/about">about</a>"#)).await;
    mount_page(&server, "/about", html("<p>about</p>").insert_header("server", "nginx/1.0")).await;
    mount_page(&server, "/technologies.json", ResponseTemplate::new(200).set_body_string(CATALOG)).await;

    let dir = TempDir::new().unwrap();
    let result_path = dir.path().join("fingerprints.msgpack");
    let config = ConfigManager::custom()
        .catalog_location(format!("{}/technologies.json", server.uri()))
        .result_path(result_path.clone())
        .output_format(OutputFormat::MsgPack)
        .exit_when_idle(true)
        .build();

    let analyzer = Arc::new(WebAnalyzer::new(&config).await.unwrap());
    let sink = ResultSink::from_config(&config);
    let crawler = ConcurrentCrawler::new(&config).unwrap();

    let seed = format!("{}/", server.uri());
    let on_response = {
        let analyzer = Arc::clone(&analyzer);
        move |response: Response| analyzer.analyze(&response)
    };
    let saved = tokio::time::timeout(
        Duration::from_secs(20),
        crawler.crawl(&[seed.clone()], on_response, || sink.save(&analyzer.report()), CancellationToken::new()),
    )
    .await
    .expect("crawl did not finish")
    .unwrap();

    assert_eq!(saved, result_path);
    let decoded: CrawlReport = rmp_serde::from_slice(&std::fs::read(&result_path).unwrap()).unwrap();
    assert_eq!(names(&decoded, &seed), vec!["Nginx"]);
}

#[tokio::test]
async fn test_missing_catalog_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = ConfigManager::custom()
        .catalog_location(dir.path().join("missing.json").display().to_string())
        .build();
    assert!(WebAnalyzer::new(&config).await.is_err());
}
