#![allow(dead_code)]

use std::time::Duration;

use rss_reader::{
    article::Enricher,
    config::Config,
    extractor::{PageResolver, ResolverSettings},
    fetcher::build_client,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub fn test_config() -> Config {
    Config::default()
        .with_feed_retry(3, Duration::from_millis(10))
        .with_timeouts(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_secs(2),
        )
        .with_concurrency(4, 4)
}

pub fn resolver() -> PageResolver {
    PageResolver::new(build_client().unwrap(), ResolverSettings::from(&test_config()))
}

pub fn enricher() -> Enricher {
    Enricher::new(resolver())
}

pub async fn mount_page(server: &MockServer, route: &str, html: impl Into<String>) {
    mount_page_delayed(server, route, html, Duration::ZERO).await;
}

pub async fn mount_page_delayed(server: &MockServer, route: &str, html: impl Into<String>, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html.into(), "text/html; charset=utf-8")
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

pub async fn mount_image(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"))
        .mount(server)
        .await;
}

pub async fn mount_feed(server: &MockServer, route: &str, xml: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml.into(), "application/rss+xml"))
        .mount(server)
        .await;
}

/// A minimal article page with the given image tags and meta description.
pub fn article_page(title: &str, meta_description: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>{title}</title>
<meta name="description" content="{meta_description}"></head>
<body><article>{body}</article></body></html>"#
    )
}

pub fn rss_item(title: &str, link: Option<&str>, pub_date: &str, description: Option<&str>) -> String {
    let link = link.map(|l| format!("<link>{l}</link>")).unwrap_or_default();
    let description = description
        .map(|d| format!("<description><![CDATA[{d}]]></description>"))
        .unwrap_or_default();
    format!("<item><title>{title}</title>{link}<pubDate>{pub_date}</pubDate>{description}</item>")
}

pub fn rss_document(title: &str, items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><link>https://news.example.com/</link>
<description>test feed</description>{}</channel></rss>"#,
        items.concat()
    )
}
