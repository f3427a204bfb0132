/// Link understanding: download a web page and reduce it to readable text.
use std::net::IpAddr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use claimdesk_core::{normalize_whitespace, AdapterError, AdapterKind, PageFetcher};
use reqwest::{header, Client};
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};
use url::{Host, Url};

use crate::http::{from_reqwest, from_status};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; ClaimDesk/0.1)";
const DEFAULT_MAX_CHARS: usize = 200_000;
const MAX_REDIRECTS: usize = 5;

/// Elements whose text is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["head", "title", "script", "style", "noscript", "template"];

/// The readable parts of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUnderstanding {
    pub url: String,
    pub title: Option<String>,
    pub content_type: String,
    pub text: String,
}

impl LinkUnderstanding {
    /// Title on its own line, then the body.
    pub fn into_text(self) -> String {
        match self.title {
            Some(title) if !title.is_empty() => format!("{title}\n\n{}", self.text),
            _ => self.text,
        }
    }
}

pub struct LinkFetcher {
    client: Client,
    allow_private_hosts: bool,
    allowed_hosts: Vec<String>,
    max_chars: usize,
}

impl LinkFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            allow_private_hosts: false,
            allowed_hosts: Vec::new(),
            max_chars: DEFAULT_MAX_CHARS,
        })
    }

    /// Permit loopback and private-range targets.
    pub fn allow_private_hosts(mut self, allow: bool) -> Self {
        self.allow_private_hosts = allow;
        self
    }

    /// Exempt one host (exact name or IP literal) from the private-address check.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.push(host.into().trim().to_ascii_lowercase());
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    async fn check_target(&self, url: &Url) -> Result<(), AdapterError> {
        if self.allow_private_hosts {
            return Ok(());
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if self.allowed_hosts.iter().any(|allowed| *allowed == host) {
            return Ok(());
        }
        guard_public_host(url).await
    }

    /// GET `url`, following redirects by hand so every hop is checked
    /// before it is requested. Returns the final URL and its response.
    async fn get_checked(&self, mut url: Url) -> Result<(Url, reqwest::Response), AdapterError> {
        for _ in 0..=MAX_REDIRECTS {
            self.check_target(&url).await?;
            let resp = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "text/html,text/plain;q=0.9,*/*;q=0.5")
                .send()
                .await
                .map_err(|e| from_reqwest(AdapterKind::Fetch, &e))?;

            let status = resp.status();
            if !status.is_redirection() {
                return Ok((url, resp));
            }
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    AdapterError::fatal(AdapterKind::Fetch, format!("{status} without a Location header"))
                })?;
            let next = url.join(location).map_err(|e| {
                AdapterError::fatal(AdapterKind::Fetch, format!("invalid redirect target '{location}': {e}"))
            })?;
            let next = parse_target(next.as_str())?;
            debug!(from = %url, to = %next, %status, "following redirect");
            url = next;
        }
        Err(AdapterError::fatal(
            AdapterKind::Fetch,
            format!("too many redirects (more than {MAX_REDIRECTS})"),
        ))
    }

    pub async fn understand(&self, raw_url: &str) -> Result<LinkUnderstanding, AdapterError> {
        let url = parse_target(raw_url)?;
        info!(url = %url, "fetching page");
        let (url, resp) = self.get_checked(url).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(from_status(AdapterKind::Fetch, status, &body));
        }

        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();

        let is_html = content_type.contains("html");
        let is_text = content_type.starts_with("text/") || content_type.contains("json") || content_type.contains("xml");
        if !is_html && !is_text {
            return Err(AdapterError::fatal(
                AdapterKind::Fetch,
                format!("unsupported content type: {content_type}"),
            ));
        }

        let body = resp.text().await.map_err(|e| from_reqwest(AdapterKind::Fetch, &e))?;
        let body: String = body.chars().take(self.max_chars).collect();

        let (title, text) = if is_html {
            let document = Html::parse_document(&body);
            (title_of(&document), visible_text(&document))
        } else {
            (None, normalize_whitespace(&body))
        };

        if text.is_empty() && title.is_none() {
            return Err(AdapterError::fatal(AdapterKind::Fetch, "the page has no readable text"));
        }

        Ok(LinkUnderstanding {
            url: url.to_string(),
            title,
            content_type,
            text,
        })
    }
}

#[async_trait]
impl PageFetcher for LinkFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AdapterError> {
        self.understand(url).await.map(LinkUnderstanding::into_text)
    }
}

fn parse_target(raw: &str) -> Result<Url, AdapterError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AdapterError::fatal(AdapterKind::Fetch, format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AdapterError::fatal(
                AdapterKind::Fetch,
                format!("unsupported URL scheme '{other}'"),
            ))
        }
    }
    if url.host().is_none() {
        return Err(AdapterError::fatal(AdapterKind::Fetch, format!("URL '{raw}' has no host")));
    }
    Ok(url)
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || (v4.octets()[0] == 100 && (64..128).contains(&v4.octets()[1]))
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().map(|v4| is_private_ip(IpAddr::V4(v4))).unwrap_or(false)
        }
    }
}

async fn guard_public_host(url: &Url) -> Result<(), AdapterError> {
    let blocked = || {
        warn!(url = %url, "refusing to fetch private address");
        AdapterError::fatal(AdapterKind::Fetch, "refusing to fetch a private or local address")
    };

    match url.host() {
        Some(Host::Ipv4(ip)) if is_private_ip(IpAddr::V4(ip)) => Err(blocked()),
        Some(Host::Ipv6(ip)) if is_private_ip(IpAddr::V6(ip)) => Err(blocked()),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            if domain == "localhost" || domain.ends_with(".localhost") {
                return Err(blocked());
            }
            let port = url.port_or_known_default().unwrap_or(80);
            let addrs = tokio::net::lookup_host((domain.as_str(), port))
                .await
                .map_err(|e| AdapterError::transient(AdapterKind::Fetch, format!("DNS lookup failed: {e}")))?;
            for addr in addrs {
                if is_private_ip(addr.ip()) {
                    return Err(blocked());
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn title_of(document: &Html) -> Option<String> {
    let title = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "title")?;
    let title = normalize_whitespace(&title.text().collect::<Vec<_>>().join(" "));
    (!title.is_empty()).then_some(title)
}

fn visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|parent| {
            parent
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(&**text);
        }
    }
    normalize_whitespace(&parts.join(" "))
}

fn extract_title(html: &str) -> Option<String> {
    title_of(&Html::parse_document(html))
}

/// Visible text of an HTML document, without title, scripts or styles.
/// Character references are decoded.
pub fn html_to_text(html: &str) -> String {
    visible_text(&Html::parse_document(html))
}
