//! Mastodon platform implementation
//!
//! This module provides integration with Mastodon and other Fediverse platforms
//! using the megalodon library. The megalodon client is async; [`MastodonApi`]
//! owns a current-thread tokio runtime and blocks on each request so callers
//! stay strictly sequential.

use megalodon::megalodon::{
    AccountFollowersInputOptions, GetFavouritesInputOptions, GetHomeTimelineInputOptions,
    SearchInputOptions, SearchType,
};
use megalodon::{Megalodon, SNS};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::platforms::{ApiResult, SocialApi};
use crate::types::{Limit, Post, User};

/// Largest page the Mastodon API serves for statuses and accounts
const PAGE_SIZE: usize = 40;

/// Mastodon platform client
pub struct MastodonApi {
    /// The megalodon client for API interactions
    client: Box<dyn Megalodon + Send + Sync>,

    /// Runtime driving the megalodon futures
    runtime: Runtime,

    /// The instance URL (e.g., "https://mastodon.social")
    instance_url: String,

    /// Account ID of the authenticated user, set by `authenticate`
    account_id: Option<String>,
}

impl MastodonApi {
    /// Create a new Mastodon client
    ///
    /// # Arguments
    ///
    /// * `instance_url` - The base URL of the Mastodon instance (e.g., "https://mastodon.social")
    /// * `access_token` - OAuth access token for authentication
    pub fn new(instance_url: String, access_token: String) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(PlatformError::Authentication(
                "Mastodon access token is empty".to_string(),
            )
            .into());
        }

        let client = megalodon::generator(
            SNS::Mastodon,
            instance_url.clone(),
            Some(access_token),
            None,
        )
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to start I/O runtime: {}", e)))?;

        Ok(Self {
            client,
            runtime,
            instance_url,
            account_id: None,
        })
    }

    /// Create a Mastodon client from configuration
    ///
    /// Uses the configured instance and the access token as bearer token.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.credentials().bearer_token().to_string();
        Self::new(config.instance_url(), token)
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn account_id(&self) -> ApiResult<String> {
        self.account_id
            .clone()
            .ok_or_else(|| PlatformError::Authentication("Not authenticated".to_string()))
    }
}

impl SocialApi for MastodonApi {
    fn authenticate(&mut self) -> ApiResult<()> {
        let response = self
            .runtime
            .block_on(self.client.verify_account_credentials())
            .map_err(|e| map_megalodon_error(e, "authenticate"))?;

        info!("Authenticated as @{}", response.json.acct);
        self.account_id = Some(response.json.id);
        Ok(())
    }

    fn search(&self, query: &str, limit: Limit) -> ApiResult<Vec<Post>> {
        let statuses = collect_pages(limit, |page_size, max_id| {
            let options = SearchInputOptions {
                r#type: Some(SearchType::Statuses),
                limit: Some(page_size),
                max_id,
                ..Default::default()
            };
            let response = self
                .runtime
                .block_on(self.client.search(query.to_string(), Some(&options)))
                .map_err(|e| map_megalodon_error(e, "search"))?;
            Ok(Page::keyed_by_last(response.json.statuses, |status| status.id.clone()))
        })?;

        Ok(statuses.into_iter().map(status_to_post).collect())
    }

    fn favorite(&self, post_id: &str) -> ApiResult<()> {
        let response = self
            .runtime
            .block_on(self.client.favourite_status(post_id.to_string()))
            .map_err(|e| map_megalodon_error(e, "favourite status"))?;

        debug!("Favourited status {}", response.json.id);
        Ok(())
    }

    fn favorites(&self, limit: Limit) -> ApiResult<Vec<Post>> {
        let statuses = collect_pages(limit, |page_size, max_id| {
            let options = GetFavouritesInputOptions {
                limit: Some(page_size),
                max_id,
                ..Default::default()
            };
            let response = self
                .runtime
                .block_on(self.client.get_favourites(Some(&options)))
                .map_err(|e| map_megalodon_error(e, "get favourites"))?;
            let link = response.header.get("link").and_then(|v| v.to_str().ok());
            Ok(Page::linked(response.json, link))
        })?;

        Ok(statuses.into_iter().map(status_to_post).collect())
    }

    fn followers(&self, limit: Limit) -> ApiResult<Vec<User>> {
        let account_id = self.account_id()?;

        let accounts = collect_pages(limit, |page_size, max_id| {
            let options = AccountFollowersInputOptions {
                limit: Some(page_size),
                max_id,
                ..Default::default()
            };
            let response = self
                .runtime
                .block_on(
                    self.client
                        .get_account_followers(account_id.clone(), Some(&options)),
                )
                .map_err(|e| map_megalodon_error(e, "get followers"))?;
            let link = response.header.get("link").and_then(|v| v.to_str().ok());
            Ok(Page::linked(response.json, link))
        })?;

        Ok(accounts
            .into_iter()
            .map(|account| User::new(account.id, account.acct))
            .collect())
    }

    fn home_timeline(&self, limit: Limit) -> ApiResult<Vec<Post>> {
        let statuses = collect_pages(limit, |page_size, max_id| {
            let options = GetHomeTimelineInputOptions {
                limit: Some(page_size),
                max_id,
                ..Default::default()
            };
            let response = self
                .runtime
                .block_on(self.client.get_home_timeline(Some(&options)))
                .map_err(|e| map_megalodon_error(e, "get home timeline"))?;
            Ok(Page::keyed_by_last(response.json, |status| status.id.clone()))
        })?;

        Ok(statuses.into_iter().map(status_to_post).collect())
    }

    fn name(&self) -> &str {
        "mastodon"
    }
}

/// One page of results plus the `max_id` cursor for the page after it
struct Page<T> {
    items: Vec<T>,
    next_max_id: Option<String>,
}

impl<T> Page<T> {
    /// Cursor taken from the id of the last item
    ///
    /// Valid for endpoints that page by the ids they return (search, timelines).
    fn keyed_by_last<K: Fn(&T) -> String>(items: Vec<T>, id_of: K) -> Self {
        let next_max_id = items.last().map(id_of);
        Self { items, next_max_id }
    }

    /// Cursor taken from the `Link` response header
    ///
    /// Favourites and followers page by internal record ids that only appear
    /// in the header, never in the returned entities.
    fn linked(items: Vec<T>, link: Option<&str>) -> Self {
        Self {
            items,
            next_max_id: link.and_then(next_max_id_from_link),
        }
    }
}

/// Extract `max_id` from the `rel="next"` entry of a `Link` header
///
/// e.g. `<https://example.social/api/v1/favourites?max_id=88>; rel="next", <...>; rel="prev"`
fn next_max_id_from_link(link: &str) -> Option<String> {
    link.split(',')
        .find(|entry| entry.contains("rel=\"next\""))
        .and_then(|entry| {
            let start = entry.find('<')? + 1;
            let end = entry[start..].find('>')? + start;
            let url = &entry[start..end];
            let query = &url[url.find('?')? + 1..];
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("max_id="))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
}

/// Gather up to `limit` items, following each page's `max_id` cursor
///
/// `fetch` receives the page size and the cursor. Paging stops at the limit,
/// on an empty page, when no further cursor is given, or when the cursor
/// stops moving. A page served again for an unchanged cursor is dropped.
fn collect_pages<T, F>(limit: Limit, mut fetch: F) -> ApiResult<Vec<T>>
where
    F: FnMut(u32, Option<String>) -> ApiResult<Page<T>>,
{
    let mut items = Vec::new();
    let mut max_id: Option<String> = None;

    loop {
        let wanted = match limit {
            Some(limit) if items.len() >= limit => break,
            Some(limit) => (limit - items.len()).min(PAGE_SIZE),
            None => PAGE_SIZE,
        };

        let page = fetch(wanted as u32, max_id.clone())?;
        if page.items.is_empty() {
            break;
        }
        if max_id.is_some() && page.next_max_id == max_id {
            debug!("Paging cursor did not advance, stopping");
            break;
        }

        items.extend(page.items);

        match page.next_max_id {
            Some(next) => max_id = Some(next),
            None => break,
        }
    }

    if let Some(limit) = limit {
        items.truncate(limit);
    }
    Ok(items)
}

fn status_to_post(status: megalodon::entities::Status) -> Post {
    Post::new(status.id, strip_html(&status.content))
}

/// Reduce status HTML to plain text
fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => text.push(c),
        }
    }

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map megalodon errors to PlatformError
///
/// # Error Mapping
///
/// - "already favourited" messages or API code 139 → `PlatformError::AlreadyFavorited`
/// - HTTP 429 → `PlatformError::RateLimit`
/// - HTTP 401/403 → `PlatformError::Authentication`
/// - HTTP 5xx → `PlatformError::Network`
/// - Other HTTP errors → `PlatformError::Request`
/// - No status code → classified by message, defaulting to `PlatformError::Network`
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    classify_error_message(&error.to_string(), context)
}

fn classify_error_message(error_str: &str, context: &str) -> PlatformError {
    let error_lower = error_str.to_lowercase();

    if error_lower.contains("already favorited")
        || error_lower.contains("already favourited")
        || error_lower.contains("code: 139")
    {
        return PlatformError::AlreadyFavorited(format!(
            "Mastodon ({}): {}",
            context, error_str
        ));
    }

    match extract_http_status(error_str) {
        Some(429) => PlatformError::RateLimit(format!(
            "Mastodon rate limit exceeded ({}): {}",
            context, error_str
        )),
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "Mastodon authentication failed ({}): {}. \
                Suggestion: Verify your access token is valid and has not expired.",
            context, error_str
        )),
        Some(500..=599) => PlatformError::Network(format!(
            "Mastodon server error ({}): {}",
            context, error_str
        )),
        Some(_) => {
            PlatformError::Request(format!("Mastodon HTTP error ({}): {}", context, error_str))
        }
        None => {
            if error_lower.contains("rate limit") || error_lower.contains("too many requests") {
                PlatformError::RateLimit(format!(
                    "Mastodon rate limit exceeded ({}): {}",
                    context, error_str
                ))
            } else if error_lower.contains("unauthorized") || error_lower.contains("forbidden") {
                PlatformError::Authentication(format!(
                    "Mastodon authentication failed ({}): {}",
                    context, error_str
                ))
            } else if error_lower.contains("parse")
                || error_lower.contains("json")
                || error_lower.contains("deserialize")
            {
                PlatformError::Request(format!(
                    "Mastodon response parse error ({}): {}",
                    context, error_str
                ))
            } else {
                PlatformError::Network(format!(
                    "Mastodon error ({}): {}. \
                        Suggestion: Check your network connection and instance availability.",
                    context, error_str
                ))
            }
        }
    }
}

/// Extract HTTP status code from error message
///
/// Looks for patterns like "HTTP 401", "status 403", "401:", etc.
fn extract_http_status(error_str: &str) -> Option<u16> {
    let prefixes = ["HTTP ", "status ", "code: ", "status_code: "];

    for prefix in &prefixes {
        if let Some(pos) = error_str.find(prefix) {
            let after_prefix = &error_str[pos + prefix.len()..];
            if let Some(code) = after_prefix.get(0..3).and_then(|s| s.parse::<u16>().ok()) {
                if (100..=599).contains(&code) {
                    return Some(code);
                }
            }
        }
    }

    // Standalone 3-digit codes followed by colon or space
    let bytes = error_str.as_bytes();
    for (i, window) in bytes.windows(4).enumerate() {
        if window[..3].iter().all(u8::is_ascii_digit)
            && (window[3] == b':' || window[3] == b' ')
            && (i == 0 || !bytes[i - 1].is_ascii_digit())
        {
            let code = std::str::from_utf8(&window[..3])
                .ok()
                .and_then(|s| s.parse::<u16>().ok());
            if let Some(code) = code.filter(|c| (100..=599).contains(c)) {
                return Some(code);
            }
        }
    }

    None
}
