//! Page slicing and page-link construction for listing endpoints.
//!
//! Page numbers are 1-based. A requested page that is not an integer
//! resolves to page 1; an integer outside `1..=num_pages` resolves to the
//! last page. An empty listing still has one (empty) page.

use serde::Serialize;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// One resolved page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub count: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page)
        }
    }

    /// Resolve the raw `page` query value to a valid page.
    pub fn page(&self, requested: Option<&str>) -> PageInfo {
        let num_pages = self.num_pages();
        let number = match requested.and_then(parse_page_number) {
            None => 1,
            Some(n) if n < 1 || n as u64 > num_pages => num_pages,
            Some(n) => n as u64,
        };

        PageInfo {
            number,
            num_pages,
            per_page: self.per_page,
            count: self.count,
        }
    }
}

impl PageInfo {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    /// Number of items on this page.
    pub fn len(&self) -> u64 {
        self.count.saturating_sub(self.offset()).min(self.per_page)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_previous() || self.has_next()
    }
}

fn parse_page_number(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Ordered query parameters of a request, repeated keys included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self(pairs)
    }

    /// Last value for `key`, like a form field read.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copy with every `key` entry removed.
    pub fn without(&self, key: &str) -> Self {
        Self(self.0.iter().filter(|(k, _)| k != key).cloned().collect())
    }

    /// Copy with `key` set to the single `value`, keeping its first position.
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut pairs = Vec::with_capacity(self.0.len() + 1);
        let mut replaced = false;
        for (k, v) in &self.0 {
            if k == key {
                if !replaced {
                    pairs.push((k.clone(), value.to_string()));
                    replaced = true;
                }
            } else {
                pairs.push((k.clone(), v.clone()));
            }
        }
        if !replaced {
            pairs.push((key.to_string(), value.to_string()));
        }
        Self(pairs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    /// `?`-prefixed query string, or empty when there are no parameters.
    pub fn to_query_string(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("?{}", self.encode())
        }
    }
}

/// Navigation links around the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedPages {
    pub has_other: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// URL of `page` on `path`, keeping every other query parameter.
/// Page 1 drops the `page` parameter.
pub fn page_url(path: &str, params: &QueryParams, page: u64) -> String {
    let params = if page == 1 {
        params.without("page")
    } else {
        params.with("page", &page.to_string())
    };
    format!("{}{}", path, params.to_query_string())
}

pub fn related_pages(path: &str, params: &QueryParams, page: &PageInfo) -> RelatedPages {
    let mut related = RelatedPages {
        has_other: page.has_other_pages(),
        ..Default::default()
    };
    if page.has_previous() {
        related.first = Some(page_url(path, params, 1));
        related.prev = Some(page_url(path, params, page.number - 1));
    }
    if page.has_next() {
        related.last = Some(page_url(path, params, page.num_pages));
        related.next = Some(page_url(path, params, page.number + 1));
    }
    related
}
