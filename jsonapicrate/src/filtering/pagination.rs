use sea_orm::{EntityTrait, QuerySelect, Select};
use serde::Serialize;
use serde_json::{Map, Value};

use super::cast::Cast;
use super::query_parser::{PAGE_LIMIT, PAGE_NUMBER, QueryParams};
use crate::config::QueryConfig;

/// Resolved `page[number]` / `page[limit]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Resolves raw page values against the configured bounds.
    ///
    /// A non-positive or unreadable page becomes 1, a non-positive or
    /// unreadable size becomes `default_per_page`, and the size is then capped
    /// at `max_per_page`.
    #[must_use]
    pub fn resolve(
        page: Option<&str>,
        per_page: Option<&str>,
        default_per_page: u64,
        max_per_page: u64,
    ) -> Self {
        let positive = |raw: Option<&str>| {
            raw.map(Cast::integer)
                .filter(|n| *n > 0)
                .and_then(|n| u64::try_from(n).ok())
        };
        let page = positive(page).unwrap_or(1);
        let per_page = positive(per_page).unwrap_or(default_per_page).min(max_per_page);
        Self { page, per_page }
    }

    #[must_use]
    pub fn from_params(params: &QueryParams, config: &QueryConfig) -> Self {
        Self::resolve(
            params.page_number(),
            params.page_limit(),
            config.default_per_page,
            config.max_per_page,
        )
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn apply<E: EntityTrait>(&self, select: Select<E>) -> Select<E> {
        select.limit(self.limit()).offset(self.offset())
    }

    /// Pages needed for `total_count` records.
    #[must_use]
    pub fn total_pages(&self, total_count: u64) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        total_count.div_ceil(self.per_page)
    }
}

/// The five pagination links of a collection document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PaginationLinks {
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("self".into(), Value::String(self.self_link.clone()));
        map.insert("first".into(), Value::String(self.first.clone()));
        map.insert("last".into(), Value::String(self.last.clone()));
        if let Some(next) = &self.next {
            map.insert("next".into(), Value::String(next.clone()));
        }
        if let Some(prev) = &self.prev {
            map.insert("prev".into(), Value::String(prev.clone()));
        }
        map
    }
}

/// Builds page links once the data source has reported the page count.
///
/// `current_page` is used verbatim for `self`, even when it lies outside
/// `1..=total_pages`; in that case neither `next` nor `prev` is produced.
#[derive(Debug, Clone)]
pub struct Paginator {
    pub current_page: u64,
    pub total_pages: u64,
    pub per_page: u64,
    base_url: String,
    params: QueryParams,
}

impl Paginator {
    #[must_use]
    pub fn new(
        current_page: u64,
        total_pages: u64,
        per_page: u64,
        base_url: impl Into<String>,
        params: &QueryParams,
    ) -> Self {
        Self {
            current_page,
            total_pages,
            per_page,
            base_url: base_url.into(),
            params: params.clone(),
        }
    }

    fn in_range(&self, page: u64) -> bool {
        (1..=self.total_pages).contains(&page)
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u64> {
        let next = self.current_page.checked_add(1)?;
        (self.in_range(self.current_page) && self.in_range(next)).then_some(next)
    }

    #[must_use]
    pub fn prev_page(&self) -> Option<u64> {
        let prev = self.current_page.checked_sub(1)?;
        (self.in_range(self.current_page) && self.in_range(prev)).then_some(prev)
    }

    /// Link to `page`, carrying every original query parameter.
    #[must_use]
    pub fn page_url(&self, page: u64) -> String {
        let mut params = self.params.clone();
        params.set(PAGE_NUMBER, page.to_string());
        params.set(PAGE_LIMIT, self.per_page.to_string());
        format!("{}?{}", self.base_url, params.to_query_string())
    }

    #[must_use]
    pub fn links(&self) -> PaginationLinks {
        PaginationLinks {
            self_link: self.page_url(self.current_page),
            first: self.page_url(1),
            last: self.page_url(self.total_pages.max(1)),
            next: self.next_page().map(|page| self.page_url(page)),
            prev: self.prev_page().map(|page| self.page_url(page)),
        }
    }
}
