//! Page arithmetic and sort allow-lists shared by every paginated listing.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 10;

/// A 1-based page request with the limit clamped to `[1, MAX_LIMIT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(DEFAULT_PAGE as i64).clamp(1, u32::MAX as i64) as u32;
        let limit = limit
            .unwrap_or(DEFAULT_LIMIT as i64)
            .clamp(1, MAX_LIMIT as i64) as u32;
        Self { page, limit }
    }

    /// Lenient parse of raw query values: the leading integer is used and
    /// the rest ignored (`"2.5"` is 2, `"10abc"` is 10). A value with no
    /// leading digits counts as absent.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(page.and_then(leading_int), limit.and_then(leading_int))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // Saturates; the caller clamps anyway.
    let value = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// `max(ceil(total / limit), 1)`: an empty result still reports one page.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    let limit = u64::from(limit.max(1));
    total.div_ceil(limit).max(1)
}

/// One page of results plus the count of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total_pages(total, request.limit()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `"asc"` sorts ascending; anything else, including nothing, descends.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Fields a video listing may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    Views,
    Title,
}

impl VideoSortField {
    /// Unrecognized names fall back to `CreatedAt`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("views") => VideoSortField::Views,
            Some("title") => VideoSortField::Title,
            _ => VideoSortField::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoSort {
    pub field: VideoSortField,
    pub order: SortOrder,
}

impl VideoSort {
    pub fn parse(sort_by: Option<&str>, sort_type: Option<&str>) -> Self {
        Self {
            field: VideoSortField::parse(sort_by),
            order: SortOrder::parse(sort_type),
        }
    }
}
