//! Paging metadata carried in list response headers.

use std::fmt;
use std::str::FromStr;

use crate::http::HttpResponse;

pub const TOTAL_ENTRIES_HEADER: &str = "X-Total-Entries";
pub const PAGE_HEADER: &str = "X-Page";
pub const PER_PAGE_HEADER: &str = "X-Per-Page";

/// Paging information as reported by the provider. A field the provider did
/// not send stays `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub total_entries: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageInfo {
    pub fn from_response(response: &HttpResponse) -> Result<Self, InvalidPagingHeader> {
        Ok(Self {
            total_entries: header_number(response, TOTAL_ENTRIES_HEADER)?,
            page: header_number(response, PAGE_HEADER)?,
            per_page: header_number(response, PER_PAGE_HEADER)?,
        })
    }

    /// Number of pages, when both the total and the page size are known.
    pub fn total_pages(&self) -> Option<u64> {
        let per_page = u64::from(self.per_page?);
        if per_page == 0 {
            return None;
        }
        Some(self.total_entries?.div_ceil(per_page))
    }
}

/// A paging header that was present but not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPagingHeader {
    pub name: &'static str,
    pub value: String,
}

impl fmt::Display for InvalidPagingHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} header: {:?}", self.name, self.value)
    }
}

impl std::error::Error for InvalidPagingHeader {}

fn header_number<T: FromStr>(
    response: &HttpResponse,
    name: &'static str,
) -> Result<Option<T>, InvalidPagingHeader> {
    let Some(value) = response.header(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| InvalidPagingHeader {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: "[]".to_string(),
        }
    }

    #[test]
    fn reads_all_paging_headers() {
        let paging = PageInfo::from_response(&response(&[
            ("x-total-entries", "101"),
            ("X-Page", "2"),
            ("X-Per-Page", "50"),
        ]))
        .unwrap();
        assert_eq!(
            paging,
            PageInfo {
                total_entries: Some(101),
                page: Some(2),
                per_page: Some(50),
            }
        );
        assert_eq!(paging.total_pages(), Some(3));
    }

    #[test]
    fn missing_headers_stay_unset() {
        let paging = PageInfo::from_response(&response(&[("X-Page", "1")])).unwrap();
        assert_eq!(paging.page, Some(1));
        assert_eq!(paging.total_entries, None);
        assert_eq!(paging.per_page, None);
        assert_eq!(paging.total_pages(), None);
    }

    #[test]
    fn non_numeric_header_is_an_error() {
        let err = PageInfo::from_response(&response(&[("X-Per-Page", "lots")])).unwrap_err();
        assert_eq!(err.name, PER_PAGE_HEADER);
        assert_eq!(err.to_string(), "invalid X-Per-Page header: \"lots\"");
    }

    #[test]
    fn zero_page_size_has_no_page_count() {
        let paging = PageInfo {
            total_entries: Some(10),
            page: Some(1),
            per_page: Some(0),
        };
        assert_eq!(paging.total_pages(), None);
    }
}
