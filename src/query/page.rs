use serde::{Deserialize, Serialize};

use super::request::{TableParams, PARAM_PAGE};

/// One page of rows as produced by a query handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub per_page: u32,
}

impl<T> Paginated<T> {
    pub fn last_page_for(total: u64, per_page: u32) -> u32 {
        let per_page = u64::from(per_page.max(1));
        total.div_ceil(per_page).max(1) as u32
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            current_page: self.current_page,
            last_page: self.last_page,
            total: self.total,
            per_page: self.per_page,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub per_page: u32,
}

impl PageInfo {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// Page URLs. Each keeps every submitted query parameter except `page`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PageLinks {
    pub fn build(path: &str, query: &[(String, String)], page_info: &PageInfo) -> Self {
        let url = |page: u32| page_url(path, query, page);
        PageLinks {
            first: url(1),
            last: url(page_info.last_page),
            prev: page_info
                .has_previous()
                .then(|| url(page_info.current_page - 1)),
            next: page_info.has_next().then(|| url(page_info.current_page + 1)),
        }
    }
}

pub fn page_url(path: &str, query: &[(String, String)], page: u32) -> String {
    let page = page.to_string();
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter().filter(|(k, _)| k != PARAM_PAGE))
        .append_pair(PARAM_PAGE, &page)
        .finish();
    format!("{path}?{query}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
    pub links: PageLinks,
}

/// The props a table page carries over the wire: rows, the filters echo and paging
/// metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableProps<R> {
    pub data: Vec<R>,
    #[serde(default)]
    pub filters: TableParams,
    pub page_info: PageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PageLinks>,
}

impl<R> TableProps<R> {
    pub fn from_result(result: PageResult<R>, filters: TableParams) -> Self {
        TableProps {
            data: result.items,
            filters,
            page_info: result.page_info,
            links: Some(result.links),
        }
    }
}
