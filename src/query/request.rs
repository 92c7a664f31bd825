use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

pub const PARAM_SEARCH: &str = "search";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_DIRECTION: &str = "direction";
pub const PARAM_PAGE: &str = "page";

#[derive(
    AsRefStr, Display, EnumString, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Copy, Clone,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    /// Anything other than "asc"/"desc" (any case) falls back to descending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    pub fn toggled(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// The table's URL parameters as submitted. Used both for the server's `filters` echo
/// and for the parameter set of a client navigation request. Absent keys are omitted
/// when serialized.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TableParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl TableParams {
    /// Picks the table parameters out of raw query pairs. Later duplicates win; a page
    /// that is not a positive integer is dropped.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut params = TableParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                PARAM_SEARCH => params.search = Some(value.clone()),
                PARAM_SORT => params.sort = Some(value.clone()),
                PARAM_DIRECTION => params.direction = Some(value.clone()),
                PARAM_PAGE => params.page = value.trim().parse().ok().filter(|p| *p >= 1),
                _ => {}
            }
        }
        params
    }

    /// The recognized subset echoed back to the client: search, sort and direction.
    pub fn filters(&self) -> Self {
        TableParams {
            page: None,
            ..self.clone()
        }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push((PARAM_SEARCH.to_string(), search.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push((PARAM_SORT.to_string(), sort.clone()));
        }
        if let Some(direction) = &self.direction {
            pairs.push((PARAM_DIRECTION.to_string(), direction.clone()));
        }
        if let Some(page) = self.page {
            pairs.push((PARAM_PAGE.to_string(), page.to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }
}

/// A parsed filter/sort request, rebuilt from the URL on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRequest {
    path: String,
    query: Vec<(String, String)>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Direction,
    pub page: u32,
}

impl TableRequest {
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        let params = TableParams::from_pairs(&query);
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let sort = params
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        TableRequest {
            path: path.into(),
            query,
            search,
            sort,
            direction: Direction::parse_lenient(params.direction.as_deref()),
            page: params.page.unwrap_or(1),
        }
    }

    pub fn from_params(path: impl Into<String>, params: &TableParams) -> Self {
        Self::new(path, params.to_pairs())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// All submitted query pairs, including ones the table does not recognize.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn params(&self) -> TableParams {
        TableParams::from_pairs(&self.query)
    }
}
