use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::DataTableError;
use crate::inertia::{PageObject, X_INERTIA};
use crate::query::{Record, TableProps};

use super::navigation::{History, Visit};
use super::view::TableView;

/// Fetches table pages from a server speaking the page-object protocol.
#[derive(Debug, Clone)]
pub struct PageClient {
    http: Client,
    base: Url,
}

impl PageClient {
    pub fn new(base: &str) -> Result<Self, DataTableError> {
        Ok(PageClient {
            http: Client::new(),
            base: Url::parse(base)?,
        })
    }

    pub fn url_for(&self, visit: &Visit) -> Result<Url, DataTableError> {
        Ok(self.base.join(&visit.url())?)
    }

    pub async fn fetch<R: DeserializeOwned>(
        &self,
        visit: &Visit,
    ) -> Result<PageObject<TableProps<R>>, DataTableError> {
        let url = self.url_for(visit)?;
        debug!("GET {}", url);

        let page = self
            .http
            .get(url)
            .header(X_INERTIA, "true")
            .send()
            .await?
            .error_for_status()?
            .json::<PageObject<TableProps<R>>>()
            .await?;
        Ok(page)
    }
}

/// Runs one visit end to end: fetch, record it in history, hand the props to the view.
pub async fn apply_visit<R>(
    client: &PageClient,
    history: &mut History,
    view: &mut TableView<R>,
    visit: Visit,
) -> Result<(), DataTableError>
where
    R: Record + DeserializeOwned,
{
    let page = client.fetch::<R>(&visit).await?;
    info!(
        "Loaded {} (page {} of {})",
        page.url, page.props.page_info.current_page, page.props.page_info.last_page
    );
    history.record(page.url, visit.options);
    view.receive(page.props, visit.options);
    Ok(())
}
