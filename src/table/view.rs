use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::query::{PageInfo, Record, TableParams, TableProps};

use super::column::Column;
use super::debounce::Debouncer;
use super::navigation::{Navigator, Visit, VisitOptions};
use super::render::{render_table, RenderedTable};
use super::sort::{next_sort, SortDescriptor};

/// Client-side table state for one page of a server-driven listing.
///
/// Every interaction turns into a [`Visit`] carrying the full parameter set; the
/// server's answer comes back through [`TableView::receive`]. The search box keeps
/// its own text and commits it through a debouncer, one pending commit at a time.
pub struct TableView<R> {
    pathname: String,
    columns: Vec<Column>,
    data: Vec<R>,
    filters: TableParams,
    page_info: PageInfo,
    local_search: String,
    sorting: Option<SortDescriptor>,
    debouncer: Debouncer,
    navigator: Arc<dyn Navigator>,
}

impl<R: Record> TableView<R> {
    pub fn new(
        pathname: impl Into<String>,
        columns: Vec<Column>,
        props: TableProps<R>,
        navigator: Arc<dyn Navigator>,
        debounce: Duration,
    ) -> Self {
        let local_search = props.filters.search.clone().unwrap_or_default();
        let sorting = SortDescriptor::from_filters(&props.filters);

        TableView {
            pathname: pathname.into(),
            columns,
            data: props.data,
            filters: props.filters,
            page_info: props.page_info,
            local_search,
            sorting,
            debouncer: Debouncer::new(debounce),
            navigator,
        }
    }

    pub fn local_search(&self) -> &str {
        &self.local_search
    }

    pub fn sorting(&self) -> Option<&SortDescriptor> {
        self.sorting.as_ref()
    }

    pub fn filters(&self) -> &TableParams {
        &self.filters
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    pub fn data(&self) -> &[R] {
        &self.data
    }

    fn visit(&self, params: TableParams) -> Visit {
        Visit {
            path: self.pathname.clone(),
            params,
            options: VisitOptions::TABLE,
        }
    }

    /// Keystroke in the search box. The text shows immediately; the navigation waits
    /// until the debounce delay passes without another keystroke.
    pub fn on_search_input(&mut self, text: &str) {
        self.local_search = text.to_string();

        let search = Some(text.to_string()).filter(|t| !t.is_empty());
        let visit = self.visit(TableParams {
            search,
            page: Some(1),
            ..self.filters.clone()
        });
        let navigator = self.navigator.clone();

        self.debouncer.call(move || {
            debug!("Committing search: {}", visit.url());
            navigator.visit(visit);
        });
    }

    /// Header click. Returns false when the column is unknown or not sortable.
    pub fn on_header_click(&mut self, key: &str) -> bool {
        let sortable = self
            .columns
            .iter()
            .any(|c| c.key() == key && c.is_sortable());
        if !sortable {
            return false;
        }

        let next = next_sort(self.sorting.as_ref(), key);
        let visit = self.visit(TableParams {
            sort: Some(next.column.clone()),
            direction: Some(next.direction.to_string()),
            page: Some(1),
            ..self.filters.clone()
        });
        self.sorting = Some(next);
        self.navigator.visit(visit);
        true
    }

    pub fn can_previous(&self) -> bool {
        self.page_info.has_previous()
    }

    /// False on the last page and on any page past it.
    pub fn can_next(&self) -> bool {
        self.page_info.has_next()
    }

    pub fn on_previous(&self) -> bool {
        if !self.can_previous() {
            return false;
        }
        self.go_to(self.page_info.current_page - 1);
        true
    }

    pub fn on_next(&self) -> bool {
        match self.page_info.current_page.checked_add(1) {
            Some(page) if self.can_next() => {
                self.go_to(page);
                true
            }
            _ => false,
        }
    }

    fn go_to(&self, page: u32) {
        self.navigator.visit(self.visit(TableParams {
            page: Some(page),
            ..self.filters.clone()
        }));
    }

    /// Applies the server's answer to a visit. Unless `preserve_state` is set, the
    /// local search text and sort are re-read from the new filters.
    pub fn receive(&mut self, props: TableProps<R>, options: VisitOptions) {
        self.data = props.data;
        self.page_info = props.page_info;
        self.filters = props.filters;

        if !options.preserve_state {
            self.local_search = self.filters.search.clone().unwrap_or_default();
            self.sorting = SortDescriptor::from_filters(&self.filters);
        }
    }

    pub fn render(&self) -> RenderedTable {
        render_table(
            &self.columns,
            &self.data,
            &self.page_info,
            self.sorting.as_ref(),
            &self.local_search,
        )
    }
}
