use log::debug;

use crate::config::TableConfig;
use crate::error::DataTableError;

use super::handle::QueryHandle;
use super::page::{PageLinks, PageResult};
use super::request::TableRequest;

/// Applies search, sort and pagination from a table request to any query handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataTableService {
    per_page: u32,
}

impl Default for DataTableService {
    fn default() -> Self {
        Self::new(TableConfig::PER_PAGE)
    }
}

impl DataTableService {
    /// Page sizes are clamped to `1..=TableConfig::MAX_PER_PAGE`.
    pub fn new(per_page: u32) -> Self {
        DataTableService {
            per_page: clamp_per_page(per_page),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Restricts rows to the search term across `searchable` and orders them by the
    /// requested column when it is in `sortable`. Sort fields outside the allow-list
    /// fall back to the default newest-first order. An empty `searchable` list
    /// disables searching.
    pub fn apply_filters<Q: QueryHandle>(
        &self,
        query: Q,
        request: &TableRequest,
        searchable: &[&str],
        sortable: &[&str],
    ) -> Q {
        let query = match request.search.as_deref() {
            Some(search) if !searchable.is_empty() => query.where_any_like(searchable, search),
            _ => query,
        };

        match request.sort.as_deref() {
            Some(sort) if sortable.contains(&sort) => query.order_by(sort, request.direction),
            Some(sort) => {
                debug!("Ignoring sort on unrecognized field '{}'", sort);
                query.order_by_default()
            }
            None => query.order_by_default(),
        }
    }

    pub fn paginate<Q: QueryHandle>(
        &self,
        query: Q,
        request: &TableRequest,
    ) -> Result<PageResult<Q::Item>, DataTableError> {
        self.paginate_with(query, request, self.per_page)
    }

    pub fn paginate_with<Q: QueryHandle>(
        &self,
        query: Q,
        request: &TableRequest,
        per_page: u32,
    ) -> Result<PageResult<Q::Item>, DataTableError> {
        let page = query.paginate(clamp_per_page(per_page), request.page)?;
        let page_info = page.page_info();
        let links = PageLinks::build(request.path(), request.query(), &page_info);

        Ok(PageResult {
            items: page.items,
            page_info,
            links,
        })
    }
}

fn clamp_per_page(per_page: u32) -> u32 {
    per_page.clamp(1, TableConfig::MAX_PER_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field::{FieldValue, Record};
    use crate::query::memory::MemoryQuery;
    use crate::query::request::{Direction, TableParams};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        email: String,
        created_at: i64,
    }

    impl Record for Person {
        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "name" => Some(FieldValue::Text(self.name.clone())),
                "email" => Some(FieldValue::Text(self.email.clone())),
                "created_at" => Some(FieldValue::Integer(self.created_at)),
                _ => None,
            }
        }
    }

    const SEARCHABLE: &[&str] = &["name", "email"];
    const SORTABLE: &[&str] = &["name", "email", "created_at"];

    fn person(name: &str, created_at: i64) -> Person {
        Person {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            created_at,
        }
    }

    fn request(params: TableParams) -> TableRequest {
        TableRequest::from_params("/users", &params)
    }

    fn run(rows: Vec<Person>, params: TableParams, per_page: u32) -> PageResult<Person> {
        let service = DataTableService::new(per_page);
        let request = request(params);
        let query = service.apply_filters(MemoryQuery::new(rows), &request, SEARCHABLE, SORTABLE);
        service.paginate(query, &request).unwrap()
    }

    fn names(result: &PageResult<Person>) -> Vec<&str> {
        result.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_search_scenario() {
        let rows = vec![person("Alice", 1), person("bob", 2), person("Carol", 3)];
        let service = DataTableService::default();
        let request = request(TableParams {
            search: Some("a".into()),
            ..Default::default()
        });
        let query = service.apply_filters(MemoryQuery::new(rows), &request, &["name"], SORTABLE);
        let result = service.paginate(query, &request).unwrap();

        // default order is newest first
        assert_eq!(names(&result), vec!["Carol", "Alice"]);
        assert_eq!(result.page_info.total, 2);
    }

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(DataTableService::new(0).per_page(), 1);
        assert_eq!(DataTableService::new(1_000_000).per_page(), TableConfig::MAX_PER_PAGE);

        let rows: Vec<Person> = (0..600).map(|i| person(&format!("p{i}"), i)).collect();
        let service = DataTableService::default();
        let request = request(TableParams::default());
        let query = service.apply_filters(MemoryQuery::new(rows), &request, SEARCHABLE, SORTABLE);
        let result = service.paginate_with(query, &request, u32::MAX).unwrap();
        assert_eq!(result.items.len(), 500);
        assert_eq!(result.page_info.per_page, 500);
        assert_eq!(result.page_info.last_page, 2);
    }

    #[test]
    fn test_search_across_fields() {
        let mut rows = vec![person("Alice", 1), person("bob", 2)];
        rows[1].email = "robert@corp.test".into();
        let result = run(
            rows,
            TableParams {
                search: Some("CORP".into()),
                ..Default::default()
            },
            10,
        );
        assert_eq!(names(&result), vec!["bob"]);
    }

    #[test]
    fn test_empty_searchable_disables_search() {
        let rows = vec![person("Alice", 1), person("bob", 2)];
        let service = DataTableService::default();
        let request = request(TableParams {
            search: Some("zzz".into()),
            ..Default::default()
        });
        let query = service.apply_filters(MemoryQuery::new(rows), &request, &[], SORTABLE);
        assert_eq!(service.paginate(query, &request).unwrap().items.len(), 2);
    }

    #[test]
    fn test_sort_asc_and_default_direction() {
        let rows = vec![person("bob", 1), person("Alice", 2), person("Carol", 3)];
        let asc = run(
            rows.clone(),
            TableParams {
                sort: Some("email".into()),
                direction: Some("asc".into()),
                ..Default::default()
            },
            10,
        );
        assert_eq!(names(&asc), vec!["Alice", "bob", "Carol"]);

        let desc = run(
            rows,
            TableParams {
                sort: Some("email".into()),
                direction: Some("bogus".into()),
                ..Default::default()
            },
            10,
        );
        assert_eq!(names(&desc), vec!["Carol", "bob", "Alice"]);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_newest_first() {
        let rows = vec![person("Alice", 1), person("bob", 3), person("Carol", 2)];
        let result = run(
            rows,
            TableParams {
                sort: Some("password".into()),
                direction: Some("asc".into()),
                ..Default::default()
            },
            10,
        );
        assert_eq!(names(&result), vec!["bob", "Carol", "Alice"]);
    }

    #[test]
    fn test_links_preserve_filters() {
        let rows = (0..25).map(|i| person(&format!("user{i}"), i)).collect();
        let result = run(
            rows,
            TableParams {
                search: Some("user".into()),
                sort: Some("name".into()),
                direction: Some("asc".into()),
                page: Some(2),
            },
            10,
        );
        assert_eq!(result.page_info.current_page, 2);
        assert_eq!(result.page_info.last_page, 3);
        assert_eq!(
            result.links.next.as_deref(),
            Some("/users?search=user&sort=name&direction=asc&page=3")
        );
        assert_eq!(
            result.links.prev.as_deref(),
            Some("/users?search=user&sort=name&direction=asc&page=1")
        );
    }

    fn people() -> impl Strategy<Value = Vec<Person>> {
        prop::collection::vec(("[a-zA-Z]{0,8}", "[a-z]{1,6}", 0i64..50), 0..40).prop_map(
            |rows| {
                rows.into_iter()
                    .map(|(name, domain, created_at)| Person {
                        email: format!("{}@{}.test", name.to_lowercase(), domain),
                        name,
                        created_at,
                    })
                    .collect()
            },
        )
    }

    fn all_rows(rows: Vec<Person>, params: TableParams) -> Vec<Person> {
        let params = TableParams {
            page: Some(1),
            ..params
        };
        run(rows, params, 1000).items
    }

    proptest! {
        #[test]
        fn prop_search_returns_exactly_matching_rows(rows in people(), needle in "[a-zA-Z]{1,3}") {
            let found = all_rows(rows.clone(), TableParams { search: Some(needle.clone()), ..Default::default() });
            let lower = needle.to_lowercase();
            let expected: Vec<&Person> = rows
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&lower) || p.email.to_lowercase().contains(&lower))
                .collect();
            prop_assert_eq!(found.len(), expected.len());
            for p in &found {
                prop_assert!(p.name.to_lowercase().contains(&lower) || p.email.to_lowercase().contains(&lower));
            }
        }

        #[test]
        fn prop_sort_is_monotonic(rows in people(), field in prop::sample::select(SORTABLE), asc in any::<bool>()) {
            let direction = if asc { Direction::Asc } else { Direction::Desc };
            let sorted = all_rows(rows, TableParams {
                sort: Some(field.to_string()),
                direction: Some(direction.to_string()),
                ..Default::default()
            });
            for pair in sorted.windows(2) {
                let a = pair[0].field(field).unwrap();
                let b = pair[1].field(field).unwrap();
                let ord = a.compare(&b);
                match direction {
                    Direction::Asc => prop_assert!(ord != std::cmp::Ordering::Greater),
                    Direction::Desc => prop_assert!(ord != std::cmp::Ordering::Less),
                }
            }
        }

        #[test]
        fn prop_unsorted_is_newest_first(rows in people(), sort in prop::option::of("[a-z_]{1,10}")) {
            let sort = sort.filter(|s| !SORTABLE.contains(&s.as_str()));
            let sorted = all_rows(rows, TableParams { sort, ..Default::default() });
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].created_at >= pair[1].created_at);
            }
        }

        #[test]
        fn prop_page_sizes(rows in people(), per_page in 1u32..12, page in 1u32..8) {
            let total = rows.len();
            let result = run(rows, TableParams { page: Some(page), ..Default::default() }, per_page);
            let info = result.page_info;
            prop_assert!(result.items.len() <= per_page as usize);
            prop_assert_eq!(info.total as usize, total);
            prop_assert!(info.last_page >= 1);
            if page < info.last_page {
                prop_assert_eq!(result.items.len(), per_page as usize);
            }
            if page > info.last_page {
                prop_assert!(result.items.is_empty());
            }
        }
    }
}
