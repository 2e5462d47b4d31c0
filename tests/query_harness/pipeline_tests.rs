//! Macro-generated test suite for the list/count/item pipeline over `Person`.
//!
//! The `pipeline_tests!` macro generates a test module validating a
//! `DataSource` backed by any `QueryStore<Item = Person>` holding
//! [`people()`](super::people). Running the same suite against the
//! synchronous and the asynchronous store path checks that evaluation mode
//! never changes results.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod query_harness;
//!
//! use query_harness::*;
//! use this_query::storage::InMemoryStore;
//!
//! pipeline_tests!(sync_store, InMemoryStore::from_records(people()));
//! ```
//!
//! # Generated Tests
//!
//! ## List
//! - default ordering, `none` sort suppression, nested and object sorts
//! - page clamping, over-paging, skipped counts
//! - projection allowlist threading
//!
//! ## Filter
//! - unreadable fields are no-ops, role-gated fields narrow with the role
//! - unparsable numbers, enums by code and name, nulls, dates, wildcards
//!
//! ## Search
//! - split-on-spaces AND-of-OR, field-scoped search, nested leaves, enums
//!
//! ## Count and item
//! - counts ignore paging, item lookup, not-found messages
//! - concurrent requests over one shared source

/// Generate the pipeline conformance suite.
///
/// `$factory` must evaluate to a fresh store holding `people()`; it is
/// re-evaluated for each test.
#[macro_export]
macro_rules! pipeline_tests {
    ($name:ident, $factory:expr) => {
        mod $name {
            use super::*;
            use this_query::prelude::*;

            fn source() -> DataSource<impl QueryStore<Item = Person>> {
                people_source($factory, QueryConfig::default())
            }

            fn source_with(config: QueryConfig) -> DataSource<impl QueryStore<Item = Person>> {
                people_source($factory, config)
            }

            fn wire(pairs: &[(&str, &str)]) -> ListParameters {
                ListParameters::from_query_pairs(pairs.iter().copied())
            }

            async fn list_as(
                source: &DataSource<impl QueryStore<Item = Person>>,
                params: &ListParameters,
                principal: &AuthContext,
            ) -> ListResult<Person> {
                source
                    .get_list(params, principal, &CancellationToken::new())
                    .await
                    .unwrap()
            }

            async fn list(pairs: &[(&str, &str)]) -> ListResult<Person> {
                list_as(&source(), &wire(pairs), &AuthContext::Anonymous).await
            }

            async fn matching(pairs: &[(&str, &str)]) -> Vec<u128> {
                sorted(numbers(&list(pairs).await.list))
            }

            // ==================================================================
            // List: ordering
            // ==================================================================

            #[tokio::test]
            async fn test_default_list() {
                let result = list(&[]).await;
                assert!(result.was_successful);
                assert_eq!(numbers(&result.list), vec![7, 8, 5, 2, 3, 4, 1, 6]);
                assert_eq!(result.total_count, 8);
                assert_eq!(result.page, 1);
                assert_eq!(result.page_size, 25);
                assert_eq!(result.page_count, 1);
            }

            #[tokio::test]
            async fn test_no_sort_keeps_store_order() {
                let result = list(&[("orderBy", "none")]).await;
                assert_eq!(numbers(&result.list), vec![1, 2, 3, 4, 5, 6, 7, 8]);
            }

            #[tokio::test]
            async fn test_invalid_directive_discards_later_ones() {
                let result = list(&[("orderBy", "missingField,firstName")]).await;
                assert_eq!(numbers(&result.list), vec![7, 8, 5, 2, 3, 4, 1, 6]);
            }

            #[tokio::test]
            async fn test_valid_prefix_is_kept() {
                let result = list(&[("orderBy", "age,missingField,firstName")]).await;
                // nulls first, ties keep store order
                assert_eq!(numbers(&result.list), vec![2, 3, 5, 1, 7, 4, 6, 8]);
            }

            #[tokio::test]
            async fn test_nested_descending_sort() {
                let result = list(&[("orderByDescending", "employer.name")]).await;
                assert_eq!(numbers(&result.list), vec![5, 2, 6, 1, 3, 7, 4, 8]);
            }

            #[tokio::test]
            async fn test_object_sort_uses_target_default() {
                let result = list(&[("orderBy", "employer")]).await;
                assert_eq!(numbers(&result.list), vec![4, 8, 1, 3, 7, 2, 6, 5]);
            }

            #[tokio::test]
            async fn test_role_gated_sort() {
                let params = wire(&[("orderByDescending", "salary")]);
                let hr = AuthContext::user(["hr"]);
                let result = list_as(&source(), &params, &hr).await;
                assert_eq!(numbers(&result.list), vec![6, 4, 7, 2, 5, 1, 3, 8]);

                let result = list_as(&source(), &params, &AuthContext::Anonymous).await;
                assert_eq!(numbers(&result.list), vec![7, 8, 5, 2, 3, 4, 1, 6]);
            }

            // ==================================================================
            // List: paging
            // ==================================================================

            #[tokio::test]
            async fn test_over_paging_serves_last_page() {
                let result = list(&[("page", "1000"), ("pageSize", "3")]).await;
                assert_eq!(result.page, 3);
                assert_eq!(result.page_count, 3);
                assert_eq!(numbers(&result.list), vec![1, 6]);
            }

            #[tokio::test]
            async fn test_page_size_clamping() {
                let result = list(&[("pageSize", "0")]).await;
                assert_eq!(result.page_size, 1);
                assert_eq!(result.page_count, 8);
                assert_eq!(result.list.len(), 1);

                let result = list(&[("pageSize", "-4")]).await;
                assert_eq!(result.page_size, 1);

                let config = QueryConfig {
                    max_page_size: 5,
                    ..QueryConfig::default()
                };
                let result = list_as(&source_with(config), &wire(&[("pageSize", "500")]), &AuthContext::Anonymous).await;
                assert_eq!(result.page_size, 5);
                assert_eq!(result.list.len(), 5);
                assert_eq!(result.page_count, 2);
            }

            #[tokio::test]
            async fn test_skipped_count_pages_best_effort() {
                let config = QueryConfig {
                    count_mode: CountMode::Skip,
                    ..QueryConfig::default()
                };
                let source = source_with(config);

                let result = list_as(&source, &wire(&[("pageSize", "3")]), &AuthContext::Anonymous).await;
                assert_eq!(result.total_count, -1);
                assert_eq!(result.page_count, -1);
                assert_eq!(numbers(&result.list), vec![7, 8, 5]);

                let result = list_as(&source, &wire(&[("page", "50"), ("pageSize", "3")]), &AuthContext::Anonymous).await;
                assert_eq!(result.page, 50);
                assert!(result.list.is_empty());
                assert!(result.was_successful);
            }

            #[tokio::test]
            async fn test_count_is_independent_of_paging() {
                let source = source();
                let filter = FilterParameters::new().with_filter("active", "true");
                let count = source
                    .get_count(&filter, &AuthContext::Anonymous, &CancellationToken::new())
                    .await
                    .unwrap();
                assert_eq!(count.object, Some(6));

                for (page, size) in [(1, 1), (2, 3), (50, 2), (1, 100)] {
                    let params = ListParameters {
                        filter_params: filter.clone(),
                        ..ListParameters::new()
                    }
                    .with_page(page)
                    .with_page_size(size);
                    let result = list_as(&source, &params, &AuthContext::Anonymous).await;
                    assert_eq!(result.total_count, 6, "page {page} size {size}");
                }
            }

            #[tokio::test]
            async fn test_fields_are_threaded_through() {
                let result = list(&[("fields", "firstName, lastName")]).await;
                assert_eq!(result.fields, vec!["firstName", "lastName"]);
            }

            // ==================================================================
            // Filter
            // ==================================================================

            #[tokio::test]
            async fn test_empty_parameters_match_base_query() {
                let source = source();
                let count = source
                    .get_count(&FilterParameters::default(), &AuthContext::Anonymous, &CancellationToken::new())
                    .await
                    .unwrap();
                assert_eq!(count.object, Some(8));
                assert!(source
                    .filtered_query(&FilterParameters::default(), &AuthContext::Anonymous)
                    .is_unfiltered());
            }

            #[tokio::test]
            async fn test_unreadable_filter_is_a_no_op() {
                assert_eq!(matching(&[("filter.salary", "50000")]).await, matching(&[]).await);
                assert_eq!(matching(&[("filter.fullName", "Ann Lee")]).await, matching(&[]).await);
                assert_eq!(matching(&[("filter.nope", "1")]).await, matching(&[]).await);

                let hr = AuthContext::user(["hr"]);
                let result = list_as(&source(), &wire(&[("filter.salary", "50000")]), &hr).await;
                assert_eq!(numbers(&result.list), vec![1]);
            }

            #[tokio::test]
            async fn test_unparsable_number_matches_nothing() {
                for raw in ["abc", "12a", "--", "1.5", "thirty"] {
                    let result = list(&[("filter.age", raw)]).await;
                    assert!(result.list.is_empty(), "filter.age={raw}");
                    assert_eq!(result.total_count, 0);
                    assert!(result.was_successful);
                }
            }

            #[tokio::test]
            async fn test_enum_by_code_or_name() {
                let by_code = matching(&[("filter.status", "2")]).await;
                assert_eq!(by_code, vec![2, 5, 7]);
                assert_eq!(matching(&[("filter.status", "inactive")]).await, by_code);
                assert_eq!(matching(&[("filter.status", "INACTIVE")]).await, by_code);
                assert_eq!(matching(&[("filter.status", "active,archived")]).await, vec![1, 3, 4, 6, 8]);
            }

            #[tokio::test]
            async fn test_null_alternatives() {
                assert_eq!(matching(&[("filter.age", "null")]).await, vec![2]);
                assert_eq!(matching(&[("filter.age", "null,29")]).await, vec![2, 3, 5]);
                // rating is not nullable
                assert!(matching(&[("filter.rating", "null")]).await.is_empty());
            }

            #[tokio::test]
            async fn test_scalar_filters() {
                assert_eq!(matching(&[("filter.active", "false")]).await, vec![3, 5]);
                assert_eq!(matching(&[("filter.rating", "5")]).await, vec![4, 8]);
                let ids = format!("{},{}", person_id(1), person_id(3));
                assert_eq!(matching(&[("filter.id", ids.as_str())]).await, vec![1, 3]);
            }

            #[tokio::test]
            async fn test_string_filters() {
                assert_eq!(matching(&[("filter.lastName", "Smith")]).await, vec![3]);
                assert_eq!(matching(&[("filter.LASTNAME", "Smi*")]).await, vec![3, 4]);
            }

            #[tokio::test]
            async fn test_date_filters() {
                assert_eq!(matching(&[("filter.birthDate", "1990-06-01")]).await, vec![2, 7]);
                assert_eq!(matching(&[("filter.birthDate", "06/01/1990")]).await, vec![2, 7]);
                assert_eq!(matching(&[("filter.birthDate", "null")]).await, vec![3]);
                assert!(matching(&[("filter.birthDate", "someday")]).await.is_empty());
                assert_eq!(matching(&[("filter.createdAt", "2024-03-05")]).await, vec![5]);
                assert_eq!(matching(&[("filter.createdAt", "2024-03-05T12:00:00Z")]).await, vec![5]);
            }

            #[tokio::test]
            async fn test_date_filters_at_year_extremes() {
                assert_eq!(matching(&[("filter.birthDate", "1906-12-09")]).await, vec![8]);
                assert!(matching(&[("filter.birthDate", "-0044-03-15")]).await.is_empty());

                for pairs in [
                    [("filter.birthDate", "+262142-12-31")],
                    [("filter.createdAt", "+262142-12-31")],
                    [("search", "birthDate:+262142-12-31")],
                ] {
                    let result = list(&pairs).await;
                    assert!(result.was_successful, "{pairs:?}");
                    assert_eq!(result.total_count, 0, "{pairs:?}");
                    assert!(result.list.is_empty(), "{pairs:?}");
                }
            }

            #[tokio::test]
            async fn test_filters_combine_conjunctively() {
                assert_eq!(
                    matching(&[("filter.age", "29"), ("filter.active", "false"), ("filter.lastName", "Jones")]).await,
                    vec![5]
                );
            }

            // ==================================================================
            // Search
            // ==================================================================

            #[tokio::test]
            async fn test_split_search_is_order_independent() {
                assert_eq!(matching(&[("search", "steve steverson")]).await, vec![1]);
                assert_eq!(matching(&[("search", "steverson, steve")]).await, vec![1]);
            }

            #[tokio::test]
            async fn test_field_scoped_search_is_exclusive() {
                assert_eq!(matching(&[("search", "smith")]).await, vec![3, 4, 6]);
                assert_eq!(matching(&[("search", "lastName:smith")]).await, vec![3, 4]);
                assert_eq!(matching(&[("search", "Last Name:smith")]).await, vec![3, 4]);
            }

            #[tokio::test]
            async fn test_field_scoped_search_on_object() {
                assert_eq!(matching(&[("search", "employer:glob")]).await, vec![2, 6]);
            }

            #[tokio::test]
            async fn test_search_reaches_nested_leaves() {
                assert_eq!(matching(&[("search", "acme")]).await, vec![1, 2, 3, 6, 7]);
            }

            #[tokio::test]
            async fn test_search_enum_by_name() {
                assert_eq!(matching(&[("search", "archived")]).await, vec![4, 8]);
            }

            #[tokio::test]
            async fn test_search_and_filter_compose() {
                assert_eq!(matching(&[("search", "acme"), ("filter.active", "true")]).await, vec![1, 2, 6, 7]);
            }

            // ==================================================================
            // Item
            // ==================================================================

            #[tokio::test]
            async fn test_get_item() {
                let source = source();
                let cancel = CancellationToken::new();
                let id = person_id(3).to_string();

                let item = source
                    .get_item(&id, &FilterParameters::default(), &AuthContext::Anonymous, &cancel)
                    .await
                    .unwrap();
                assert!(item.was_successful);
                assert_eq!(item.object.map(|p| p.last_name), Some("Smith".to_string()));

                // outside the filtered set
                let item = source
                    .get_item(&id, &FilterParameters::new().with_filter("active", "true"), &AuthContext::Anonymous, &cancel)
                    .await
                    .unwrap();
                assert!(!item.was_successful);
            }

            #[tokio::test]
            async fn test_item_not_found_message() {
                let source = source();
                let cancel = CancellationToken::new();
                let missing = person_id(99).to_string();

                let item = source
                    .get_item(&missing, &FilterParameters::default(), &AuthContext::Anonymous, &cancel)
                    .await
                    .unwrap();
                assert!(!item.was_successful);
                assert!(item.object.is_none());
                assert_eq!(item.message, Some(format!("Person item with ID {missing} was not found.")));

                let item = source
                    .get_item("not-a-guid", &FilterParameters::default(), &AuthContext::Anonymous, &cancel)
                    .await
                    .unwrap();
                assert_eq!(item.message.as_deref(), Some("Person item with ID not-a-guid was not found."));
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_requests() {
                let source = std::sync::Arc::new(source());
                let requests = (1..=8).map(|page| {
                    let source = source.clone();
                    async move {
                        let params = ListParameters::new().with_page(page).with_page_size(1);
                        source
                            .get_list(&params, &AuthContext::Anonymous, &CancellationToken::new())
                            .await
                            .unwrap()
                    }
                });
                let results = futures::future::join_all(requests).await;
                let served: Vec<u128> = results.iter().flat_map(|r| numbers(&r.list)).collect();
                assert_eq!(served, vec![7, 8, 5, 2, 3, 4, 1, 6]);
                assert!(results.iter().all(|r| r.total_count == 8));
            }
        }
    };
}
