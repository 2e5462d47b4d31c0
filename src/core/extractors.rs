//! Axum extractors for list and filter parameters
//!
//! Both extractors are infallible: a malformed query string yields empty
//! parameters rather than a rejection, matching the pipeline's policy of
//! never failing on request input.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::core::params::{FilterParameters, ListParameters};

fn query_pairs(parts: &Parts) -> Vec<(String, String)> {
    match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "ignoring malformed query string");
            Vec::new()
        }
    }
}

/// Extractor for list requests
///
/// ```rust,ignore
/// async fn list_people(
///     State(source): State<Arc<DataSource<PeopleStore>>>,
///     ListQuery(params): ListQuery,
/// ) -> Result<ListResult<Person>, QueryError> {
///     source.get_list(&params, &AuthContext::Anonymous, &CancellationToken::new()).await
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ListQuery(pub ListParameters);

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ListQuery(ListParameters::from_query_pairs(query_pairs(parts))))
    }
}

/// Extractor for count and item requests
#[derive(Debug, Clone, Default)]
pub struct FilterQuery(pub FilterParameters);

impl<S> FromRequestParts<S> for FilterQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(FilterQuery(FilterParameters::from_query_pairs(query_pairs(parts))))
    }
}
