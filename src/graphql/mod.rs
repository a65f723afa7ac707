//! GraphQL surface.
//!
//! Same operations as the REST API, executed by the same services. The bearer
//! token is resolved leniently: a missing or bad token makes the caller
//! anonymous and each resolver lets its service decide.

mod mutation;
mod query;
mod types;

use std::sync::Arc;

use async_graphql::{http::GraphiQLSource, Context, EmptySubscription, Schema};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    Json,
};

use crate::{
    api::{bearer_token, extract::AppJson},
    error::AppResult,
    models::Identity,
    services::Services,
    AppState,
};

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{BorrowHistory, BorrowRecordNode};

pub type LibrarySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(services: Arc<Services>) -> LibrarySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .finish()
}

/// Surface service errors with their public message
pub(crate) trait IntoGraphQL<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T> IntoGraphQL<T> for AppResult<T> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| async_graphql::Error::new(e.public_message()))
    }
}

static ANONYMOUS: Identity = Identity::Anonymous;

/// Identity attached to the request, anonymous when none was
pub(crate) fn identity<'a>(ctx: &'a Context<'_>) -> &'a Identity {
    ctx.data_opt::<Identity>().unwrap_or(&ANONYMOUS)
}

pub(crate) fn services<'a>(ctx: &'a Context<'_>) -> async_graphql::Result<&'a Arc<Services>> {
    ctx.data::<Arc<Services>>()
}

pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<async_graphql::Request>,
) -> AppResult<Json<async_graphql::Response>> {
    let identity = state.services.auth.identify(bearer_token(&headers)).await?;
    let response = state.schema.execute(request.data(identity)).await;
    Ok(Json(response))
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}
