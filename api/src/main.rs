use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use popebooks_lib::{
    AppState, BookInfo, Config, PageView, PopebooksError, ReaderPosition, SearchResults, SearchScope,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    book_id: Option<i64>,
    /// Caller-chosen search screen id; a newer query on the same screen and
    /// scope discards this one
    session: Option<String>,
}

#[derive(Deserialize)]
struct ScopeQuery {
    book_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    books: usize,
}

#[derive(Serialize, Deserialize)]
struct BookResponse {
    id: i64,
    name: String,
    page_count: i64,
}

#[derive(Serialize, Deserialize)]
struct LastQueryResponse {
    scope: SearchScope,
    query: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(e: PopebooksError) -> ApiError {
    let status = match &e {
        PopebooksError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        PopebooksError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %e, "request failed");
        format!("Could not complete the request: {}", e)
    } else {
        e.to_string()
    };
    (status, Json(ErrorResponse { error }))
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    let books = state.store.books().map_err(api_error)?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        books: books.len(),
    }))
}

async fn get_all_books(State(state): State<Arc<AppState>>) -> ApiResult<Vec<BookInfo>> {
    state.reader.books().map(Json).map_err(api_error)
}

async fn get_book(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> ApiResult<BookResponse> {
    match state.reader.book(id).map_err(api_error)? {
        Some((name, page_count)) => Ok(Json(BookResponse { id, name, page_count })),
        None => Err(api_error(PopebooksError::NotFound(format!("book {}", id)))),
    }
}

async fn get_page(
    State(state): State<Arc<AppState>>,
    Path((book_id, page_number)): Path<(i64, i64)>,
) -> ApiResult<PageView> {
    let position = ReaderPosition::new(book_id, page_number);
    let Some(view) = state.reader.page(position).map_err(api_error)? else {
        return Err(api_error(PopebooksError::NotFound(format!(
            "page {} of book {}",
            page_number, book_id
        ))));
    };

    if let Err(e) = state.settings.set_last_position(position) {
        tracing::warn!(error = %e, "failed to save reading position");
    }
    Ok(Json(view))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<SearchResults> {
    let query = state.query_policy.check(&params.q).map_err(api_error)?;
    let scope = SearchScope::from_book_id(params.book_id);

    if let Err(e) = state.settings.set_last_query(scope, &query) {
        tracing::warn!(error = %e, "failed to save last query");
    }

    let Some(caller) = params.session else {
        return state.session.run(scope, query).await.map(Json).map_err(api_error);
    };

    match state.session.search(&caller, scope, query).await.map_err(api_error)? {
        Some(results) => Ok(Json(results)),
        None => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Search was superseded by a newer query".to_string(),
            }),
        )),
    }
}

/// Last reading position, kept inside the book's current page range. A book
/// that is no longer in the library falls back to the default position.
async fn get_position(State(state): State<Arc<AppState>>) -> ApiResult<ReaderPosition> {
    let position = state.settings.last_position().map_err(api_error)?;
    let Some((_, page_count)) = state.reader.book(position.book_id).map_err(api_error)? else {
        return Ok(Json(ReaderPosition::default()));
    };
    Ok(Json(position.clamp(page_count)))
}

async fn get_last_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScopeQuery>,
) -> ApiResult<LastQueryResponse> {
    let scope = SearchScope::from_book_id(params.book_id);
    let query = state.settings.last_query(scope).map_err(api_error)?;
    Ok(Json(LastQueryResponse { scope, query }))
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/books", get(get_all_books))
        .route("/books/:id", get(get_book))
        .route("/books/:id/pages/:number", get(get_page))
        .route("/search", get(search))
        .route("/position", get(get_position))
        .route("/last-query", get(get_last_query))
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
