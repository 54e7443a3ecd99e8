/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::storage::LocalImageStore;
/// use taskboard_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let images = Arc::new(LocalImageStore::new(&config.storage.profile_image_dir));
/// let state = AppState::new(Arc::new(PgStore::new(pool)), images, config)?;
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use taskboard_shared::{
    auth::{guard::authorize_bearer, jwt::TokenService},
    managers::{AccountManager, CommentManager, ProfileManager, ProjectManager, TaskManager},
    storage::ImageStore,
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{config::Config, error::ApiError, routes};

/// Shared application state
///
/// Cloned into every handler; all members are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub accounts: AccountManager,
    pub projects: ProjectManager,
    pub tasks: TaskManager,
    pub comments: CommentManager,
    pub profiles: ProfileManager,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires managers over the given store and image store
    ///
    /// # Errors
    ///
    /// Fails if the JWT settings do not describe a usable HMAC signer.
    pub fn new(
        store: Arc<dyn Store>,
        images: Arc<dyn ImageStore>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(config.token_service()?);

        Ok(Self {
            accounts: AccountManager::new(store.clone(), tokens.clone()),
            projects: ProjectManager::new(store.clone()),
            tasks: TaskManager::new(store.clone()),
            comments: CommentManager::new(store.clone()),
            profiles: ProfileManager::new(store.clone(), images),
            store,
            tokens,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /health                                  GET     public
/// /auth/register-user                      POST    public
/// /auth/login-user                         POST    public (form)
/// /project/                                GET
/// /project/create                          POST
/// /project/user/                           GET
/// /project/user/:user_id                   GET     any user's projects
/// /project/:id                             GET
/// /project/:id/tasks                       GET     any owner's tasks
/// /project/edit-project/:id                PUT
/// /project/delete-project/:id              DELETE
/// /tasks/                                  GET
/// /tasks/create-task                       POST
/// /tasks/user/:user_id                     GET
/// /tasks/:id                               GET
/// /tasks/update-task/:id                   PUT
/// /tasks/delete-task/:id                   DELETE
/// /comment/creat-comment/                  POST
/// /comment/detail/:id                      GET
/// /comment/:task_id                        GET
/// /comment/edit-comment/:id                PUT
/// /comment/delete-comment/:id              DELETE
/// /user/me                                 GET
/// /user/edit/                              PUT     multipart
/// /user/delete/                            DELETE
/// ```
///
/// Everything outside `/health` and `/auth` requires an access token.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register-user", post(routes::auth::register))
        .route("/auth/login-user", post(routes::auth::login));

    let project_routes = Router::new()
        .route("/project/", get(routes::projects::list_projects))
        .route("/project/create", post(routes::projects::create_project))
        .route("/project/user/", get(routes::projects::list_my_projects))
        .route("/project/user/:user_id", get(routes::projects::list_user_projects))
        .route("/project/:id", get(routes::projects::get_project))
        .route("/project/:id/tasks", get(routes::projects::list_project_tasks))
        .route("/project/edit-project/:id", put(routes::projects::update_project))
        .route("/project/delete-project/:id", delete(routes::projects::delete_project));

    let task_routes = Router::new()
        .route("/tasks/", get(routes::tasks::list_tasks))
        .route("/tasks/create-task", post(routes::tasks::create_task))
        .route("/tasks/user/:user_id", get(routes::tasks::list_user_tasks))
        .route("/tasks/:id", get(routes::tasks::get_task))
        .route("/tasks/update-task/:id", put(routes::tasks::update_task))
        .route("/tasks/delete-task/:id", delete(routes::tasks::delete_task));

    let comment_routes = Router::new()
        .route("/comment/creat-comment/", post(routes::comments::create_comment))
        .route("/comment/detail/:id", get(routes::comments::get_comment))
        .route("/comment/:task_id", get(routes::comments::list_comments))
        .route("/comment/edit-comment/:id", put(routes::comments::update_comment))
        .route("/comment/delete-comment/:id", delete(routes::comments::delete_comment));

    let user_routes = Router::new()
        .route("/user/me", get(routes::users::me))
        .route("/user/edit/", put(routes::users::edit_profile))
        .route("/user/delete/", delete(routes::users::delete_account));

    let protected_routes = Router::new()
        .merge(project_routes)
        .merge(task_routes)
        .merge(comment_routes)
        .merge(user_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_access_token));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.api.upload_limit_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Validates the bearer access token and injects the `Principal` into
/// request extensions
async fn require_access_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let principal = authorize_bearer(header, &state.tokens)?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
