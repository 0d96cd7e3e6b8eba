//src/main.rs

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Primeiro acesso: cria o administrador se ADMIN_EMAIL/ADMIN_PASSWORD vierem no ambiente
    if let (Some(email), Some(password)) = (&app_state.config.admin_email, &app_state.config.admin_password) {
        app_state.user_service.bootstrap_admin(email, password).await?;
    }

    let listener = TcpListener::bind(&app_state.config.bind_addr)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state))
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}

fn app(app_state: AppState) -> Router {
    // Rotas do usuário logado (protegidas pelo middleware)
    let me_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/permissions", get(handlers::auth::get_my_permissions))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Define as rotas de autenticação (login é público)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(me_routes);

    let user_routes = Router::new()
        .route("/"
               ,get(handlers::users::list_users)
               .post(handlers::users::create_user)
        )
        .route("/{id}"
               ,get(handlers::users::get_user)
               .put(handlers::users::update_user)
               .delete(handlers::users::delete_user)
        )
        .route("/{id}/permissions"
               ,get(handlers::permissions::get_user_permissions)
               .put(handlers::permissions::replace_user_permissions)
        )
        .route("/{id}/permissions/{module_id}"
               ,delete(handlers::permissions::delete_user_permission)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let role_routes = Router::new()
        .route("/"
               ,get(handlers::rbac::list_roles)
               .post(handlers::rbac::create_role)
        )
        .route("/{id}"
               ,get(handlers::rbac::get_role)
               .put(handlers::rbac::update_role)
               .delete(handlers::rbac::delete_role)
        )
        .route("/{id}/permissions"
               ,get(handlers::rbac::get_role_permissions)
               .put(handlers::rbac::replace_role_permissions)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let module_routes = Router::new()
        .route("/"
               ,get(handlers::modules::list_modules)
               .post(handlers::modules::create_module)
        )
        .route("/{id}"
               ,axum::routing::put(handlers::modules::update_module)
               .delete(handlers::modules::delete_module)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::list_settings))
        .route("/{key}"
               ,get(handlers::settings::get_setting)
               .put(handlers::settings::update_setting)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let activity_routes = Router::new()
        .route("/", get(handlers::activity::list_activity_logs))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(app_state.config.cors_origin.as_deref());

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/modules", module_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/activity-logs", activity_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// Sem CORS_ORIGIN, aceita qualquer origem (ambiente de desenvolvimento)
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
        Some(Err(_)) => {
            tracing::warn!("CORS_ORIGIN inválido; liberando qualquer origem");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Pool "preguiçosa": nenhuma destas rotas chega a tocar no banco
    fn test_app() -> Router {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://postgres@localhost/admin_test".to_string()),
            "JWT_SECRET" => Some("segredo-de-teste".to_string()),
            _ => None,
        })
        .unwrap();

        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        app(AppState::with_pool(pool, config))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_guarded_routes_require_token() {
        for uri in [
            "/api/users",
            "/api/users/1/permissions",
            "/api/roles",
            "/api/modules",
            "/api/settings",
            "/api/activity-logs",
            "/api/auth/me",
            "/api/auth/me/permissions",
        ] {
            let (status, body) = send(Request::get(uri).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");

            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let request = Request::get("/api/users")
            .header(header::AUTHORIZATION, "Bearer isto-nao-e-um-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::get("/api/users")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_validates_payload_before_database() {
        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": "nao-e-email", "password": "123"}"#))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["details"]["email"].is_array());
        assert!(json["details"]["password"].is_array());
    }

    #[tokio::test]
    async fn test_openapi_document_lists_permission_routes() {
        let (status, body) = send(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["paths"]["/api/users/{id}/permissions"].is_object());
        assert!(json["paths"]["/api/auth/me/permissions"].is_object());
        assert!(json["components"]["schemas"]["EffectivePermission"].is_object());
    }

    async fn allowed_origin(layer: CorsLayer, origin: &str) -> Option<String> {
        let app = Router::new().route("/", get(|| async { "OK" })).layer(layer);
        let request = Request::get("/")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_layer_origins() {
        let configured = Some("https://admin.exemplo.com");
        assert_eq!(
            allowed_origin(cors_layer(configured), "https://admin.exemplo.com").await.as_deref(),
            Some("https://admin.exemplo.com")
        );
        assert_eq!(allowed_origin(cors_layer(configured), "https://outro.com").await, None);

        // Sem origem configurada, ou com uma inválida: qualquer origem
        assert_eq!(allowed_origin(cors_layer(None), "https://outro.com").await.as_deref(), Some("*"));
        assert_eq!(allowed_origin(cors_layer(Some("inválido\n")), "https://outro.com").await.as_deref(), Some("*"));
    }
}
