//! Testes de integração contra o Postgres.
//!
//! Cada `#[sqlx::test]` recebe um banco novo com as migrações aplicadas.
//! Rodar com `DATABASE_URL` apontando para um servidor e `cargo test -- --ignored`.

#[cfg(test)]
mod postgres_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use sqlx::PgPool;
    use tower::ServiceExt;

    use crate::{
        common::error::AppError,
        config::{AppState, Config},
        db::{ModuleRepository, PermissionRepository, RoleRepository, UserRepository},
        models::{
            rbac::{Permission, PermissionEntry, UpdateModulePayload, MODULE_MODULES, MODULE_USERS},
            settings::UpdateSettingRequest,
        },
        services::auth::encode_token,
    };

    const SECRET: &str = "segredo-de-teste";

    fn state(pool: PgPool) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://postgres@localhost/admin_test".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .expect("config de teste");
        AppState::with_pool(pool, config)
    }

    async fn create_user(pool: &PgPool, email: &str, role_id: Option<i32>) -> i32 {
        UserRepository::new(pool.clone())
            .create_user(pool, "Teste", email, "hash-qualquer", role_id, true)
            .await
            .expect("Failed to create user")
            .id
    }

    async fn module_id(pool: &PgPool, name: &str) -> i32 {
        ModuleRepository::new(pool.clone())
            .find_by_name(name)
            .await
            .expect("Query failed")
            .expect("Module not found")
            .id
    }

    async fn create_role(pool: &PgPool, name: &str, entries: &[PermissionEntry]) -> i32 {
        let repo = RoleRepository::new(pool.clone());
        let role = repo.create_role(pool, name, None, true).await.expect("Failed to create role");
        repo.insert_permissions(pool, role.id, entries).await.expect("Failed to insert permissions");
        role.id
    }

    async fn get_status(pool: &PgPool, user_id: i32, uri: &str) -> StatusCode {
        let token = encode_token(SECRET, user_id, 1).expect("token");
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        crate::app(state(pool.clone())).oneshot(request).await.unwrap().status()
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_setting_update_rolls_back_when_log_fails(pool: PgPool) {
        let actor = create_user(&pool, "ana@empresa.com", None).await;
        let app_state = state(pool.clone());

        sqlx::query("DROP TABLE activity_logs").execute(&pool).await.unwrap();

        let input = UpdateSettingRequest { value: "Outro nome".into(), description: None };
        let result = app_state.settings_service.update_setting(actor, "site_name", &input).await;
        assert!(result.is_err());

        let setting = app_state.settings_service.get_setting("site_name").await.unwrap();
        assert_eq!(setting.value, "Admin");
    }

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_setting_update_is_logged(pool: PgPool) {
        let actor = create_user(&pool, "ana@empresa.com", None).await;
        let app_state = state(pool.clone());

        let input = UpdateSettingRequest { value: "Painel".into(), description: None };
        let updated = app_state.settings_service.update_setting(actor, "site_name", &input).await.unwrap();
        assert_eq!(updated.value, "Painel");

        let logged: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE entity = 'setting'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(logged, 1);
    }

    // ========================================================================
    // Modules / Roles
    // ========================================================================

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_built_in_modules_are_protected(pool: PgPool) {
        let actor = create_user(&pool, "ana@empresa.com", None).await;
        let app_state = state(pool.clone());
        let id = module_id(&pool, MODULE_MODULES).await;

        let rename = UpdateModulePayload { name: Some("Telas".into()), category: None, is_active: None };
        let result = app_state.module_service.update_module(actor, id, rename).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let disable = UpdateModulePayload { name: None, category: None, is_active: Some(false) };
        let result = app_state.module_service.update_module(actor, id, disable).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let result = app_state.module_service.delete_module(actor, id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        // Continua lá, ativo e com o mesmo nome
        assert_eq!(module_id(&pool, MODULE_MODULES).await, id);
    }

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_role_in_use_cannot_be_deleted(pool: PgPool) {
        let role_id = create_role(&pool, "Leitor", &[]).await;
        let actor = create_user(&pool, "ana@empresa.com", Some(role_id)).await;

        let result = state(pool.clone()).role_service.delete_role(actor, role_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    // ========================================================================
    // Guardas das rotas
    // ========================================================================

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_route_guard_follows_role_and_overrides(pool: PgPool) {
        let users_module = module_id(&pool, MODULE_USERS).await;
        let view_only = Permission { view: true, ..Permission::none() };
        let role_id = create_role(
            &pool,
            "Leitor",
            &[PermissionEntry { admin_module_id: users_module, permissions: view_only }],
        )
        .await;
        let user_id = create_user(&pool, "leitor@empresa.com", Some(role_id)).await;

        // Cargo dá view: pode listar, não pode ver outros módulos
        assert_eq!(get_status(&pool, user_id, "/api/users").await, StatusCode::OK);
        assert_eq!(get_status(&pool, user_id, "/api/roles").await, StatusCode::FORBIDDEN);

        // Override sem nada revoga o que o cargo dava
        PermissionRepository::new(pool.clone())
            .insert_for_user(
                &pool,
                user_id,
                &[PermissionEntry { admin_module_id: users_module, permissions: Permission::none() }],
            )
            .await
            .unwrap();
        assert_eq!(get_status(&pool, user_id, "/api/users").await, StatusCode::FORBIDDEN);

        // Override removido, mas cargo desativado: também nada
        PermissionRepository::new(pool.clone())
            .clear_for_user(&pool, user_id)
            .await
            .unwrap();
        RoleRepository::new(pool.clone())
            .update_role(&pool, role_id, None, None, Some(false))
            .await
            .unwrap();
        assert_eq!(get_status(&pool, user_id, "/api/users").await, StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[ignore = "precisa de um Postgres em DATABASE_URL"]
    async fn test_route_guard_denies_on_inactive_module(pool: PgPool) {
        let admin_role = RoleRepository::new(pool.clone())
            .find_by_name("Administrator")
            .await
            .unwrap()
            .expect("Administrator role");
        let user_id = create_user(&pool, "admin@empresa.com", Some(admin_role.id)).await;
        assert_eq!(get_status(&pool, user_id, "/api/settings").await, StatusCode::OK);

        // Direto no banco: pela API o módulo do sistema não pode ser desativado
        sqlx::query("UPDATE admin_modules SET is_active = FALSE WHERE name = 'Settings'")
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(get_status(&pool, user_id, "/api/settings").await, StatusCode::FORBIDDEN);
    }
}
