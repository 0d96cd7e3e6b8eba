// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, fmt, sync::Arc, time::Duration};

use crate::{
    db::{ActivityLogRepository, ModuleRepository, PermissionRepository, RoleRepository, SettingsRepository, UserRepository},
    services::{
        activity_service::ActivityService, auth::AuthService, module_service::ModuleService,
        permission_service::PermissionService, role_service::RoleService, settings_service::SettingsService,
        user_service::UserService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_TTL_HOURS: i64 = 24 * 7;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub jwt_ttl_hours: i64,
    pub cors_origin: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

// Segredos nunca aparecem em log
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .field("cors_origin", &self.cors_origin)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let jwt_ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("JWT_TTL_HOURS inválido: {raw}"))?,
            None => DEFAULT_JWT_TTL_HOURS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            jwt_ttl_hours,
            cors_origin: lookup("CORS_ORIGIN").filter(|v| !v.is_empty()),
            admin_email: lookup("ADMIN_EMAIL").filter(|v| !v.is_empty()),
            admin_password: lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub role_service: RoleService,
    pub module_service: ModuleService,
    pub permission_service: PermissionService,
    pub activity_service: ActivityService,
    pub settings_service: SettingsService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config))
    }

    /// Monta o gráfico de dependências em cima de uma pool já criada.
    pub fn with_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let module_repo = ModuleRepository::new(db_pool.clone());
        let permission_repo = PermissionRepository::new(db_pool.clone());
        let activity_repo = ActivityLogRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let activity_service = ActivityService::new(activity_repo.clone());
        let auth_service = AuthService::new(
            user_repo.clone(),
            activity_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let permission_service = PermissionService::new(
            user_repo.clone(),
            role_repo.clone(),
            module_repo.clone(),
            permission_repo,
            activity_repo.clone(),
            db_pool.clone(),
        );
        let role_service = RoleService::new(
            role_repo.clone(),
            user_repo.clone(),
            module_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo, role_repo, activity_repo.clone(), db_pool.clone());
        let settings_service = SettingsService::new(settings_repo, activity_repo.clone(), db_pool.clone());
        let module_service = ModuleService::new(module_repo, activity_repo, db_pool.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            role_service,
            module_service,
            permission_service,
            activity_service,
            settings_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.jwt_ttl_hours, DEFAULT_JWT_TTL_HOURS);
        assert!(config.cors_origin.is_none());
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn test_missing_required_variable() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/admin")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_empty_optional_values_are_ignored() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo"),
            ("ADMIN_EMAIL", ""),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();
        assert!(config.admin_email.is_none());
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/admin"),
            ("JWT_SECRET", "segredo-muito-secreto"),
            ("ADMIN_PASSWORD", "senha-do-admin"),
        ]))
        .unwrap();

        let printed = format!("{config:?}");
        assert!(!printed.contains("segredo-muito-secreto"));
        assert!(!printed.contains("senha-do-admin"));
        assert!(printed.contains("<redacted>"));
    }
}
