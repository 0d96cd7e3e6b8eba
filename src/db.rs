// src/db.rs

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod module_repo;
pub use module_repo::ModuleRepository;
pub mod permission_repo;
pub use permission_repo::PermissionRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod activity_repo;
pub use activity_repo::ActivityLogRepository;

#[cfg(test)]
mod tests;
