// src/services.rs

pub mod activity_service;
pub mod auth;
pub mod module_service;
pub mod permission_resolver;
pub mod permission_service;
pub mod role_service;
pub mod settings_service;
pub mod user_service;
