// src/models.rs

pub mod activity;
pub mod auth;
pub mod rbac;
pub mod settings;
pub mod users;
