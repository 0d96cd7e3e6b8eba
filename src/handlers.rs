// src/handlers.rs

pub mod activity;
pub mod auth;
pub mod modules;
pub mod permissions;
pub mod rbac;
pub mod settings;
pub mod users;
