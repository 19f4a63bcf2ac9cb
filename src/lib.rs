// src/lib.rs
// DOCUMENTATION: Library root shared by the server and the audit CLI
// PURPOSE: Expose the photo gateway modules

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
