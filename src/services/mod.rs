// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod access;
pub mod mime;
pub mod photo_service;
pub mod storage;

pub use access::*;
pub use photo_service::*;
pub use storage::*;
