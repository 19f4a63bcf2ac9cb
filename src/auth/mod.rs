// src/auth/mod.rs
// DOCUMENTATION: Authentication module organization
// PURPOSE: Re-export session components

pub mod session;

pub use session::*;
