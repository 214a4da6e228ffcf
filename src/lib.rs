//! officekit-server library
//!
//! Bindings to an installed LibreOfficeKit engine, and the HTTP service
//! built on them. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `office`: Office and Document handles, bounded document loading
//! - `routes`: HTTP endpoints over the binding
//! - `config`, `error`, `state`: server plumbing

pub mod config;
pub mod error;
pub mod office;
pub mod routes;
pub mod state;

// Raw engine access; only `office` talks to it
mod lok;
