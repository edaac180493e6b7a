//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ICatalogService`] - Remote catalog operations (collections and records)
//! - [`IContentTyper`] - Declared file type of an upload payload

pub mod catalog_service;
pub mod content_typer;

pub use catalog_service::{ICatalogService, NewCatalog, NewRecord, RecordPage};
pub use content_typer::IContentTyper;
