//! kbsync Core - Domain logic for catalog reconciliation
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `ExternalFile`, `CatalogRecord`, `Manifest`, `SnapshotIndex`
//! - **Metadata codec** - `ExternalMetadata`, the bag echoed back by the catalog
//! - **Use cases** - `ProvisionCatalogUseCase`, `LoadSnapshotUseCase`
//! - **Port definitions** - Traits for adapters: `ICatalogService`, `IContentTyper`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
