//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for resources outside the database, such as the
//! on-disk object store holding uploaded file bytes.

pub mod storage;
