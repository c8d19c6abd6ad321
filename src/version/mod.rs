//! Version management layer for image tag updates
//!
//! This module provides the core functionality for parsing image versions,
//! matching registry tags against a reference version, and fetching tags from
//! remote registries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  Selector   │◀────│   Scheme    │
//! │  (fetch)    │     │ (max match) │     │  (filter)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ Registries  │     │    Model    │
//! │(Docker Hub) │     │ (parse/cmp) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`model`]: Lenient version parsing and ordering
//! - [`image`]: Image name and version pairs, name normalization
//! - [`scheme`]: Format families and update-mode aware tag matching
//! - [`selector`]: Latest version selection with tag denylist
//! - [`registry`]: Registry trait for fetching tags from remote sources
//! - [`registries`]: Concrete registry implementations (Docker Hub)
//! - [`error`]: Error types for registry and update operations

pub mod error;
pub mod image;
pub mod model;
pub mod registries;
pub mod registry;
pub mod scheme;
pub mod selector;
