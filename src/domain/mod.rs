//! Domain Layer
//!
//! Pure sync logic: which files go to which targets and how a batch walks
//! its files.
//!
//! ## Structure
//!
//! - `entities/` - Targets, packages, workspaces, per-file handles
//! - `value_objects/` - Filters, paths, compiler keys, compile results
//! - `services/` - Item filters, target resolution, lifecycle drivers
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No network** - transports live behind the `Plugin` port
//! 2. **Ports & Adapters** - file I/O, tools and prompts go through traits

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
