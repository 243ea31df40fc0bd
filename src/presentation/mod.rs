//! Presentation Layer
//!
//! This layer handles:
//! - Creating sessions with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `factory` - Creates sessions with proper dependencies (dependency injection)
//! - `output` - Output rendering abstractions
//!
//! ## Usage
//!
//! ```ignore
//! use targetsync::presentation::factory;
//!
//! let session = factory::session_for_project(&config, &project_dir);
//! let outcomes = session.deploy_file(&file);
//! ```

pub mod factory;
pub mod output;

pub use factory::{create_session, create_session_with, session_for_project, SessionOptions};
pub use output::{create_renderer, OutcomeRenderer, OutputFormat};
