//! `proompt_core` is the template resolution engine behind
//! [proompt](https://github.com/dikkadev/proompt). It turns a prompt template
//! containing variable placeholders and snippet references into a resolved
//! document, a list of variables with their fulfillment state, and a list of
//! warnings. A debounced preview session keeps that result fresh while the
//! template is being edited.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template + value map
//!   → Scanner (logos tokens → ordered placeholders with spans)
//!   → Registry (one variable per trimmed name, first default wins)
//!   → Resolver (single pass substitution + warnings)
//!   → Preview session (debounce, request ids, stale responses dropped)
//! ```
//!
//! ## Syntax
//!
//! - `{{ name }}`: a variable.
//! - `{{ name : default }}`: a variable with an inline default.
//! - `@name`: a snippet reference (letters, digits and underscores).
//! - `@{name with spaces}`: a braced snippet reference.
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `proompt.toml`.
//! - [`session`]: The debounced preview session.
//!
//! ## Key Types
//!
//! - [`Placeholder`]: One variable or snippet match with its span.
//! - [`Registry`]: Deduplicated variables in first-appearance order.
//! - [`ResolutionResult`]: Resolved text, variables, warnings and snippets.
//! - [`PreviewSession`]: Debounced, last-submit-wins preview driver.
//! - [`PreviewBackend`]: Contract for anything that can resolve a preview.
//!
//! ## Quick Start
//!
//! ```rust
//! use proompt_core::ValueMap;
//! use proompt_core::VariableStatus;
//! use proompt_core::resolve_template;
//!
//! let mut values = ValueMap::new();
//! values.insert("name".into(), "Sam".into());
//!
//! let result = resolve_template("Hi {{name:friend}}, see @guidelines", &values);
//! assert_eq!(result.resolved_text, "Hi Sam, see [Snippet: guidelines]");
//! assert_eq!(result.variables[0].status, VariableStatus::Provided);
//! assert_eq!(result.snippets, vec!["guidelines".to_string()]);
//! ```

pub use backend::*;
pub use config::*;
pub use error::*;
pub use placeholder::*;
pub use registry::*;
pub use resolver::*;
pub use session::*;
pub use values::*;
pub use warning::*;

mod backend;
pub mod config;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod placeholder;
mod registry;
mod resolver;
pub mod session;
mod values;
mod warning;
