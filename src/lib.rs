//! # Taskline — a declarative command-tree engine
//!
//! Taskline ingests textual documents describing a library of reusable
//! parameterised *types* and a tree of *nodes* (containers, runnable
//! commands, and pipelines), validates and expands them into a runtime
//! tree, and runs the result with output capture, stdin piping, retries,
//! and step-to-step references.
//!
//! The crate is organised around the three-phase build pipeline described
//! in its design notes:
//!
//! 1. [`validate_raw`] — structural checks on the author-supplied tree.
//! 2. [`expand`] — resolves `uses` delegations against a [`registry`] and
//!    substitutes `{{ params.* }}` references via [`template`].
//! 3. [`validate_runtime`] — structural checks on the expanded tree.
//!
//! [`build::build`] drives all three phases. [`executor`] then runs the
//! resulting [`runtime::Pipeline`]s and [`runtime::Runnable`]s.
//!
//! ## Features
//!
//! - **Type library**: named, parameterised sub-trees reused via `uses`.
//! - **Three-namespace templates**: `params` resolved at expansion time;
//!   `inputs` and `steps.<id>.<stream>` resolved at execution time.
//! - **Precise error provenance**: every failure carries a phase, a dotted
//!   path, and a stable kind.
//! - **Pipeline execution**: sequential steps with capture, stdin piping,
//!   tee, and per-step retry/continue/fail policies.
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod build;
pub mod duration;
pub mod error;
pub mod executor;
pub mod expand;
pub mod infrastructure;
pub mod path;
pub mod prelude;
pub mod raw;
pub mod registry;
pub mod runtime;
pub mod template;
pub mod validate_raw;
pub mod validate_runtime;

pub use build::build;
pub use error::{BuildError, ErrorKind, ExecError, Phase, TemplateError};
pub use executor::{Executor, PipelineRun, ProcessSpawner, StepOutcome, SystemSpawner};
pub use raw::RawDocument;
pub use registry::TypeRegistry;
pub use runtime::{resolve_entrypoint, Container, Pipeline, PipelineStep, Runnable, RuntimeNode, Selected};

/// Version of the taskline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
