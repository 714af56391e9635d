//! Common imports for consumers embedding the engine.

pub use crate::build::build;
pub use crate::error::{BuildError, ErrorKind, ExecError, Phase, TemplateError};
pub use crate::executor::{Executor, PipelineRun, ProcessSpawner, StepOutcome, SystemSpawner};
pub use crate::raw::{Capture, OnFail, RawDocument, RawNode, RawStep, Stream};
pub use crate::runtime::{
    resolve_entrypoint, Container, Pipeline, PipelineStep, Runnable, RuntimeNode, Selected, SelectError,
};
pub use crate::template::Reference;
pub use crate::TypeRegistry;
