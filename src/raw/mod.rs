//! The raw, pre-expansion data model (spec.md §3).
//!
//! Raw nodes are the shape a host's text-format parser is expected to
//! emit; this module defines that shape and nothing about how any
//! particular text syntax maps onto it.

mod document;
mod node;
mod step;

pub use document::RawDocument;
pub use node::{
    ParamDecl, ParamDefs, ParamValue, PerTypeParams, RawNode, RequiredMarker, TypeBody, UsesList,
    WithBlock,
};
pub use step::{Capture, FailAction, OnFail, RawStep, Stream};
