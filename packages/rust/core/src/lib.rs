//! Core orchestration for aidata.
//!
//! Ties the loader, schema emitter, and document renderer together, writes
//! the output tree, and builds the link manifest.

pub mod assembler;
pub mod index;
pub mod pipeline;

pub use assembler::ArtifactMeta;
pub use index::{ProblemKind, VerifyProblem, VerifyReport, verify_manifest};
pub use pipeline::{GenerateConfig, GenerateResult, ProgressReporter, SilentProgress, generate};
