//! Type-directed C#-to-JavaScript emitter.
//!
//! The emitter consumes a resolved compilation through the
//! [`SemanticModel`](csz_semantic::SemanticModel) oracle and streams
//! JavaScript text:
//!
//! - [`output`]: the writer stack
//! - [`temp_vars`] and [`locals`]: per-function temporaries and local renaming
//! - [`capture`]: closure capture analysis
//! - [`template`]: inline template parsing
//! - [`strategy`]: the operator lowering table
//! - [`bridge`]: per-type emission identity and module placement
//! - [`emitter`]: the [`Printer`] that lowers expressions, statements and types
//! - [`program`]: whole-program emission grouped by output file

pub mod bridge;
pub mod capture;
pub mod emitter;
pub mod error;
pub mod interceptor;
pub mod locals;
pub mod options;
pub mod output;
pub mod program;
pub mod strategy;
pub mod template;
pub mod temp_vars;

pub use bridge::{BridgeId, BridgeType, BridgeTypes};
pub use capture::{CaptureInfo, analyze_captures};
pub use emitter::{NameOptions, Printer};
pub use error::{EmitError, EmitResult};
pub use interceptor::{EmitInterceptor, Interception};
pub use options::{EmitterOptions, NewLine, Target};
pub use program::{EmitFailure, EmittedProgram, EmittedUnit, ProgramEmitter, emit_program};
