//! Component-specific lowering helpers
//!
//! One helper per component constructor the runtime exposes, plus schema
//! declarations.

mod builtin;
mod model;
mod prompt;
mod router;
mod schema;
mod tool;

pub(crate) use builtin::BuiltinCodegen;
pub(crate) use model::ModelCodegen;
pub(crate) use prompt::PromptCodegen;
pub(crate) use router::RouterCodegen;
pub(crate) use schema::SchemaCodegen;
pub(crate) use tool::ToolCodegen;
