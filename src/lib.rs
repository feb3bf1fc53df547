//! A C-to-Zig translator implemented in Rust.
//!
//! The input is a C translation unit that a semantic front-end has already
//! parsed and type-resolved; the output is Zig source that preserves the C
//! program's declaration visibility, storage semantics, integer and pointer
//! semantics, and observable evaluation order.

/// Typed C AST context consumed by the translator.
pub mod c_ast;
/// Driver: dump loading and output writing.
pub mod driver;
/// Contains the error types for the application.
pub mod error;
/// Macro tokenizer and expression parser.
pub mod macros;
/// The lowering core: scopes, types, decls, statements, expressions.
pub mod translator;
/// Zig output AST and renderer.
pub mod zig_ast;

pub use error::{Error, TranslationError};
pub use translator::{TranslationOutput, translate};
