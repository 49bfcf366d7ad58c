//! Grammar rules for AL.
//!
//! This module contains the grammar rules organized by category:
//!
//! - `objects.rs` - Application objects, properties, sections, procedures and triggers
//! - `declarations.rs` - Var sections, parameters, return values, attributes and types
//! - `statements.rs` - Statement parsing
//! - `expressions.rs` - Expression parsing (Pratt parser)

mod declarations;
mod expressions;
mod objects;
mod statements;
