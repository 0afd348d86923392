//! Front-end lowering pipeline: surface forms in, core IR out.

pub mod apply;
pub mod ast;
pub mod clauses;
pub mod defs;
pub mod ir;
pub mod module;
pub mod scope;
pub mod special;
pub mod testing_helpers;
pub mod translate;
