pub mod ast;
pub mod classify;
pub mod diagnostic;
pub mod plugin;
pub mod policy;
pub mod registry;
pub mod rule;
pub mod tag;
