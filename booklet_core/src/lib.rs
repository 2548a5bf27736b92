//! `booklet` assembles a validated, hierarchical metadata context from a
//! directory tree of per-node configuration fragments and renders the
//! documents describing a multi-level competition structure — competition,
//! volume, venue and language levels down to problems and teams. Templates
//! are rendered strictly: every missing variable in a pass is reported in
//! one diagnostic.

pub use config::*;
pub use context::*;
pub use convert::*;
pub use error::*;
pub use filters::*;
pub use hierarchy::*;
pub use lists::*;
pub use locale::*;
pub use meta::*;
pub use render::*;
pub use schema::*;
pub use tree::*;
pub use validator::*;

pub mod config;
mod context;
mod convert;
mod error;
pub mod filters;
mod hierarchy;
pub mod lists;
mod locale;
mod meta;
mod render;
pub mod schema;
mod tree;
mod validator;

#[cfg(test)]
mod __fixtures;
