//! Interactive command language: classification, time grammar and state
//! transitions.

pub mod mutate;
pub mod parse;
pub mod time;

pub use mutate::{Mutation, Notice, SkipReason, apply};
pub use parse::{IntentBundle, Line, parse_line};
pub use time::TimeToken;
