#![doc = include_str!("../README.md")]

pub mod errors;
pub mod model;
pub mod names;
pub mod parser;

pub use errors::ParseError;
pub use parser::{parse, strip_comment_lines};
