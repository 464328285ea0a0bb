#![doc = include_str!("../README.md")]

mod document;
mod error;
mod extract;

pub use crate::document::*;
pub use crate::error::*;
pub use crate::extract::*;
// Public re-export so downstream crates can access `snowmelt` via
// `snowmelt_corpus::snowmelt`
pub use snowmelt;
