mod analysis;
mod config;
mod correlate;
mod decode;
mod error;
mod partition;
mod rand;
mod record;
mod scheme;
mod thread_random;
mod validate;

pub use crate::analysis::*;
pub use crate::config::*;
pub use crate::correlate::*;
pub use crate::decode::*;
pub use crate::error::*;
pub use crate::partition::*;
pub use crate::rand::*;
pub use crate::record::*;
pub use crate::scheme::*;
pub use crate::thread_random::*;
pub use crate::validate::*;
