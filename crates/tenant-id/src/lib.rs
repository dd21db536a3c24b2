#![doc = include_str!("../README.md")]

mod address;
mod credential;
mod error;
mod random;
mod sequence;
mod sid;
mod time;

pub use crate::address::*;
pub use crate::credential::*;
pub use crate::error::*;
pub use crate::random::*;
pub use crate::sequence::*;
pub use crate::sid::*;
pub use crate::time::*;
