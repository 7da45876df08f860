#![warn(rust_2018_idioms)]

mod error;
mod preferences;
pub mod utils;

pub use crate::{error::*, preferences::*};
