//! [`jsp`] parameter client and topic publisher using the
//! [rosbridge](https://github.com/RobotWebTools/rosbridge_suite) protocol.

#![warn(rust_2018_idioms)]

mod client;
pub mod protocol;

pub use crate::client::*;
