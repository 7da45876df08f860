//! Joint state publisher: reads a robot description, shows a slider per
//! movable joint and publishes `sensor_msgs/JointState` on every change.

#![warn(rust_2018_idioms)]

mod clients;
mod error;
pub mod model;
pub mod msg;
mod panel;
mod publisher;
mod surface;
mod traits;

pub use crate::{
    clients::*,
    error::*,
    model::{Joint, JointKind},
    msg::{JointState, Time, JOINT_STATE_MESSAGE_TYPE},
    panel::*,
    publisher::*,
    surface::*,
    traits::*,
};
