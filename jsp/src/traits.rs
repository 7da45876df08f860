use auto_impl::auto_impl;

use crate::{error::Error, msg::JointState};

#[auto_impl(Box, Arc)]
pub trait ParamClient: Send + Sync {
    /// Returns the value of the parameter `name`.
    ///
    /// # Implementation
    ///
    /// This may block for as long as the round trip takes. Callers that must
    /// stay responsive are expected to run it on another thread.
    fn get_param(&self, name: &str) -> Result<String, Error>;
}

#[auto_impl(Box, Arc)]
pub trait TopicPublisher: Send + Sync {
    /// Sends `joint_state` on `topic` without waiting for any acknowledgement.
    fn publish(&self, topic: &str, message_type: &str, joint_state: &JointState)
        -> Result<(), Error>;
}
