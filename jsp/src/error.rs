use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("jsp: Failed to parse robot description: {}", .0)]
    Xml(#[from] roxmltree::Error),
    #[error("jsp: No <robot> element is found in the robot description")]
    NoRobotElement,
    #[error("jsp: Joint without name (joint #{})", index)]
    NoJointName { index: usize },
    #[error("jsp: Joint={} is declared more than once", .0)]
    DuplicateJoint(String),
    #[error("jsp: Joint={} has no <limit> element", .0)]
    NoLimit(String),
    #[error(
        "jsp: Invalid limit: joint={}, attribute={}, value={:?}",
        joint,
        attribute,
        value
    )]
    InvalidLimit {
        joint: String,
        attribute: &'static str,
        value: Option<String>,
    },
    #[error("jsp: Connection error : {}", message)]
    Connection { message: String },
    #[error("jsp: Invalid position for joint={}: {:?}", joint, input)]
    InvalidPosition { joint: String, input: String },
    #[error("jsp: No input is bound to element #{}", .0)]
    NoElement(usize),
    #[error("jsp: Other: {:?}", .0)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns `true` if this error comes from a malformed robot description.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Xml(_)
                | Self::NoRobotElement
                | Self::NoJointName { .. }
                | Self::DuplicateJoint(_)
                | Self::NoLimit(_)
                | Self::InvalidLimit { .. }
        )
    }
}
