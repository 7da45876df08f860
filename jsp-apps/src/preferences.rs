use std::path::Path;

use fs_err as fs;
use jsp::JointStatePublisherConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Settings of the `joint_state_publisher` application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Preferences {
    /// WebSocket url of the rosbridge server.
    #[serde(default = "default_ros_bridge_url")]
    pub ros_bridge_url: String,
    #[serde(default)]
    pub publisher: JointStatePublisherConfig,
}

fn default_ros_bridge_url() -> String {
    "ws://localhost:9090".to_owned()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            ros_bridge_url: default_ros_bridge_url(),
            publisher: JointStatePublisherConfig::default(),
        }
    }
}

impl Preferences {
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| Error::NoFile(path.to_owned(), e))?;
        Self::from_str(&s, path)
    }

    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.as_ref().to_owned(), e))
    }

    pub fn ros_bridge_url(&self) -> Result<Url, Error> {
        Url::parse(&self.ros_bridge_url)
            .map_err(|e| Error::InvalidUrl(self.ros_bridge_url.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let url = Preferences::default().ros_bridge_url().unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(9090));
    }

    #[test]
    fn test_invalid_url() {
        let preferences = Preferences {
            ros_bridge_url: "localhost 9090".into(),
            ..Default::default()
        };
        assert!(matches!(
            preferences.ros_bridge_url(),
            Err(Error::InvalidUrl(..))
        ));
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(
            Preferences::from_str("", "empty.toml").unwrap(),
            Preferences::default()
        );
    }
}
