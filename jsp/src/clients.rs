use std::{collections::HashMap, sync::Mutex};

use crate::{
    error::Error,
    msg::JointState,
    traits::{ParamClient, TopicPublisher},
};

/// Dummy parameter server and topic for debug or tests.
#[derive(Debug, Default)]
pub struct DummyConnection {
    params: HashMap<String, String>,
    published: Mutex<Vec<(String, String, JointState)>>,
}

impl DummyConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Messages sent so far, as `(topic, message_type, message)`.
    pub fn published(&self) -> Vec<(String, String, JointState)> {
        self.published.lock().unwrap().clone()
    }
}

impl ParamClient for DummyConnection {
    fn get_param(&self, name: &str) -> Result<String, Error> {
        self.params
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Connection {
                message: format!("No parameter={name}"),
            })
    }
}

impl TopicPublisher for DummyConnection {
    fn publish(
        &self,
        topic: &str,
        message_type: &str,
        joint_state: &JointState,
    ) -> Result<(), Error> {
        self.published.lock().unwrap().push((
            topic.to_owned(),
            message_type.to_owned(),
            joint_state.clone(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::Time;

    #[test]
    fn test_get_param() {
        let connection = DummyConnection::new().with_param("robot_description", "<robot/>");
        assert_eq!(
            connection.get_param("robot_description").unwrap(),
            "<robot/>"
        );
        assert!(matches!(
            connection.get_param("other"),
            Err(Error::Connection { .. })
        ));
    }

    #[test]
    fn test_publish() {
        let connection = DummyConnection::new();
        assert!(connection.published().is_empty());
        let msg = JointState::from_positions(Time::default(), vec!["a".into()], vec![0.5]);
        connection.publish("/js", "sensor_msgs/JointState", &msg).unwrap();
        assert_eq!(
            connection.published(),
            vec![("/js".to_owned(), "sensor_msgs/JointState".to_owned(), msg)]
        );
    }
}
