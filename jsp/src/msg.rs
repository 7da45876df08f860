//! `sensor_msgs/JointState` as sent over the topic collaborator.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub const JOINT_STATE_MESSAGE_TYPE: &str = "sensor_msgs/JointState";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time {
    pub secs: u32,
    pub nsecs: u32,
}

impl Time {
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Self::from_duration)
            .unwrap_or_default()
    }

    /// Splits time since the epoch. Saturates at the largest stamp once the
    /// seconds no longer fit.
    fn from_duration(elapsed: Duration) -> Self {
        match u32::try_from(elapsed.as_secs()) {
            Ok(secs) => Self {
                secs,
                nsecs: elapsed.subsec_nanos(),
            },
            Err(_) => Self {
                secs: u32::MAX,
                nsecs: 999_999_999,
            },
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    pub header: Header,
    pub name: Vec<String>,
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub effort: Vec<f64>,
}

impl JointState {
    /// Positions only; velocity and effort stay empty.
    pub fn from_positions(stamp: Time, name: Vec<String>, position: Vec<f64>) -> Self {
        debug_assert_eq!(name.len(), position.len());
        Self {
            header: Header {
                stamp,
                frame_id: String::new(),
            },
            name,
            position,
            velocity: vec![],
            effort: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_order() {
        let a = Time { secs: 1, nsecs: 999 };
        let b = Time { secs: 2, nsecs: 0 };
        assert!(a < b);
        assert!(Time { secs: 2, nsecs: 1 } > b);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn test_time_now() {
        let first = Time::now();
        let second = Time::now();
        assert!(first.secs > 0);
        assert!(first.nsecs < 1_000_000_000);
        assert!(first <= second);
    }

    #[test]
    fn test_time_from_duration_saturates() {
        let last = Time::from_duration(Duration::new(u64::from(u32::MAX), 5));
        assert_eq!(
            last,
            Time {
                secs: u32::MAX,
                nsecs: 5
            }
        );
        let past_end = Time::from_duration(Duration::new(u64::from(u32::MAX) + 1, 5));
        assert_eq!(
            past_end,
            Time {
                secs: u32::MAX,
                nsecs: 999_999_999
            }
        );
        assert!(past_end > last);
    }

    #[test]
    fn test_joint_state_json() {
        let msg = JointState::from_positions(
            Time { secs: 10, nsecs: 20 },
            vec!["j1".to_owned()],
            vec![1.0],
        );
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({
                "header": { "stamp": { "secs": 10, "nsecs": 20 }, "frame_id": "" },
                "name": ["j1"],
                "position": [1.0],
                "velocity": [],
                "effort": [],
            })
        );
    }
}
