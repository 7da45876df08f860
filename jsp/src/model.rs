use std::{collections::HashSet, ops::RangeInclusive};

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Range used for joints without a mechanical limit.
pub const CONTINUOUS_JOINT_LIMIT: f64 = 3.1415;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointKind {
    Continuous,
    Bounded,
}

/// A controllable joint read from the robot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedJoint")]
pub struct Joint {
    name: String,
    kind: JointKind,
    min: f64,
    max: f64,
    initial: f64,
}

/// Deserialized form of [`Joint`]; the range is checked and the initial
/// value recomputed on conversion.
#[derive(Deserialize)]
struct UncheckedJoint {
    name: String,
    kind: JointKind,
    #[serde(default)]
    min: f64,
    #[serde(default)]
    max: f64,
}

impl TryFrom<UncheckedJoint> for Joint {
    type Error = Error;

    fn try_from(joint: UncheckedJoint) -> Result<Self, Self::Error> {
        match joint.kind {
            JointKind::Continuous => Ok(Self::continuous(joint.name)),
            JointKind::Bounded => Self::bounded(joint.name, joint.min, joint.max),
        }
    }
}

impl Joint {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: JointKind::Continuous,
            min: -CONTINUOUS_JOINT_LIMIT,
            max: CONTINUOUS_JOINT_LIMIT,
            initial: 0.0,
        }
    }

    /// Creates a joint limited to `lower..=upper`.
    ///
    /// The initial value is `0` when the range contains zero and the midpoint
    /// otherwise.
    pub fn bounded(name: impl Into<String>, lower: f64, upper: f64) -> Result<Self, Error> {
        let name = name.into();
        for (attribute, value) in [("lower", lower), ("upper", upper)] {
            if !value.is_finite() {
                return Err(Error::InvalidLimit {
                    joint: name,
                    attribute,
                    value: Some(value.to_string()),
                });
            }
        }
        if lower > upper {
            return Err(Error::InvalidLimit {
                joint: name,
                attribute: "lower",
                value: Some(lower.to_string()),
            });
        }
        let initial = if lower <= 0.0 && upper >= 0.0 {
            0.0
        } else {
            (upper + lower) / 2.0
        };
        Ok(Self {
            name,
            kind: JointKind::Bounded,
            min: lower,
            max: upper,
            initial,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn range(&self) -> RangeInclusive<f64> {
        self.min..=self.max
    }

    /// Slider increment: a hundredth of the range.
    pub fn step(&self) -> f64 {
        (self.max - self.min) / 100.0
    }
}

/// Extracts the non-fixed joints of a robot description, in document order.
///
/// Only the first `<robot>` element is read; its direct `<joint>` children
/// are the candidates.
pub fn parse(description: &str) -> Result<Vec<Joint>, Error> {
    let document = Document::parse(description)?;
    let robot = document
        .descendants()
        .find(|node| node.has_tag_name("robot"))
        .ok_or(Error::NoRobotElement)?;

    let mut names = HashSet::new();
    let mut joints = Vec::new();
    for (index, node) in robot
        .children()
        .filter(|node| node.has_tag_name("joint"))
        .enumerate()
    {
        let joint_type = node.attribute("type");
        if joint_type == Some("fixed") {
            continue;
        }
        let name = match node.attribute("name") {
            Some(name) if !name.is_empty() => name,
            _ => return Err(Error::NoJointName { index }),
        };
        if !names.insert(name) {
            return Err(Error::DuplicateJoint(name.to_owned()));
        }

        let joint = if joint_type == Some("continuous") {
            Joint::continuous(name)
        } else {
            let limit = node
                .descendants()
                .find(|n| n.has_tag_name("limit"))
                .ok_or_else(|| Error::NoLimit(name.to_owned()))?;
            Joint::bounded(
                name,
                limit_attribute(name, limit, "lower")?,
                limit_attribute(name, limit, "upper")?,
            )?
        };
        debug!(
            name = joint.name(),
            kind = ?joint.kind(),
            min = joint.min(),
            max = joint.max(),
            "joint"
        );
        joints.push(joint);
    }
    Ok(joints)
}

fn limit_attribute(
    joint: &str,
    limit: Node<'_, '_>,
    attribute: &'static str,
) -> Result<f64, Error> {
    let invalid = |value: Option<&str>| Error::InvalidLimit {
        joint: joint.to_owned(),
        attribute,
        value: value.map(str::to_owned),
    };
    let raw = limit.attribute(attribute);
    let value = raw
        .ok_or_else(|| invalid(raw))?
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(raw))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(raw))
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    const ARM: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <link name="base"/>
  <joint name="base_to_world" type="fixed">
    <parent link="world"/>
    <child link="base"/>
  </joint>
  <joint name="shoulder" type="revolute">
    <limit lower="-1.0" upper="3.0" effort="10" velocity="1"/>
  </joint>
  <joint name="wrist" type="continuous"/>
  <joint name="slide" type="prismatic">
    <limit lower="0.5" upper="1.5"/>
  </joint>
</robot>
"#;

    #[test]
    fn test_parse_document_order_without_fixed() {
        let joints = parse(ARM).unwrap();
        let names: Vec<_> = joints.iter().map(Joint::name).collect();
        assert_eq!(names, ["shoulder", "wrist", "slide"]);
    }

    #[test]
    fn test_parse_continuous() {
        let joints = parse(ARM).unwrap();
        let wrist = &joints[1];
        assert_eq!(wrist.kind(), JointKind::Continuous);
        assert_approx_eq!(wrist.min(), -3.1415);
        assert_approx_eq!(wrist.max(), 3.1415);
        assert_approx_eq!(wrist.initial(), 0.0);
    }

    #[test]
    fn test_parse_bounded() {
        let joints = parse(ARM).unwrap();
        let shoulder = &joints[0];
        assert_eq!(shoulder.kind(), JointKind::Bounded);
        assert_approx_eq!(shoulder.min(), -1.0);
        assert_approx_eq!(shoulder.max(), 3.0);
        assert_approx_eq!(shoulder.initial(), 0.0);
        assert_approx_eq!(shoulder.step(), 0.04);

        let slide = &joints[2];
        assert_approx_eq!(slide.initial(), 1.0);
        assert!(slide.range().contains(&slide.initial()));
    }

    #[test]
    fn test_bounded_initial_value() {
        let negative = Joint::bounded("n", -3.0, -1.0).unwrap();
        assert_approx_eq!(negative.initial(), -2.0);
        let touching = Joint::bounded("t", 0.0, 2.0).unwrap();
        assert_approx_eq!(touching.initial(), 0.0);
        let point = Joint::bounded("p", 0.25, 0.25).unwrap();
        assert_approx_eq!(point.initial(), 0.25);
        assert_approx_eq!(point.step(), 0.0);
    }

    #[test]
    fn test_bounded_rejects_inverted_range() {
        let err = Joint::bounded("j", 1.0, -1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidLimit { .. }));
    }

    #[test]
    fn test_deserialize_checks_range() {
        let err = serde_json::from_str::<Joint>(
            r#"{"name":"j","kind":"bounded","min":1.0,"max":-1.0,"initial":5.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid limit"), "{err}");

        let joint: Joint = serde_json::from_str(
            r#"{"name":"j","kind":"bounded","min":1.0,"max":3.0,"initial":5.0}"#,
        )
        .unwrap();
        assert_approx_eq!(joint.initial(), 2.0);

        let wrist: Joint = serde_json::from_str(r#"{"name":"w","kind":"continuous"}"#).unwrap();
        assert_eq!(wrist, Joint::continuous("w"));

        let shoulder = Joint::bounded("shoulder", -1.0, 3.0).unwrap();
        let json = serde_json::to_string(&shoulder).unwrap();
        assert_eq!(serde_json::from_str::<Joint>(&json).unwrap(), shoulder);
    }

    #[test]
    fn test_parse_nested_robot() {
        let doc = r#"<launch><param name="x"><robot name="r">
            <joint name="j1" type="continuous"/>
        </robot></param></launch>"#;
        let joints = parse(doc).unwrap();
        assert_eq!(joints.len(), 1);
        assert_eq!(joints[0].name(), "j1");
    }

    #[test]
    fn test_parse_only_direct_children() {
        let doc = r#"<robot name="r">
            <gazebo><joint name="hidden" type="continuous"/></gazebo>
            <joint name="j1" type="continuous"/>
        </robot>"#;
        let joints = parse(doc).unwrap();
        assert_eq!(joints.len(), 1);
        assert_eq!(joints[0].name(), "j1");
    }

    #[test]
    fn test_parse_no_robot() {
        let err = parse(r#"<model><joint name="j1" type="continuous"/></model>"#).unwrap_err();
        assert!(matches!(err, Error::NoRobotElement));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse("<robot><joint name=").unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_missing_name() {
        let err = parse(r#"<robot><joint type="continuous"/></robot>"#).unwrap_err();
        assert!(matches!(err, Error::NoJointName { index: 0 }));
        let err = parse(r#"<robot><joint name="" type="continuous"/></robot>"#).unwrap_err();
        assert!(matches!(err, Error::NoJointName { .. }));
    }

    #[test]
    fn test_parse_missing_limit() {
        let err = parse(r#"<robot><joint name="j" type="revolute"/></robot>"#).unwrap_err();
        assert!(matches!(err, Error::NoLimit(name) if name == "j"));
    }

    #[test]
    fn test_parse_invalid_limit() {
        let cases = [
            r#"<limit lower="abc" upper="1"/>"#,
            r#"<limit upper="1"/>"#,
            r#"<limit lower="NaN" upper="1"/>"#,
            r#"<limit lower="-1" upper="inf"/>"#,
        ];
        for limit in cases {
            let doc = format!(r#"<robot><joint name="j" type="revolute">{limit}</joint></robot>"#);
            let err = parse(&doc).unwrap_err();
            assert!(matches!(err, Error::InvalidLimit { .. }), "{limit}: {err}");
        }
    }

    #[test]
    fn test_parse_duplicate_joint() {
        let doc = r#"<robot>
            <joint name="j" type="continuous"/>
            <joint name="j" type="continuous"/>
        </robot>"#;
        let err = parse(doc).unwrap_err();
        assert!(matches!(err, Error::DuplicateJoint(name) if name == "j"));
    }

    #[test]
    fn test_parse_reproducible() {
        assert_eq!(parse(ARM).unwrap(), parse(ARM).unwrap());
    }
}
