/*
Example of joint_state_publisher with a dummy connection.

```bash
cargo run -p jsp-gui --example joint_state_publisher
```
*/

use jsp::{DummyConnection, JointStatePublisherConfig};

const ROBOT: &str = r#"<?xml version="1.0"?>
<robot name="two_link_arm">
  <link name="base_link"/>
  <link name="upper_arm"/>
  <link name="fore_arm"/>
  <joint name="base_to_world" type="fixed">
    <parent link="world"/>
    <child link="base_link"/>
  </joint>
  <joint name="shoulder" type="continuous">
    <parent link="base_link"/>
    <child link="upper_arm"/>
  </joint>
  <joint name="elbow" type="revolute">
    <parent link="upper_arm"/>
    <child link="fore_arm"/>
    <limit lower="-1.57" upper="2.0" effort="10.0" velocity="1.0"/>
  </joint>
</robot>
"#;

fn main() -> Result<(), jsp_gui::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jsp=debug,jsp_gui=debug".to_owned()),
        )
        .init();

    let config = JointStatePublisherConfig::default();
    let connection = DummyConnection::new().with_param(config.param_name.clone(), ROBOT);
    jsp_gui::joint_state_publisher(config, connection)
}
