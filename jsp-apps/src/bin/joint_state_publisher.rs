use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use jsp_apps::{utils, Preferences};
use jsp_rosbridge::RosbridgeClient;
use tracing::{debug, info};

/// Publishes joint states chosen with sliders over rosbridge.
#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Opt {
    /// Path to the preference file.
    #[clap(short, long, value_parser)]
    config_path: Option<PathBuf>,
    /// rosbridge server url. Takes priority over the preference file.
    #[clap(long)]
    ros_bridge_url: Option<String>,
    /// Topic to publish on. Takes priority over the preference file.
    #[clap(long)]
    topic_name: Option<String>,
    /// Print the default preferences and exit.
    #[clap(long)]
    show_default_config: bool,
}

impl Opt {
    fn overwrite(&self, preferences: &mut Preferences) {
        if let Some(url) = &self.ros_bridge_url {
            preferences.ros_bridge_url = url.clone();
        }
        if let Some(topic_name) = &self.topic_name {
            preferences.publisher.topic_name = topic_name.clone();
        }
    }
}

fn main() -> Result<()> {
    utils::init_tracing();
    let opt = Opt::parse();
    debug!("opt: {opt:?}");

    if opt.show_default_config {
        print!("{}", toml::to_string(&Preferences::default())?);
        return Ok(());
    }

    let config_path = utils::get_apps_config_path(opt.config_path.clone());
    let mut preferences = utils::resolve_preferences(config_path.as_deref())?;
    opt.overwrite(&mut preferences);

    let url = preferences.ros_bridge_url()?;
    info!(%url, "Connecting to rosbridge");
    let client = RosbridgeClient::connect(url)?;
    // jsp_gui::Error wraps eframe::Error, which is not Send + Sync.
    jsp_gui::joint_state_publisher(preferences.publisher, client)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn assert_app() {
        Opt::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let opt = Opt::try_parse_from([
            env!("CARGO_BIN_NAME"),
            "--config-path",
            "jsp.toml",
            "--ros-bridge-url",
            "ws://robot:9090",
            "--topic-name",
            "/joint_states",
        ])
        .unwrap();
        assert_eq!(opt.config_path, Some(PathBuf::from("jsp.toml")));
        assert!(!opt.show_default_config);

        let mut preferences = Preferences::default();
        opt.overwrite(&mut preferences);
        assert_eq!(preferences.ros_bridge_url, "ws://robot:9090");
        assert_eq!(preferences.publisher.topic_name, "/joint_states");
        assert_eq!(preferences.publisher.param_name, "robot_description");
    }

    #[test]
    fn test_parse_no_args() {
        let opt = Opt::try_parse_from([env!("CARGO_BIN_NAME"), "--show-default-config"]).unwrap();
        assert!(opt.show_default_config);
        let mut preferences = Preferences::default();
        opt.overwrite(&mut preferences);
        assert_eq!(preferences, Preferences::default());
    }
}
