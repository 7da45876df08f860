use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    error::Error,
    model,
    msg::{JointState, Time, JOINT_STATE_MESSAGE_TYPE},
    panel::{SliderPanel, SliderState},
    surface::{Container, ElementId},
    traits::{ParamClient, TopicPublisher},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JointStatePublisherConfig {
    /// Parameter holding the robot description.
    #[serde(default = "default_param_name")]
    pub param_name: String,
    /// Topic the joint states are published on.
    #[serde(default = "default_topic_name")]
    pub topic_name: String,
    /// Identifier of the container the sliders are placed in.
    #[serde(default = "default_div_id")]
    pub div_id: String,
}

fn default_param_name() -> String {
    "robot_description".to_owned()
}

fn default_topic_name() -> String {
    "/web_joint_states".to_owned()
}

fn default_div_id() -> String {
    "sliders".to_owned()
}

impl Default for JointStatePublisherConfig {
    fn default() -> Self {
        Self {
            param_name: default_param_name(),
            topic_name: default_topic_name(),
            div_id: default_div_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    AwaitingModel,
    Ready,
}

/// User interaction with the rendered panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// A text box lost focus.
    TextCommitted(ElementId),
    /// A range slider was released at a new value.
    SliderChanged(ElementId),
    Center,
    Randomize,
}

struct SnapshotSender {
    topic: Arc<dyn TopicPublisher>,
    topic_name: String,
    last_stamp: Mutex<Time>,
}

impl fmt::Debug for SnapshotSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSender")
            .field("topic_name", &self.topic_name)
            .field("last_stamp", &self.last_stamp)
            .finish_non_exhaustive()
    }
}

impl SnapshotSender {
    fn stamp(&self) -> Result<Time, Error> {
        let mut last = self
            .last_stamp
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock last stamp: {e}"))?;
        // Never go back in time, even if the wall clock does.
        *last = (*last).max(Time::now());
        Ok(*last)
    }

    fn send(&self, sliders: &IndexMap<String, SliderState>) -> Result<(), Error> {
        let (name, position) = sliders
            .values()
            .map(|slider| (slider.joint_name().to_owned(), slider.current_value()))
            .unzip();
        let joint_state = JointState::from_positions(self.stamp()?, name, position);
        debug!(
            topic = %self.topic_name,
            names = ?joint_state.name,
            positions = ?joint_state.position,
            "publish"
        );
        self.topic
            .publish(&self.topic_name, JOINT_STATE_MESSAGE_TYPE, &joint_state)
    }
}

/// Publishes the joint positions chosen on a slider panel.
///
/// The robot description is requested once, when the publisher is created.
/// Until it arrives there are no sliders and [`publish`](Self::publish) does
/// nothing. Hosts deliver the answer with [`poll_model`](Self::poll_model) or
/// [`wait_model`](Self::wait_model), and user input with
/// [`handle`](Self::handle).
#[derive(Debug)]
pub struct JointStatePublisher {
    config: JointStatePublisherConfig,
    container: Weak<Mutex<Container>>,
    sender: Arc<SnapshotSender>,
    model: Option<flume::Receiver<Result<String, Error>>>,
    panel: Option<SliderPanel>,
}

impl JointStatePublisher {
    pub fn new<C>(
        config: JointStatePublisherConfig,
        connection: C,
        container: &Arc<Mutex<Container>>,
    ) -> Self
    where
        C: ParamClient + TopicPublisher + 'static,
    {
        let connection = Arc::new(connection);

        let (model_sender, model_receiver) = flume::bounded(1);
        let param_client = connection.clone();
        let param_name = config.param_name.clone();
        debug!(param = %param_name, "Requesting robot description");
        std::thread::spawn(move || {
            // The publisher may already be gone; then nobody is interested.
            let _ = model_sender.send(param_client.get_param(&param_name));
        });

        let sender = Arc::new(SnapshotSender {
            topic: connection,
            topic_name: config.topic_name.clone(),
            last_stamp: Mutex::new(Time::default()),
        });
        Self {
            config,
            container: Arc::downgrade(container),
            sender,
            model: Some(model_receiver),
            panel: None,
        }
    }

    pub fn config(&self) -> &JointStatePublisherConfig {
        &self.config
    }

    pub fn state(&self) -> PublisherState {
        if self.panel.is_some() {
            PublisherState::Ready
        } else {
            PublisherState::AwaitingModel
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == PublisherState::Ready
    }

    pub fn panel(&self) -> Option<&SliderPanel> {
        self.panel.as_ref()
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.panel
            .iter()
            .flat_map(|panel| panel.sliders().keys().map(String::as_str))
            .collect()
    }

    /// Returns the container if it is still alive.
    pub fn container(&self) -> Option<Arc<Mutex<Container>>> {
        self.container.upgrade()
    }

    /// Checks, without blocking, whether the robot description has arrived
    /// and renders the sliders if so.
    ///
    /// Returns `Ok(true)` on the call that loaded the model.
    pub fn poll_model(&mut self) -> Result<bool, Error> {
        let Some(receiver) = &self.model else {
            return Ok(false);
        };
        match receiver.try_recv() {
            Ok(result) => {
                self.model = None;
                self.resolve(result).map(|()| self.is_ready())
            }
            Err(flume::TryRecvError::Empty) => Ok(false),
            Err(flume::TryRecvError::Disconnected) => {
                self.model = None;
                Err(request_dropped())
            }
        }
    }

    /// Waits for the robot description and renders the sliders.
    ///
    /// Returns immediately if the description was already handled.
    pub async fn wait_model(&mut self) -> Result<(), Error> {
        let Some(receiver) = self.model.take() else {
            return Ok(());
        };
        let result = receiver
            .recv_async()
            .await
            .map_err(|_| request_dropped())?;
        self.resolve(result)
    }

    /// Sends the current value of every slider.
    pub fn publish(&self) -> Result<(), Error> {
        match &self.panel {
            Some(panel) => self.sender.send(panel.sliders()),
            None => Ok(()),
        }
    }

    /// Applies a user interaction. Every accepted edit publishes once.
    pub fn handle(&mut self, event: PanelEvent) -> Result<(), Error> {
        let Some(panel) = &mut self.panel else {
            debug!(?event, "Ignored, no robot description yet");
            return Ok(());
        };
        let Some(container) = self.container.upgrade() else {
            warn!(div_id = %self.config.div_id, ?event, "Ignored, container is gone");
            return Ok(());
        };
        let mut container = lock(&container)?;
        match event {
            PanelEvent::TextCommitted(element) => {
                panel.text_committed(&mut *container, element).map(drop)
            }
            PanelEvent::SliderChanged(element) => {
                panel.slider_changed(&mut *container, element).map(drop)
            }
            PanelEvent::Center => panel.center(&mut *container),
            PanelEvent::Randomize => panel.randomize(&mut *container),
        }
    }

    fn resolve(&mut self, result: Result<String, Error>) -> Result<(), Error> {
        match result {
            Ok(description) => self.load_model(&description),
            Err(e) => {
                error!(param = %self.config.param_name, "Failed to get robot description: {e}");
                Err(e)
            }
        }
    }

    fn load_model(&mut self, description: &str) -> Result<(), Error> {
        if self.panel.is_some() {
            warn!("Robot description is already loaded");
            return Ok(());
        }
        let joints = model::parse(description).map_err(|e| {
            error!(param = %self.config.param_name, "Invalid robot description: {e}");
            e
        })?;

        let Some(container) = self.container.upgrade() else {
            warn!(div_id = %self.config.div_id, "Container is gone, sliders are not rendered");
            return Ok(());
        };
        let mut container = lock(&container)?;
        let sender = self.sender.clone();
        let panel = SliderPanel::render(&mut *container, &joints, move |sliders| {
            sender.send(sliders)
        });
        info!(
            div_id = %self.config.div_id,
            joints = panel.len(),
            "Robot description loaded"
        );
        self.panel = Some(panel);
        Ok(())
    }
}

fn lock(container: &Mutex<Container>) -> Result<MutexGuard<'_, Container>, Error> {
    container
        .lock()
        .map_err(|e| anyhow::anyhow!("Failed to lock container: {e}").into())
}

fn request_dropped() -> Error {
    Error::Connection {
        message: "robot description request was dropped".to_owned(),
    }
}
