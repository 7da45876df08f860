use std::{
    collections::HashSet,
    fmt,
    net::TcpStream,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};

use jsp::{JointState, ParamClient, TopicPublisher};
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use tungstenite::{stream::MaybeTlsStream, Message, WebSocket};
use url::Url;

use crate::protocol::{decode_param_value, Operation, GET_PARAM_SERVICE};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

fn map_connection_error<E: fmt::Display>(url: &Url) -> impl FnOnce(E) -> jsp::Error + '_ {
    move |e: E| jsp::Error::Connection {
        message: format!("url:{url}: {e}"),
    }
}

/// Connection to a rosbridge server.
///
/// Serves as both the parameter client and the topic publisher of a
/// [`jsp::JointStatePublisher`].
pub struct RosbridgeClient {
    url: Url,
    socket: Mutex<Socket>,
    advertised: Mutex<HashSet<String>>,
    next_id: AtomicU64,
}

impl fmt::Debug for RosbridgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RosbridgeClient")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl RosbridgeClient {
    pub fn connect(url: Url) -> Result<Self, jsp::Error> {
        let (socket, response) =
            tungstenite::connect(url.as_str()).map_err(map_connection_error(&url))?;
        debug!(%url, status = %response.status(), "Connected to rosbridge");
        Ok(Self {
            url,
            socket: Mutex::new(socket),
            advertised: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(0),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn next_id(&self, prefix: &str, name: &str) -> String {
        format!(
            "{prefix}:{name}:{}",
            self.next_id.fetch_add(1, Ordering::Relaxed)
        )
    }

    fn lock_socket(&self) -> Result<MutexGuard<'_, Socket>, jsp::Error> {
        self.socket
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock socket for {} : {}", self.url, e).into())
    }

    fn send(&self, socket: &mut Socket, op: &Operation) -> Result<(), jsp::Error> {
        let text = serde_json::to_string(op).map_err(anyhow::Error::from)?;
        trace!(%text, "send");
        socket
            .send(Message::Text(text))
            .map_err(map_connection_error(&self.url))
    }

    /// Calls `service` and blocks until the response with the same id arrives.
    /// Other traffic received meanwhile is skipped.
    fn call_service(&self, service: &str, args: Value) -> Result<Value, jsp::Error> {
        let id = self.next_id("call_service", service);
        let mut socket = self.lock_socket()?;
        self.send(
            &mut socket,
            &Operation::CallService {
                id: id.clone(),
                service: service.to_owned(),
                args,
            },
        )?;
        loop {
            let text = match socket.read().map_err(map_connection_error(&self.url))? {
                Message::Text(text) => text,
                Message::Close(frame) => {
                    return Err(jsp::Error::Connection {
                        message: format!("url:{}: closed by server ({frame:?})", self.url),
                    })
                }
                _ => continue,
            };
            match serde_json::from_str::<Operation>(&text) {
                Ok(Operation::ServiceResponse {
                    id: Some(response_id),
                    values,
                    result,
                    ..
                }) if response_id == id => {
                    return if result {
                        Ok(values)
                    } else {
                        Err(jsp::Error::Connection {
                            message: format!("service {service} failed: {values}"),
                        })
                    };
                }
                Ok(other) => trace!(?other, "skip"),
                Err(e) => warn!("Failed to decode rosbridge message: {e}"),
            }
        }
    }
}

impl ParamClient for RosbridgeClient {
    fn get_param(&self, name: &str) -> Result<String, jsp::Error> {
        debug!(%name, "get_param");
        let values = self.call_service(GET_PARAM_SERVICE, json!({ "name": name, "default": "" }))?;
        decode_param_value(name, &values)
    }
}

impl TopicPublisher for RosbridgeClient {
    fn publish(
        &self,
        topic: &str,
        message_type: &str,
        joint_state: &JointState,
    ) -> Result<(), jsp::Error> {
        let msg = serde_json::to_value(joint_state).map_err(anyhow::Error::from)?;
        let mut socket = self.lock_socket()?;
        let mut advertised = self
            .advertised
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock advertised topics: {e}"))?;
        if !advertised.contains(topic) {
            debug!(%topic, %message_type, "advertise");
            self.send(
                &mut socket,
                &Operation::Advertise {
                    topic: topic.to_owned(),
                    message_type: message_type.to_owned(),
                    id: Some(self.next_id("advertise", topic)),
                },
            )?;
            advertised.insert(topic.to_owned());
        }
        self.send(
            &mut socket,
            &Operation::Publish {
                topic: topic.to_owned(),
                msg,
            },
        )
    }
}

impl Drop for RosbridgeClient {
    fn drop(&mut self) {
        if let Ok(socket) = self.socket.get_mut() {
            let _ = socket.close(None);
            let _ = socket.flush();
        }
    }
}
