//! Live transports for host runs: reqwest for uploads, rumqttc for publish,
//! and a TCP reachability probe standing in for Wi-Fi association.

use std::error::Error;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use airmon_traits::{HttpGet, HttpResponse, MessageBroker, NetworkLink};
use rumqttc::{Client, ConnectReturnCode, Connection, Event, MqttOptions, Outgoing, Packet, QoS};
use tracing::{debug, trace};

use crate::error::{HwError, Result};

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);
const PUBLISH_FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// Blocking HTTP client for request/response uploads.
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HwError::Http(format!("build client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpGet for HttpClient {
    fn get(&mut self, url: &str) -> std::result::Result<HttpResponse, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| HwError::Http(e.to_string()))?;
        let status = i32::from(resp.status().as_u16());
        let body = resp.text().map_err(|e| HwError::Http(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Keep-alive used when the caller does not derive one from its cadence.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);
const MAX_KEEP_ALIVE: Duration = Duration::from_secs(u16::MAX as u64);
const DRAIN_WAIT: Duration = Duration::from_millis(10);
const DRAIN_MAX_EVENTS: usize = 32;

/// Keep-alive for a session serviced once per `send_interval`: one and a half
/// intervals, within the range MQTT can express.
pub fn keep_alive_for(send_interval: Duration) -> Duration {
    (send_interval * 3 / 2).clamp(MIN_KEEP_ALIVE, MAX_KEEP_ALIVE)
}

/// Synchronous MQTT client. There is no background thread: the event loop is
/// pumped inline by `connect`, `publish`, and `is_connected`, and the latter
/// drains pending events so a session the broker closed is noticed before
/// the next send.
pub struct MqttClient {
    host: String,
    port: u16,
    connect_timeout: Duration,
    keep_alive: Duration,
    session: Option<(Client, Connection)>,
    connected: bool,
}

impl MqttClient {
    pub fn new(host: impl Into<String>, port: u16, connect_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout,
            keep_alive: DEFAULT_KEEP_ALIVE,
            session: None,
            connected: false,
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive.clamp(MIN_KEEP_ALIVE, MAX_KEEP_ALIVE);
        self
    }

    fn drop_session(&mut self, reason: &str) {
        debug!(host = %self.host, reason, "mqtt session closed");
        self.connected = false;
        self.session = None;
    }

    /// Service queued events without waiting for new work.
    fn drain(&mut self) {
        let Some((_, connection)) = self.session.as_mut() else {
            return;
        };
        let mut closed = None;
        for _ in 0..DRAIN_MAX_EVENTS {
            match connection.recv_timeout(DRAIN_WAIT) {
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                    closed = Some("broker sent DISCONNECT".to_string());
                    break;
                }
                Ok(Ok(ev)) => trace!(?ev, "mqtt event while idle"),
                Ok(Err(e)) => {
                    closed = Some(e.to_string());
                    break;
                }
                Err(_) => break,
            }
        }
        if let Some(reason) = closed {
            self.drop_session(&reason);
        }
    }
}

impl MessageBroker for MqttClient {
    fn connect(&mut self, client_id: &str) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        self.connected = false;
        self.session = None;

        let mut opts = MqttOptions::new(client_id, self.host.clone(), self.port);
        opts.set_keep_alive(self.keep_alive);
        let (client, mut connection) = Client::new(opts, 10);

        let deadline = Instant::now() + self.connect_timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(Box::new(HwError::Timeout));
            }
            match connection.recv_timeout(left) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    if ack.code != ConnectReturnCode::Success {
                        return Err(Box::new(HwError::Mqtt(format!("connack {:?}", ack.code))));
                    }
                    break;
                }
                Ok(Ok(ev)) => trace!(?ev, "mqtt event during connect"),
                Ok(Err(e)) => return Err(Box::new(HwError::Mqtt(e.to_string()))),
                Err(_) => return Err(Box::new(HwError::Timeout)),
            }
        }
        debug!(
            host = %self.host,
            port = self.port,
            keep_alive_s = self.keep_alive.as_secs(),
            "mqtt connected"
        );
        self.session = Some((client, connection));
        self.connected = true;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if self.connected {
            self.drain();
        }
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        let Some((client, connection)) = self.session.as_mut() else {
            return Err(Box::new(HwError::NotConnected));
        };
        client
            .try_publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .map_err(|e| HwError::Mqtt(e.to_string()))?;

        // Drive the event loop until the publish leaves the socket.
        let deadline = Instant::now() + PUBLISH_FLUSH_TIMEOUT;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(Box::new(HwError::Timeout));
            }
            match connection.recv_timeout(left) {
                Ok(Ok(Event::Outgoing(Outgoing::Publish(_)))) => return Ok(()),
                Ok(Ok(ev)) => trace!(?ev, "mqtt event during publish"),
                Ok(Err(e)) => {
                    let msg = e.to_string();
                    self.drop_session(&msg);
                    return Err(Box::new(HwError::Mqtt(msg)));
                }
                Err(_) => return Err(Box::new(HwError::Timeout)),
            }
        }
    }
}

/// Treats the network as associated while `probe` accepts TCP connections.
pub struct HostLink {
    probe: String,
    resolved: Option<SocketAddr>,
    local: Option<SocketAddr>,
}

impl HostLink {
    pub fn new(probe: impl Into<String>) -> Self {
        Self {
            probe: probe.into(),
            resolved: None,
            local: None,
        }
    }
}

impl NetworkLink for HostLink {
    /// The host is already on a network; credentials only label the log.
    fn begin(
        &mut self,
        ssid: &str,
        _password: &str,
    ) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        debug!(ssid, probe = %self.probe, "host link begin");
        self.resolved = self.probe.to_socket_addrs()?.next();
        if self.resolved.is_none() {
            return Err(Box::new(HwError::Io(std::io::Error::other(format!(
                "probe {} did not resolve",
                self.probe
            )))));
        }
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        let Some(addr) = self.resolved else {
            return false;
        };
        match TcpStream::connect_timeout(&addr, PROBE_TIMEOUT) {
            Ok(stream) => {
                self.local = stream.local_addr().ok();
                true
            }
            Err(e) => {
                trace!(error = %e, "network probe failed");
                false
            }
        }
    }

    fn address(&self) -> Option<String> {
        self.local.map(|a| a.ip().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_alive_outlasts_the_send_interval() {
        assert_eq!(keep_alive_for(Duration::from_secs(30)), Duration::from_secs(45));
        assert_eq!(keep_alive_for(Duration::from_millis(500)), MIN_KEEP_ALIVE);
        assert_eq!(keep_alive_for(Duration::from_secs(200_000)), MAX_KEEP_ALIVE);
    }
}
