//! Connection-oriented delivery of snapshots.
//!
//! Two independent links: the network association (`NetworkSession`) and the
//! optional broker connection owned by `Publisher`. The broker is only ever
//! touched while the network link is up.

use std::time::Duration;

use airmon_traits::{Clock, HttpGet, MessageBroker, NetworkLink};
use serde::Serialize;
use url::Url;

use crate::config::{LinkCfg, PublishCfg, UploadCfg};
use crate::error::AirmonError;
use crate::hw_error::map_hw_error;
use crate::readings::Snapshot;
use crate::status::DispatchOutcome;
use crate::util::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

// ── Network link ─────────────────────────────────────────────────────────────

pub struct NetworkSession<L, C> {
    link: L,
    clock: C,
    policy: LinkCfg,
    state: LinkState,
}

impl<L: NetworkLink, C: Clock> NetworkSession<L, C> {
    pub fn new(link: L, clock: C, policy: LinkCfg) -> Self {
        Self {
            link,
            clock,
            policy,
            state: LinkState::Disconnected,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    pub fn address(&self) -> Option<String> {
        self.link.address()
    }

    /// Begin association and poll until associated or `max_attempts` waits
    /// of `attempt_spacing_ms` have elapsed.
    pub fn connect(&mut self) -> Result<(), AirmonError> {
        self.state = LinkState::Connecting;
        tracing::info!(
            ssid = %self.policy.ssid,
            max_attempts = self.policy.max_attempts,
            spacing_ms = self.policy.attempt_spacing_ms,
            "connecting network link"
        );

        if let Err(e) = self.link.begin(&self.policy.ssid, &self.policy.password) {
            self.state = LinkState::Disconnected;
            let err = map_hw_error(&*e);
            tracing::warn!(error = %err, "network link begin failed");
            return Err(err);
        }

        let spacing = Duration::from_millis(self.policy.attempt_spacing_ms);
        let mut attempts = 0u32;
        while !self.link.is_associated() {
            if attempts >= self.policy.max_attempts {
                self.state = LinkState::Disconnected;
                tracing::warn!(attempts, "network link unavailable");
                return Err(AirmonError::LinkUnavailable { attempts });
            }
            self.clock.sleep(spacing);
            attempts += 1;
        }

        self.state = LinkState::Connected;
        tracing::info!(attempts, address = ?self.link.address(), "network link up");
        Ok(())
    }

    /// Re-read association and update the state accordingly.
    pub fn refresh(&mut self) -> LinkState {
        let up = self.link.is_associated();
        match (self.state, up) {
            (LinkState::Connected, false) => {
                tracing::warn!("network link dropped");
                self.state = LinkState::Disconnected;
            }
            (LinkState::Disconnected, true) => {
                tracing::info!("network link came back");
                self.state = LinkState::Connected;
            }
            _ => {}
        }
        self.state
    }
}

// ── Upload ───────────────────────────────────────────────────────────────────

/// Request/response upload of one snapshot per call.
pub struct Uploader<H> {
    http: H,
    base: Url,
    api_key: String,
}

impl<H: HttpGet> Uploader<H> {
    pub fn new(http: H, cfg: &UploadCfg) -> Result<Self, AirmonError> {
        let mut base = Url::parse(&cfg.endpoint)
            .map_err(|e| AirmonError::Config(format!("upload endpoint: {e}")))?;
        base.path_segments_mut()
            .map_err(|()| AirmonError::Config("upload endpoint cannot carry a path".into()))?
            .pop_if_empty()
            .push("update");
        Ok(Self {
            http,
            base,
            api_key: cfg.api_key.clone(),
        })
    }

    /// `{endpoint}/update?api_key=..&field1=T&field2=H&field3=AIR&field4=DUST`
    pub fn request_url(&self, snap: &Snapshot) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("field1", &format!("{:.2}", snap.temperature_c))
            .append_pair("field2", &format!("{:.2}", snap.humidity_pct))
            .append_pair("field3", &snap.air_raw.to_string())
            .append_pair("field4", &format!("{:.2}", snap.dust_ug_m3));
        url.into()
    }

    /// Send once. A positive status is success.
    pub fn deliver(&mut self, snap: &Snapshot) -> Result<i32, AirmonError> {
        let url = self.request_url(snap);
        match self.http.get(&url) {
            Ok(resp) if resp.status > 0 => {
                tracing::info!(status = resp.status, body = %resp.body, "upload sent");
                Ok(resp.status)
            }
            Ok(resp) => {
                tracing::warn!(status = resp.status, "upload rejected");
                Err(AirmonError::UploadRejected(resp.status))
            }
            Err(e) => {
                let err = map_hw_error(&*e);
                tracing::warn!(error = %err, "upload failed");
                Err(err)
            }
        }
    }
}

// ── Publish ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PublishPayload {
    temperature: f64,
    humidity: f64,
    #[serde(rename = "airValue")]
    air_value: u16,
    #[serde(rename = "dustDensity")]
    dust_density: f64,
}

/// JSON body of one published message.
pub fn encode_publish_payload(snap: &Snapshot) -> Result<String, AirmonError> {
    serde_json::to_string(&PublishPayload {
        temperature: round2(snap.temperature_c),
        humidity: round2(snap.humidity_pct),
        air_value: snap.air_raw,
        dust_density: round2(snap.dust_ug_m3),
    })
    .map_err(|e| AirmonError::Publish(e.to_string()))
}

/// Broker client id: prefix plus a random 16-bit hex suffix.
pub fn client_id(prefix: &str) -> String {
    format!("{prefix}{:x}", fastrand::u16(..))
}

pub struct Publisher<B> {
    broker: B,
    cfg: PublishCfg,
    state: LinkState,
}

impl<B: MessageBroker> Publisher<B> {
    pub fn new(broker: B, cfg: PublishCfg) -> Self {
        Self {
            broker,
            cfg,
            state: LinkState::Disconnected,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn topic(&self) -> &str {
        &self.cfg.topic
    }

    /// One connection attempt with a fresh client id.
    pub fn connect(&mut self) -> Result<(), AirmonError> {
        self.state = LinkState::Connecting;
        let id = client_id(&self.cfg.client_prefix);
        match self.broker.connect(&id) {
            Ok(()) if self.broker.is_connected() => {
                self.state = LinkState::Connected;
                tracing::info!(client_id = %id, "broker connected");
                Ok(())
            }
            Ok(()) => {
                self.state = LinkState::Disconnected;
                tracing::warn!(client_id = %id, "broker refused connection");
                Err(AirmonError::BrokerUnavailable("connection refused".into()))
            }
            Err(e) => {
                self.state = LinkState::Disconnected;
                let err = match map_hw_error(&*e) {
                    e @ AirmonError::BrokerUnavailable(_) => e,
                    other => AirmonError::BrokerUnavailable(other.to_string()),
                };
                tracing::warn!(client_id = %id, error = %err, "broker connect failed");
                Err(err)
            }
        }
    }

    /// Publish one QoS-0 message, reconnecting once first if needed.
    pub fn publish(&mut self, snap: &Snapshot) -> Result<(), AirmonError> {
        if !self.broker.is_connected() {
            self.state = LinkState::Disconnected;
            tracing::info!("broker disconnected; reconnecting");
            self.connect()?;
        }

        let payload = encode_publish_payload(snap)?;
        match self.broker.publish(&self.cfg.topic, payload.as_bytes()) {
            Ok(()) => {
                tracing::debug!(topic = %self.cfg.topic, %payload, "published");
                Ok(())
            }
            Err(e) => {
                if !self.broker.is_connected() {
                    self.state = LinkState::Disconnected;
                }
                let err = match map_hw_error(&*e) {
                    e @ (AirmonError::Publish(_) | AirmonError::BrokerUnavailable(_)) => e,
                    other => AirmonError::Publish(other.to_string()),
                };
                tracing::warn!(error = %err, "publish failed");
                Err(err)
            }
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Seam between the control loop and snapshot delivery.
pub trait Dispatch {
    /// Boot-time connect. Failure leaves the monitor in display-only mode.
    fn start(&mut self) -> Result<(), AirmonError> {
        Ok(())
    }

    fn dispatch(&mut self, snapshot: &Snapshot) -> DispatchOutcome;
}

impl<T: Dispatch + ?Sized> Dispatch for Box<T> {
    fn start(&mut self) -> Result<(), AirmonError> {
        (**self).start()
    }

    fn dispatch(&mut self, snapshot: &Snapshot) -> DispatchOutcome {
        (**self).dispatch(snapshot)
    }
}

/// Network link plus the upload and publish paths.
pub struct TransportSession<L, C, H, B> {
    network: NetworkSession<L, C>,
    uploader: Option<Uploader<H>>,
    publisher: Option<Publisher<B>>,
}

impl<L, C, H, B> TransportSession<L, C, H, B>
where
    L: NetworkLink,
    C: Clock,
    H: HttpGet,
    B: MessageBroker,
{
    pub fn new(network: NetworkSession<L, C>) -> Self {
        Self {
            network,
            uploader: None,
            publisher: None,
        }
    }

    pub fn with_uploader(mut self, uploader: Uploader<H>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_publisher(mut self, publisher: Publisher<B>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn network(&self) -> &NetworkSession<L, C> {
        &self.network
    }

    pub fn publish_state(&self) -> Option<LinkState> {
        self.publisher.as_ref().map(Publisher::state)
    }

    /// Connect the network link and, when it comes up, the broker.
    pub fn start(&mut self) -> Result<(), AirmonError> {
        self.network.connect()?;
        if let Some(p) = self.publisher.as_mut() {
            // broker failure is not a boot failure; publish() retries later
            let _ = p.connect();
        }
        Ok(())
    }

    /// Upload one snapshot. Errors with `LinkDown` and sends nothing while
    /// the network link is down.
    pub fn deliver(&mut self, snap: &Snapshot) -> Result<i32, AirmonError> {
        if !self.network.is_connected() {
            return Err(AirmonError::LinkDown);
        }
        match self.uploader.as_mut() {
            Some(u) => u.deliver(snap),
            None => Err(AirmonError::Config("upload path not configured".into())),
        }
    }

    /// Publish one snapshot. Same link precondition as `deliver`.
    pub fn publish(&mut self, snap: &Snapshot) -> Result<(), AirmonError> {
        if !self.network.is_connected() {
            return Err(AirmonError::LinkDown);
        }
        match self.publisher.as_mut() {
            Some(p) => p.publish(snap),
            None => Err(AirmonError::Config("publish path not configured".into())),
        }
    }

    /// One dispatch cycle.
    pub fn dispatch(&mut self, snap: &Snapshot) -> DispatchOutcome {
        if self.network.refresh() != LinkState::Connected {
            tracing::warn!("network link down; reconnecting, nothing sent this cycle");
            let reconnected = self.network.connect().is_ok();
            return DispatchOutcome::LinkDown { reconnected };
        }

        let upload = self.uploader.is_some().then(|| self.deliver(snap));
        let publish = self.publisher.is_some().then(|| self.publish(snap));
        DispatchOutcome::Attempted { upload, publish }
    }
}

impl<L, C, H, B> Dispatch for TransportSession<L, C, H, B>
where
    L: NetworkLink,
    C: Clock,
    H: HttpGet,
    B: MessageBroker,
{
    fn start(&mut self) -> Result<(), AirmonError> {
        TransportSession::start(self)
    }

    fn dispatch(&mut self, snapshot: &Snapshot) -> DispatchOutcome {
        TransportSession::dispatch(self, snapshot)
    }
}
