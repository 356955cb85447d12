use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::{Backoff, LinkState, SubscriptionHandle, SubscriptionSlot};
use crate::config::BridgeConfig;
use crate::services::common::Property;
use crate::services::mpris::MprisStateProjector;
use crate::services::session::{Disposition, RemoteMessage, SessionClient, SessionEventAdapter};
use crate::{BridgeError, Result};

/// Timing and retry settings for the subscription lifecycle
#[derive(Debug, Clone)]
pub struct SubscriptionSettings {
    /// Delay schedule between attempts
    pub backoff: Backoff,
    /// Bound on a single connection attempt
    pub connect_timeout: Duration,
    /// Silence longer than this counts as a dropped link
    pub liveness_timeout: Option<Duration>,
    /// Bound on releasing the handle during shutdown
    pub shutdown_grace: Duration,
    /// Failed attempts tolerated before the first subscription
    pub initial_attempts: Option<u32>,
}

impl From<&BridgeConfig> for SubscriptionSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            backoff: Backoff::from_config(&config.reconnect),
            connect_timeout: Duration::from_millis(config.session.connect_timeout_ms),
            liveness_timeout: config.session.liveness_timeout_ms.map(Duration::from_millis),
            shutdown_grace: Duration::from_millis(config.reconnect.shutdown_grace_ms),
            initial_attempts: config.reconnect.initial_attempts,
        }
    }
}

enum LinkEnd {
    Shutdown,
    Dropped(&'static str),
}

enum Wait {
    Message(RemoteMessage),
    Closed,
    Silent,
}

/// Owns the connect, subscribe, drop, reconnect lifecycle.
///
/// While the link is down the projector shows a stopped player with no
/// capabilities. Reconnection backs off exponentially and never gives up
/// unless `initial_attempts` is set and the bridge has never subscribed.
pub struct SubscriptionManager {
    client: Arc<dyn SessionClient>,
    projector: Arc<MprisStateProjector>,
    adapter: SessionEventAdapter,
    slot: SubscriptionSlot,
    state: Property<LinkState>,
    settings: SubscriptionSettings,
}

impl SubscriptionManager {
    /// Manager feeding remote events from `client` into `projector`
    pub fn new(
        client: Arc<dyn SessionClient>,
        projector: Arc<MprisStateProjector>,
        settings: SubscriptionSettings,
    ) -> Self {
        Self {
            client,
            adapter: SessionEventAdapter::new(Arc::clone(&projector)),
            projector,
            slot: SubscriptionSlot::new(),
            state: Property::new(LinkState::Disconnected),
            settings,
        }
    }

    /// Keep the link up until `shutdown` is cancelled.
    ///
    /// On return the handle is released, the projector is disconnected and
    /// the link state is `Disconnected`.
    ///
    /// # Errors
    /// Returns `BridgeError::Startup` when `initial_attempts` consecutive
    /// attempts fail before the first successful subscription
    #[instrument(skip_all)]
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut backoff = self.settings.backoff.clone();
        let mut ever_subscribed = false;
        let mut attempt = 0_u32;

        while !shutdown.is_cancelled() {
            attempt = attempt.saturating_add(1);
            self.transition(LinkState::Connecting { attempt });

            let connected = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                result = self.connect() => result,
            };

            match connected {
                Ok(mut handle) => {
                    backoff.reset();
                    ever_subscribed = true;
                    attempt = 0;
                    self.transition(LinkState::Subscribed);
                    info!("subscribed to remote session");

                    match self.pump(&mut handle, &shutdown).await {
                        LinkEnd::Shutdown => {
                            self.shut_down(Some(handle)).await;
                            return Ok(());
                        }
                        LinkEnd::Dropped(reason) => {
                            warn!(reason, "remote session link dropped");
                            self.projector.disconnected_state().await;
                            self.release(handle).await;
                            self.transition(LinkState::Disconnected);
                        }
                    }
                }
                Err(err) => {
                    warn!(attempt, error = %err, "connection attempt failed");
                    self.transition(LinkState::Disconnected);

                    if let Some(limit) = self.settings.initial_attempts {
                        if !ever_subscribed && attempt >= limit {
                            error!(attempts = attempt, "giving up on initial connection");
                            self.shut_down(None).await;
                            return Err(BridgeError::Startup(format!(
                                "remote session unreachable after {attempt} attempts: {err}"
                            )));
                        }
                    }
                }
            }

            let delay = backoff.next_delay();
            debug!(?delay, "waiting before reconnecting");
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                () = sleep(delay) => {}
            }
        }

        self.shut_down(None).await;
        Ok(())
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state.get()
    }

    /// Stream of link states, starting with the current one
    pub fn watch_state(&self) -> impl Stream<Item = LinkState> + Send + use<> {
        self.state.watch()
    }

    /// Number of live subscription handles (0 or 1)
    pub fn live_subscriptions(&self) -> usize {
        self.slot.live()
    }

    /// Adapter counters: accepted and dropped events
    pub fn event_counts(&self) -> (u64, u64) {
        (self.adapter.accepted(), self.adapter.dropped())
    }

    async fn connect(&self) -> Result<SubscriptionHandle> {
        let acquire = self.slot.acquire(Arc::clone(&self.client));
        match timeout(self.settings.connect_timeout, acquire).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::remote(
                "connect",
                format!("timed out after {:?}", self.settings.connect_timeout),
            )),
        }
    }

    async fn pump(&self, handle: &mut SubscriptionHandle, shutdown: &CancellationToken) -> LinkEnd {
        loop {
            let wait = tokio::select! {
                biased;
                () = shutdown.cancelled() => return LinkEnd::Shutdown,
                wait = self.next_message(handle) => wait,
            };

            match wait {
                Wait::Message(raw) => {
                    if self.adapter.handle(raw).await == Disposition::SessionEnded {
                        return LinkEnd::Dropped("session ended");
                    }
                }
                Wait::Closed => return LinkEnd::Dropped("stream ended"),
                Wait::Silent => return LinkEnd::Dropped("liveness timeout"),
            }
        }
    }

    async fn next_message(&self, handle: &mut SubscriptionHandle) -> Wait {
        let next = match self.settings.liveness_timeout {
            Some(window) => match timeout(window, handle.next_event()).await {
                Ok(next) => next,
                Err(_) => return Wait::Silent,
            },
            None => handle.next_event().await,
        };

        next.map_or(Wait::Closed, Wait::Message)
    }

    async fn release(&self, handle: SubscriptionHandle) {
        match timeout(self.settings.shutdown_grace, handle.release()).await {
            Ok(Ok(())) => debug!("subscription released"),
            Ok(Err(err)) => warn!(error = %err, "disconnect failed, subscription released anyway"),
            Err(_) => warn!(
                grace = ?self.settings.shutdown_grace,
                "disconnect did not finish in time, subscription force-released"
            ),
        }
    }

    async fn shut_down(&self, handle: Option<SubscriptionHandle>) {
        self.transition(LinkState::ShuttingDown);
        self.projector.disconnected_state().await;

        if let Some(handle) = handle {
            self.release(handle).await;
        }

        self.transition(LinkState::Disconnected);
        info!("subscription manager stopped");
    }

    fn transition(&self, next: LinkState) {
        let applied = self.state.update(|current| {
            if current.can_transition_to(&next) {
                *current = next;
                (true, true)
            } else {
                (false, false)
            }
        });

        if applied {
            debug!(state = %next, "link state changed");
        } else {
            error!(from = %self.state.get(), to = %next, "ignoring illegal link state transition");
        }
    }
}
