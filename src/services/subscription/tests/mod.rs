//! Unit tests for the link state machine, backoff schedule and slot

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use serde_json::json;

use super::{Backoff, LinkState, SubscriptionSlot};
use crate::services::session::{Command, EventStream, SessionClient};
use crate::{BridgeError, Result};

mod link_state {
    use super::*;

    #[test]
    fn legal_transitions() {
        let connecting = LinkState::Connecting { attempt: 1 };

        assert!(LinkState::Disconnected.can_transition_to(&connecting));
        assert!(connecting.can_transition_to(&LinkState::Subscribed));
        assert!(connecting.can_transition_to(&LinkState::Disconnected));
        assert!(LinkState::Subscribed.can_transition_to(&LinkState::Disconnected));
        assert!(LinkState::ShuttingDown.can_transition_to(&LinkState::Disconnected));

        for from in [LinkState::Disconnected, connecting, LinkState::Subscribed] {
            assert!(from.can_transition_to(&LinkState::ShuttingDown));
        }
    }

    #[test]
    fn illegal_transitions() {
        let connecting = LinkState::Connecting { attempt: 2 };

        assert!(!LinkState::Disconnected.can_transition_to(&LinkState::Subscribed));
        assert!(!LinkState::Subscribed.can_transition_to(&connecting));
        assert!(!LinkState::ShuttingDown.can_transition_to(&connecting));
        assert!(!LinkState::ShuttingDown.can_transition_to(&LinkState::Subscribed));
        assert!(!LinkState::Disconnected.can_transition_to(&LinkState::Disconnected));
    }

    #[test]
    fn display_includes_attempt() {
        assert_eq!(
            LinkState::Connecting { attempt: 3 }.to_string(),
            "connecting (attempt 3)"
        );
    }
}

mod backoff {
    use super::*;

    #[test]
    fn grows_by_multiplier_and_caps() {
        let mut backoff =
            Backoff::new(Duration::from_millis(100), Duration::from_millis(1000), 2.0);

        let delays: Vec<_> = (0..6).map(|_| backoff.next_delay()).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
                Duration::from_millis(1000),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn never_decreases_before_reset() {
        let mut backoff = Backoff::new(Duration::from_millis(50), Duration::from_secs(30), 1.5);

        let mut previous = Duration::ZERO;
        for _ in 0..40 {
            let delay = backoff.next_delay();
            assert!(delay >= previous);
            assert!(delay <= Duration::from_secs(30));
            previous = delay;
        }
    }

    #[test]
    fn reset_starts_over() {
        let mut backoff =
            Backoff::new(Duration::from_millis(100), Duration::from_secs(5), 3.0);
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.failures(), 2);

        backoff.reset();

        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn huge_failure_counts_stay_at_max() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(60), 10.0);
        for _ in 0..1000 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
    }
}

mod slot {
    use super::*;

    #[derive(Default)]
    struct CountingClient {
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    #[async_trait]
    impl SessionClient for CountingClient {
        async fn connect(&self) -> Result<EventStream> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::pin(stream::iter(vec![json!({"type": "status_changed", "status": "playing"})])))
        }

        async fn disconnect(&self) -> Result<()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn send_command(&self, _command: Command) -> Result<()> {
            Ok(())
        }
    }

    struct RefusingClient;

    #[async_trait]
    impl SessionClient for RefusingClient {
        async fn connect(&self) -> Result<EventStream> {
            Err(BridgeError::remote("connect", "connection refused"))
        }

        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }

        async fn send_command(&self, _command: Command) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn release_disconnects_and_frees_slot() {
        let client = Arc::new(CountingClient::default());
        let slot = SubscriptionSlot::new();

        let mut handle = slot.acquire(client.clone()).await.unwrap();
        assert_eq!(slot.live(), 1);
        assert!(handle.next_event().await.is_some());
        assert!(handle.next_event().await.is_none());

        handle.release().await.unwrap();

        assert_eq!(slot.live(), 0);
        assert_eq!(client.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_for_release() {
        let client = Arc::new(CountingClient::default());
        let slot = SubscriptionSlot::new();

        let first = slot.acquire(client.clone()).await.unwrap();

        let waiting = {
            let slot = slot.clone();
            let client = client.clone();
            tokio::spawn(async move { slot.acquire(client).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());
        assert_eq!(client.connects.load(Ordering::SeqCst), 1);

        first.release().await.unwrap();

        let second = waiting.await.unwrap().unwrap();
        assert_eq!(slot.live(), 1);
        assert_eq!(client.connects.load(Ordering::SeqCst), 2);
        second.release().await.unwrap();
    }

    #[tokio::test]
    async fn dropped_handle_frees_slot_without_disconnect() {
        let client = Arc::new(CountingClient::default());
        let slot = SubscriptionSlot::new();

        let handle = slot.acquire(client.clone()).await.unwrap();
        drop(handle);

        assert_eq!(slot.live(), 0);
        assert_eq!(client.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_connect_returns_permit() {
        let slot = SubscriptionSlot::new();

        let result = slot.acquire(Arc::new(RefusingClient)).await;

        assert!(matches!(result, Err(BridgeError::RemoteSession { .. })));
        assert_eq!(slot.live(), 0);
    }
}
