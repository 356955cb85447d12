//! Unit tests for session event decoding and the event adapter
//!
//! Uses a sink that accepts every emission; state is checked through the
//! projector snapshot.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::events::capabilities_from;
use super::{Command, Disposition, EventDecodeError, RemoteCommand, SessionEvent, SessionEventAdapter};
use crate::services::mpris::{
    Capabilities, DbusFaultGuard, MprisProperty, MprisStateProjector, PlaybackState,
    PlaybackStatus, PropertySink,
};

struct AcceptingSink;

#[async_trait]
impl PropertySink for AcceptingSink {
    async fn properties_changed(
        &self,
        _state: &PlaybackState,
        _changed: &[MprisProperty],
    ) -> zbus::Result<()> {
        Ok(())
    }

    async fn seeked(&self, _position: Duration) -> zbus::Result<()> {
        Ok(())
    }
}

fn adapter() -> (SessionEventAdapter, Arc<MprisStateProjector>) {
    let projector = Arc::new(MprisStateProjector::new(
        Arc::new(AcceptingSink),
        DbusFaultGuard::default(),
    ));
    (SessionEventAdapter::new(Arc::clone(&projector)), projector)
}

mod decoding {
    use super::*;

    #[test]
    fn track_changed_with_missing_optionals() {
        let event = SessionEvent::decode(&json!({
            "type": "track_changed",
            "track_id": "abc",
            "title": "Song",
        }))
        .unwrap();

        assert_eq!(
            event,
            SessionEvent::TrackChanged {
                track_id: Some(Some("abc".to_string())),
                title: Some(Some("Song".to_string())),
                artists: None,
                album: None,
                duration_ms: None,
            }
        );
    }

    #[test]
    fn track_changed_null_differs_from_absent() {
        let event = SessionEvent::decode(&json!({
            "type": "track_changed",
            "album": null,
            "artists": null,
        }))
        .unwrap();

        let SessionEvent::TrackChanged {
            track_id,
            album,
            artists,
            ..
        } = event
        else {
            panic!("expected track_changed");
        };
        assert_eq!(track_id, None);
        assert_eq!(album, Some(None));
        assert_eq!(artists, Some(None));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = SessionEvent::decode(&json!({"type": "lyrics", "text": "la"})).unwrap_err();
        assert!(matches!(err, EventDecodeError::Malformed(_)));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let err = SessionEvent::decode(&json!({"type": "position_updated"})).unwrap_err();
        assert!(matches!(err, EventDecodeError::Malformed(_)));
    }

    #[test]
    fn volume_above_hundred_is_invalid() {
        let err = SessionEvent::decode(&json!({
            "type": "controller_state",
            "supported_commands": [],
            "volume": 101,
        }))
        .unwrap_err();
        assert!(matches!(err, EventDecodeError::Invalid(_)));
    }

    #[test]
    fn unknown_command_names_are_accepted() {
        let event = SessionEvent::decode(&json!({
            "type": "controller_state",
            "supported_commands": ["play", "shuffle", "repeat_all"],
        }))
        .unwrap();

        let SessionEvent::ControllerState {
            supported_commands, ..
        } = event
        else {
            panic!("expected controller_state");
        };
        assert_eq!(
            supported_commands,
            vec![RemoteCommand::Play, RemoteCommand::Other, RemoteCommand::Other]
        );
    }

    #[test]
    fn command_names_map_to_capabilities() {
        let caps = capabilities_from(&[
            RemoteCommand::Play,
            RemoteCommand::Pause,
            RemoteCommand::Stop,
            RemoteCommand::Next,
            RemoteCommand::Volume,
        ]);
        assert_eq!(
            caps,
            Capabilities::PLAY | Capabilities::PAUSE | Capabilities::GO_NEXT
        );

        assert!(capabilities_from(&[RemoteCommand::Stop, RemoteCommand::Mute]).is_empty());
    }

    #[test]
    fn session_ended_has_no_delta() {
        let event = SessionEvent::decode(&json!({"type": "session_ended"})).unwrap();
        assert!(event.into_delta().is_none());
    }

    #[test]
    fn commands_serialize_tagged_by_command() {
        assert_eq!(
            serde_json::to_value(Command::Play).unwrap(),
            json!({"command": "play"})
        );
        assert_eq!(
            serde_json::to_value(Command::SetPosition {
                track_id: "t1".to_string(),
                position_micros: 5_000_000,
            })
            .unwrap(),
            json!({"command": "set_position", "track_id": "t1", "position_micros": 5_000_000})
        );
    }
}

mod event_adapter {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn status_event_is_applied() {
        let (adapter, projector) = adapter();

        let disposition = adapter
            .handle(json!({"type": "status_changed", "status": "playing"}))
            .await;

        assert_eq!(
            disposition,
            Disposition::Applied(vec![MprisProperty::PlaybackStatus])
        );
        assert_eq!(projector.snapshot().status, PlaybackStatus::Playing);
        assert_eq!(adapter.accepted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_event_leaves_state_untouched() {
        let (adapter, projector) = adapter();
        let before = projector.snapshot();

        let disposition = adapter
            .handle(json!({"type": "status_changed", "status": "buffering"}))
            .await;

        assert_eq!(disposition, Disposition::Dropped);
        assert_eq!(projector.snapshot(), before);
        assert_eq!(adapter.dropped(), 1);
        assert_eq!(adapter.accepted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_volume_is_dropped() {
        let (adapter, projector) = adapter();

        let disposition = adapter
            .handle(json!({
                "type": "controller_state",
                "supported_commands": ["play"],
                "volume": 250,
            }))
            .await;

        assert_eq!(disposition, Disposition::Dropped);
        assert!(projector.snapshot().capabilities.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn session_ended_is_reported() {
        let (adapter, projector) = adapter();
        adapter
            .handle(json!({"type": "status_changed", "status": "paused"}))
            .await;

        let disposition = adapter
            .handle(json!({"type": "session_ended", "reason": "host left"}))
            .await;

        assert_eq!(disposition, Disposition::SessionEnded);
        assert_eq!(projector.snapshot().status, PlaybackStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn events_apply_in_receipt_order() {
        let (adapter, projector) = adapter();

        for status in ["playing", "paused", "stopped", "playing"] {
            adapter
                .handle(json!({"type": "status_changed", "status": status}))
                .await;
        }

        assert_eq!(projector.snapshot().status, PlaybackStatus::Playing);
        assert_eq!(adapter.accepted(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn metadata_refresh_keeps_fields_it_leaves_out() {
        let (adapter, projector) = adapter();

        adapter
            .handle(json!({
                "type": "track_changed",
                "track_id": "T1",
                "title": "Song",
                "artists": ["A"],
                "album": "Alb",
                "duration_ms": 200_000,
            }))
            .await;
        adapter
            .handle(json!({"type": "track_changed", "track_id": "T1", "title": "Song (live)"}))
            .await;

        let track = projector.snapshot().track;
        assert_eq!(track.title.as_deref(), Some("Song (live)"));
        assert_eq!(track.artists, vec!["A".to_string()]);
        assert_eq!(track.album.as_deref(), Some("Alb"));
        assert_eq!(track.length, Some(Duration::from_secs(200)));

        adapter
            .handle(json!({"type": "track_changed", "track_id": "T1", "album": null}))
            .await;
        assert_eq!(projector.snapshot().track.album, None);
    }

    #[tokio::test(start_paused = true)]
    async fn new_track_id_replaces_the_whole_track() {
        let (adapter, projector) = adapter();

        adapter
            .handle(json!({
                "type": "track_changed",
                "track_id": "T1",
                "title": "Song",
                "artists": ["A"],
                "album": "Alb",
                "duration_ms": 200_000,
            }))
            .await;
        adapter
            .handle(json!({"type": "position_updated", "position_ms": 60_000}))
            .await;
        adapter
            .handle(json!({"type": "track_changed", "track_id": "T2", "title": "Next"}))
            .await;

        let state = projector.snapshot();
        assert_eq!(state.track.track_id.as_deref(), Some("T2"));
        assert_eq!(state.track.title.as_deref(), Some("Next"));
        assert!(state.track.artists.is_empty());
        assert_eq!(state.track.album, None);
        assert_eq!(state.track.length, None);
        assert_eq!(state.position, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn mixed_events_fold_in_receipt_order() {
        let (adapter, projector) = adapter();

        let events = [
            json!({
                "type": "track_changed",
                "track_id": "T1",
                "title": "Song",
                "artists": ["A"],
                "album": "Alb",
                "duration_ms": 200_000,
            }),
            json!({
                "type": "controller_state",
                "supported_commands": ["play", "pause", "seek"],
                "volume": 50,
            }),
            json!({"type": "status_changed", "status": "playing"}),
            json!({"type": "position_updated", "position_ms": 30_000}),
            json!({"type": "track_changed", "track_id": "T1", "title": "Song (live)"}),
            json!({"type": "controller_state", "supported_commands": ["pause"], "muted": true}),
            json!({"type": "status_changed", "status": "paused"}),
        ];
        for event in events {
            assert!(matches!(
                adapter.handle(event).await,
                Disposition::Applied(_)
            ));
        }

        let state = projector.snapshot();
        assert_eq!(state.status, PlaybackStatus::Paused);
        assert_eq!(state.track.track_id.as_deref(), Some("T1"));
        assert_eq!(state.track.title.as_deref(), Some("Song (live)"));
        assert_eq!(state.track.album.as_deref(), Some("Alb"));
        assert_eq!(state.track.length, Some(Duration::from_secs(200)));
        assert_eq!(state.position, Duration::from_secs(30));
        assert_eq!(state.capabilities, Capabilities::PAUSE);
        assert_eq!(state.effective_volume(), 0.0);
        assert_eq!(adapter.accepted(), 7);
        assert_eq!(adapter.dropped(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn controller_state_sets_capabilities_and_volume() {
        let (adapter, projector) = adapter();

        adapter
            .handle(json!({
                "type": "controller_state",
                "supported_commands": ["play", "pause", "seek"],
                "volume": 40,
                "muted": false,
            }))
            .await;

        let state = projector.snapshot();
        assert_eq!(
            state.capabilities,
            Capabilities::PLAY | Capabilities::PAUSE | Capabilities::SEEK
        );
        assert!((state.effective_volume() - 0.4).abs() < f64::EPSILON);
    }
}
