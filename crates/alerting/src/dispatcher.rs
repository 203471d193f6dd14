//! Alert dispatch.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use detector::{has_fire, CanonicalDetection};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cooldown::CooldownState;
use crate::message::{AlertMessage, AlertSource};
use crate::transport::AlertTransport;
use crate::AlertConfig;

/// Gates fire alerts through the cooldown and hands accepted ones to a
/// background delivery task.
///
/// The dispatch methods never block on the network. An accepted alert is
/// queued for the worker and counts against the cooldown immediately,
/// whether or not delivery later succeeds. With an unconfigured transport
/// the gate still operates; only the network call is skipped.
pub struct AlertDispatcher {
    sender: mpsc::UnboundedSender<AlertMessage>,
    state: Mutex<CooldownState>,
    configured: bool,
}

impl AlertDispatcher {
    /// Spawns the delivery worker on the current runtime and returns the
    /// dispatcher in front of it.
    pub fn spawn<T: AlertTransport>(transport: T, config: AlertConfig) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AlertMessage>();
        let configured = transport.is_configured();
        let cooldown = Duration::from_secs(config.cooldown_seconds);

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if let Err(e) = transport.send(message).await {
                    warn!("alert delivery failed: {e}");
                }
            }
            debug!("alert delivery worker stopped");
        });

        Self {
            sender,
            state: Mutex::new(CooldownState::new(cooldown)),
            configured,
        }
    }

    /// Dispatches a fire alert when the detections contain fire and the
    /// cooldown allows it. Returns whether a dispatch was initiated.
    pub fn maybe_alert(&self, detections: &[CanonicalDetection], source: AlertSource) -> bool {
        self.maybe_alert_inner(detections, source, None)
    }

    /// Like [`maybe_alert`](Self::maybe_alert), attaching an annotated
    /// snapshot to the outbound message.
    pub fn maybe_alert_with_snapshot(
        &self,
        detections: &[CanonicalDetection],
        source: AlertSource,
        jpeg: Vec<u8>,
    ) -> bool {
        self.maybe_alert_inner(detections, source, Some(jpeg))
    }

    /// Dispatches the aggregated summary for a processed video, subject to
    /// the same cooldown.
    pub fn alert_video_summary(&self, hazard_frames: u64, total_frames: u64) -> bool {
        self.dispatch(
            AlertMessage::video_summary(hazard_frames, total_frames),
            Instant::now(),
        )
    }

    fn maybe_alert_inner(
        &self,
        detections: &[CanonicalDetection],
        source: AlertSource,
        snapshot: Option<Vec<u8>>,
    ) -> bool {
        if !has_fire(detections) {
            return false;
        }

        let mut message = AlertMessage::hazard(source);
        if let Some(jpeg) = snapshot {
            message = message.with_attachment(jpeg);
        }
        self.dispatch(message, Instant::now())
    }

    fn dispatch(&self, message: AlertMessage, now: Instant) -> bool {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.is_ready(now) {
            debug!(
                remaining_s = state.remaining(now).as_secs(),
                "alert suppressed by cooldown"
            );
            return false;
        }
        state.record_dispatch(now);
        drop(state);

        if !self.configured {
            warn!("alert transport unconfigured, skipping delivery: {}", message.text);
            return true;
        }

        info!("dispatching alert: {}", message.text);
        if self.sender.send(message).is_err() {
            warn!("alert delivery worker is gone");
        }
        true
    }
}
