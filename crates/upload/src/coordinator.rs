//! Upload coordinator.
//!
//! Owns the lifecycle of one upload attempt: it starts the transport, feeds
//! progress into the caller's [`UploadState`], races completion against
//! cancellation, and classifies whatever settles first into exactly one
//! [`UploadOutcome`].
//!
//! The whole attempt runs inside [`UploadCoordinator::submit`]; nothing is
//! spawned. The transport future lives only inside the race, so a winning
//! cancellation drops it and with it the in-flight request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reelsend_transfer::{TransferProgress, VideoFile};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::UploaderConfig;
use crate::error::UploadError;
use crate::http::HttpTransport;
use crate::notice::GENERIC_REJECTION;
use crate::transport::{TransportError, TransportResponse, UploadTransport};
use crate::types::{UploadEvent, UploadOutcome, UploadRequest, UploadState};

/// Slot holding the cancellation token of the attempt in flight.
type ActiveSlot = Arc<Mutex<Option<CancellationToken>>>;

fn lock(slot: &ActiveSlot) -> MutexGuard<'_, Option<CancellationToken>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates single-file video uploads.
pub struct UploadCoordinator<T: UploadTransport> {
    transport: T,
    config: UploaderConfig,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    active: ActiveSlot,
}

impl UploadCoordinator<HttpTransport> {
    /// Creates a coordinator that uploads over HTTP to `config.endpoint`.
    pub fn http(config: UploaderConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: UploadTransport> UploadCoordinator<T> {
    /// Creates a coordinator on top of an arbitrary transport.
    pub fn new(transport: T, config: UploaderConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        Self {
            transport,
            config,
            events_tx,
            events_rx: Some(events_rx),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// Sending never waits on the receiver. Progress events stop while the
    /// channel has a single free slot left, which stays reserved for the
    /// terminal event; events that do not fit are dropped.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Returns a handle that cancels whichever attempt is in flight.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            active: Arc::clone(&self.active),
        }
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Returns `true` while an attempt is in flight.
    pub fn is_uploading(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Selects a file, or removes the selection with `None`.
    ///
    /// Not allowed while uploading. A file whose known content type is
    /// outside the accepted prefix is rejected and the state is left as-is.
    pub fn select_file(
        &self,
        state: &mut UploadState,
        file: Option<VideoFile>,
    ) -> Result<(), UploadError> {
        if state.is_uploading() {
            return Err(UploadError::Busy);
        }

        let Some(file) = file else {
            debug!("video file removed");
            *state = UploadState::Idle;
            return Ok(());
        };

        if !self.config.accepts(file.content_type()) {
            let err = UploadError::UnsupportedType(
                file.content_type().unwrap_or_default().to_string(),
            );
            warn!(file = %file.name(), error = %err, "video file rejected");
            self.emit_terminal(UploadEvent::Invalid(err.clone()));
            return Err(err);
        }

        info!(file = %file.name(), size = file.size(), "video file selected");
        *state = UploadState::FileSelected(file);
        Ok(())
    }

    /// Uploads the selected file to `target_id` and waits for the outcome.
    ///
    /// Without a selected file this fails with [`UploadError::NoFileSelected`]
    /// and no request is made. Otherwise the state moves to `Uploading`,
    /// follows progress, and ends `Idle` whatever the outcome. The outcome is
    /// also emitted as [`UploadEvent::Finished`], after every progress event
    /// of the attempt.
    ///
    /// Dropping the returned future aborts the request; the state record is
    /// then left as it was at the drop point.
    pub async fn submit(
        &self,
        state: &mut UploadState,
        target_id: impl Into<String>,
    ) -> Result<UploadOutcome, UploadError> {
        let file = match state {
            UploadState::FileSelected(file) => file.clone(),
            UploadState::Idle => {
                let err = UploadError::NoFileSelected;
                warn!("upload submitted without a file");
                self.emit_terminal(UploadEvent::Invalid(err.clone()));
                return Err(err);
            }
            UploadState::Uploading { .. } => return Err(UploadError::Busy),
        };

        let scope = AttemptScope::enter(&self.active)?;
        let request = UploadRequest {
            file,
            target_id: target_id.into(),
        };
        info!(
            file = %request.file.name(),
            size = request.file.size(),
            target = %request.target_id,
            "upload started"
        );

        *state = UploadState::Uploading { progress: 0 };
        self.emit_progress(0);

        let outcome = self.run_attempt(state, request, scope.token()).await;

        // Leave the scope before reporting so a late cancel() is a no-op.
        drop(scope);
        *state = UploadState::Idle;
        log_outcome(&outcome);
        self.emit_terminal(UploadEvent::Finished(outcome.clone()));

        Ok(outcome)
    }

    /// Cancels the attempt in flight. Returns `false` if nothing is uploading.
    pub fn cancel(&self) -> bool {
        self.canceller().cancel()
    }

    /// Races the transport against cancellation while following progress.
    async fn run_attempt(
        &self,
        state: &mut UploadState,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> UploadOutcome {
        let total = request.file.size();
        let (progress_tx, mut progress_rx) = watch::channel(TransferProgress::new(0, Some(total)));
        let mut transport = self.transport.send(request, progress_tx, cancel.clone());
        let mut progress_open = true;

        // Cancellation is polled first: when both are ready, it wins.
        let settled = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break None,
                result = &mut transport => break Some(result),
                changed = progress_rx.changed(), if progress_open => match changed {
                    Ok(()) => {
                        let tick = *progress_rx.borrow_and_update();
                        self.accept_progress(state, tick);
                    }
                    Err(_) => progress_open = false,
                },
            }
        };
        // Aborts the request if it is still in flight.
        drop(transport);

        match settled {
            None => UploadOutcome::Cancelled,
            Some(_) if cancel.is_cancelled() => UploadOutcome::Cancelled,
            Some(Err(TransportError::Cancelled)) => UploadOutcome::Cancelled,
            Some(Err(e)) => UploadOutcome::UnexpectedError(e.to_string()),
            Some(Ok(response)) => {
                // Ticks published before the response settled still count.
                let tick = *progress_rx.borrow();
                self.accept_progress(state, tick);
                classify_response(&response)
            }
        }
    }

    /// Applies a progress measurement to the state. Measurements that are
    /// not computable, or that do not change the percentage, are ignored.
    fn accept_progress(&self, state: &mut UploadState, tick: TransferProgress) {
        let Some(percent) = tick.percent() else {
            return;
        };
        if let UploadState::Uploading { progress } = state {
            if *progress != percent {
                *progress = percent;
                self.emit_progress(percent);
            }
        }
    }

    /// Sends a progress event unless only the terminal event's slot is left.
    fn emit_progress(&self, percent: u8) {
        if self.events_tx.capacity() <= 1 {
            debug!(percent, "progress event dropped, event channel full");
            return;
        }
        if let Err(e) = self.events_tx.try_send(UploadEvent::Progress(percent)) {
            debug!(percent, error = %e, "progress event dropped");
        }
    }

    /// Sends a terminal event without waiting for the receiver.
    fn emit_terminal(&self, event: UploadEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            debug!(error = %e, "terminal event dropped");
        }
    }
}

/// Cancels the attempt in flight on an [`UploadCoordinator`].
///
/// Cheap to clone; hand one to whatever owns the cancel button.
#[derive(Clone)]
pub struct Canceller {
    active: ActiveSlot,
}

impl Canceller {
    /// Signals the in-flight attempt. Returns `false` if nothing is uploading.
    pub fn cancel(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(token) => {
                info!("upload cancellation requested");
                token.cancel();
                true
            }
            None => {
                debug!("cancel ignored, no upload in progress");
                false
            }
        }
    }
}

/// Owns the cancellation token of one attempt.
///
/// Installs the token in the coordinator's slot on entry; on drop cancels it
/// and clears the slot, so an attempt's token never outlives the attempt.
struct AttemptScope {
    slot: ActiveSlot,
    token: CancellationToken,
}

impl AttemptScope {
    fn enter(slot: &ActiveSlot) -> Result<Self, UploadError> {
        let mut active = lock(slot);
        if active.is_some() {
            return Err(UploadError::Busy);
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        Ok(Self {
            slot: Arc::clone(slot),
            token,
        })
    }

    fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for AttemptScope {
    fn drop(&mut self) {
        self.token.cancel();
        lock(&self.slot).take();
    }
}

/// Classifies a settled server response.
///
/// 2xx must carry a JSON body; anything else is a rejection whose message
/// is taken from the body's `message` field when present.
pub(crate) fn classify_response(response: &TransportResponse) -> UploadOutcome {
    if response.is_success() {
        return match serde_json::from_slice::<serde_json::Value>(&response.body) {
            Ok(_) => UploadOutcome::Success,
            Err(e) => UploadOutcome::UnexpectedError(format!(
                "invalid response body (status {}): {e}",
                response.status
            )),
        };
    }
    UploadOutcome::ServerRejected(rejection_message(&response.body))
}

/// Extracts a non-empty string `message` field, falling back to a generic text.
fn rejection_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| GENERIC_REJECTION.to_string())
}

fn log_outcome(outcome: &UploadOutcome) {
    match outcome {
        UploadOutcome::Success => info!("upload completed"),
        UploadOutcome::ServerRejected(message) => warn!(%message, "upload rejected by server"),
        UploadOutcome::Cancelled => info!("upload cancelled"),
        UploadOutcome::UnexpectedError(detail) => error!(error = %detail, "video upload error"),
    }
}
