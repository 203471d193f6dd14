//! Live stream sessions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use alerting::AlertSource;
use camera_capture::FrameSource;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::process::run_frame_pass;
use crate::Pipeline;

/// Content type for the chunked stream body.
pub const STREAM_CONTENT_TYPE: &str = "multipart/x-mixed-replace; boundary=frame";

/// One live streaming session.
///
/// A dedicated producer thread pulls frames from the source, runs the
/// per-frame pass, fires per-frame alerts, and pushes framed JPEG chunks
/// into a bounded channel. The consumer awaits chunks with
/// [`next_chunk`](Self::next_chunk); calling [`close`](Self::close) or
/// dropping the session stops the producer and releases the device.
pub struct StreamSession {
    receiver: mpsc::Receiver<Vec<u8>>,
    shutdown: Arc<AtomicBool>,
}

impl Pipeline {
    /// Opens a streaming session over a frame source.
    pub fn stream_session(&self, mut source: Box<dyn FrameSource>) -> StreamSession {
        let session_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel::<Vec<u8>>(self.config.stream_buffer);
        let shutdown = Arc::new(AtomicBool::new(false));

        let model = self.model.clone();
        let dispatcher = self.dispatcher.clone();
        let labels = self.labels.clone();
        let config = self.config.clone();
        let shutdown_clone = shutdown.clone();

        thread::spawn(move || {
            info!(%session_id, "stream session started");
            let mut streamed = 0u64;

            while !shutdown_clone.load(Ordering::SeqCst) {
                let frame = match source.read_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        info!(%session_id, streamed, "stream source exhausted");
                        break;
                    }
                    Err(e) => {
                        warn!(%session_id, "stream read failed: {e}");
                        break;
                    }
                };

                let pass = run_frame_pass(&frame, model.as_ref(), &labels, &config);
                if pass.timed_out {
                    continue;
                }

                dispatcher.maybe_alert(&pass.detections, AlertSource::LiveFeed);

                let jpeg = match annotator::encode_jpeg(&pass.frame, config.jpeg_quality) {
                    Ok(jpeg) => jpeg,
                    Err(e) => {
                        warn!(%session_id, sequence = frame.sequence, "chunk encode failed: {e}");
                        continue;
                    }
                };

                if tx.blocking_send(frame_chunk(&jpeg)).is_err() {
                    debug!(%session_id, "stream consumer went away");
                    break;
                }
                streamed += 1;
            }

            source.close();
            info!(%session_id, streamed, "stream session ended");
        });

        StreamSession {
            receiver: rx,
            shutdown,
        }
    }
}

impl StreamSession {
    /// The next framed JPEG chunk, or `None` once the session has ended.
    pub async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().await
    }

    /// Signals the producer to stop. The device is released once the
    /// producer observes the flag; buffered chunks remain readable.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Frames one JPEG as a multipart chunk.
fn frame_chunk(jpeg: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(jpeg.len() + 48);
    chunk.extend_from_slice(b"--frame\r\nContent-Type: image/jpeg\r\n\r\n");
    chunk.extend_from_slice(jpeg);
    chunk.extend_from_slice(b"\r\n");
    chunk
}
