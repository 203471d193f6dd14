//! Outbound alert payloads.

/// Where the triggering detection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    LiveFeed,
    StillImage,
    VideoFile,
}

/// A composed alert ready for delivery.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub text: String,
    /// Annotated JPEG snapshot to send alongside the text.
    pub image: Option<Vec<u8>>,
}

impl AlertMessage {
    /// The standard fire alert for a source.
    pub fn hazard(source: AlertSource) -> Self {
        let text = match source {
            AlertSource::LiveFeed => "Fire detected on live camera feed",
            AlertSource::StillImage => "Fire detected in uploaded image",
            AlertSource::VideoFile => "Fire detected in video file",
        };
        Self {
            text: text.to_string(),
            image: None,
        }
    }

    /// The aggregated alert sent once after a whole video is processed.
    pub fn video_summary(hazard_frames: u64, total_frames: u64) -> Self {
        Self {
            text: format!(
                "Fire detected in processed video: {hazard_frames} of {total_frames} frames"
            ),
            image: None,
        }
    }

    pub fn with_attachment(mut self, jpeg: Vec<u8>) -> Self {
        self.image = Some(jpeg);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazard_text_names_the_source() {
        assert!(AlertMessage::hazard(AlertSource::LiveFeed)
            .text
            .contains("live camera feed"));
        assert!(AlertMessage::hazard(AlertSource::StillImage)
            .text
            .contains("uploaded image"));
        assert!(AlertMessage::hazard(AlertSource::VideoFile)
            .text
            .contains("video file"));
    }

    #[test]
    fn test_video_summary_reports_frame_counts() {
        let message = AlertMessage::video_summary(2, 10);
        assert_eq!(
            message.text,
            "Fire detected in processed video: 2 of 10 frames"
        );
        assert!(message.image.is_none());
    }

    #[test]
    fn test_attachment_is_carried() {
        let message = AlertMessage::hazard(AlertSource::LiveFeed).with_attachment(vec![1, 2, 3]);
        assert_eq!(message.image.as_deref(), Some(&[1u8, 2, 3][..]));
    }
}
