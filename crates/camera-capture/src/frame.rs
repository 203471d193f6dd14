//! Video frame type and raster conversions

use image::RgbImage;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds since the Unix epoch)
    pub timestamp_ns: u64,
    /// Frame sequence number within a session
    pub sequence: u64,
}

impl Frame {
    /// Create a new frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Number of pixels in the frame
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Copy the raster into an `image::RgbImage`.
    ///
    /// Returns `None` when the buffer length does not match the declared
    /// dimensions.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Build a frame from an `image::RgbImage`, keeping the given timing
    /// metadata.
    pub fn from_rgb_image(img: RgbImage, timestamp_ns: u64, sequence: u64) -> Self {
        let width = img.width();
        let height = img.height();
        Self {
            data: img.into_raw(),
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(w: u32, h: u32, rgb: [u8; 3]) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..(w * h) {
            data.extend_from_slice(&rgb);
        }
        Frame::new(data, w, h, 0, 0)
    }

    #[test]
    fn test_get_pixel_in_and_out_of_bounds() {
        let frame = solid_frame(4, 3, [10, 20, 30]);
        assert_eq!(frame.get_pixel(0, 0), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(3, 2), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(4, 0), None);
        assert_eq!(frame.get_pixel(0, 3), None);
    }

    #[test]
    fn test_rgb_image_round_trip_preserves_dimensions() {
        let frame = solid_frame(8, 5, [1, 2, 3]);
        let img = frame.to_rgb_image().unwrap();
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 5);

        let back = Frame::from_rgb_image(img, frame.timestamp_ns, frame.sequence);
        assert_eq!(back.width, frame.width);
        assert_eq!(back.height, frame.height);
        assert_eq!(back.data, frame.data);
    }

    #[test]
    fn test_to_rgb_image_rejects_short_buffer() {
        let frame = Frame::new(vec![0u8; 10], 4, 3, 0, 0);
        assert!(frame.to_rgb_image().is_none());
    }
}
