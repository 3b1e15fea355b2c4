use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::ArrayView3;
use crate::error::EngineError;

/// A caller-owned RGB frame.
///
/// Channel order is always RGB; the appearance heuristics rely on it.
#[derive(Debug, Clone, Default)]
pub struct PpeFrame {
    pub image: RgbImage,
}

impl std::ops::Deref for PpeFrame {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl std::ops::DerefMut for PpeFrame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.image
    }
}

impl From<DynamicImage> for PpeFrame {
    fn from(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }
}

impl From<GrayImage> for PpeFrame {
    fn from(image: GrayImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
        }
    }
}

impl From<RgbImage> for PpeFrame {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

impl From<RgbaImage> for PpeFrame {
    fn from(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::from(image).to_rgb8(),
        }
    }
}

impl From<PpeFrame> for RgbImage {
    fn from(frame: PpeFrame) -> Self {
        frame.into_rgb8()
    }
}

impl PpeFrame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Builds a frame from a packed `height x width x channels` byte buffer.
    pub fn from_raw(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self, EngineError> {
        if channels != 3 {
            return Err(EngineError::MalformedFrame(format!(
                "expected 3 interleaved RGB channels, got {}", channels
            )));
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(EngineError::MalformedFrame(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(), width, height, channels, expected
            )));
        }
        RgbImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or_else(|| EngineError::MalformedFrame("buffer does not fit frame dimensions".to_string()))
    }

    /// Builds a frame from an array shaped `(height, width, 3)`.
    pub fn from_array(pixels: ArrayView3<u8>) -> Result<Self, EngineError> {
        let (height, width, channels) = pixels.dim();
        let data: Vec<u8> = pixels.iter().copied().collect();
        Self::from_raw(width as u32, height as u32, channels, data)
    }

    /// Rejects frames the engine cannot reason about.
    pub fn validate(&self) -> Result<(), EngineError> {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::MalformedFrame(format!("empty frame {}x{}", width, height)));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Length of the image diagonal in pixels.
    pub fn diagonal(&self) -> f32 {
        let (w, h) = (self.width() as f32, self.height() as f32);
        (w * w + h * h).sqrt()
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image
    }
}
