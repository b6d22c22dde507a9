//! Decode, resize and encode images.

use bytes::Bytes;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, Frame};
use tracing::{debug, warn};

use crate::domain::entities::{
    DerivativeRequest, DerivativeResult, ImageFormat, ResizeMode, SizePreset,
};
use crate::domain::errors::ImageError;
use crate::domain::ports::TranscoderPort;

/// Default lossy quality for WebP and JPEG output.
pub const DEFAULT_QUALITY: u8 = 80;

/// Transcoder backed by the `image` and `webp` crates.
#[derive(Debug, Clone, Copy)]
pub struct ImageTranscoder {
    webp_quality: f32,
    jpeg_quality: u8,
}

impl Default for ImageTranscoder {
    fn default() -> Self {
        Self {
            webp_quality: f32::from(DEFAULT_QUALITY),
            jpeg_quality: DEFAULT_QUALITY,
        }
    }
}

impl ImageTranscoder {
    /// Creates a transcoder with the default qualities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn decode(source: &[u8]) -> Result<DynamicImage, ImageError> {
        image::load_from_memory(source).map_err(|e| {
            warn!(error = %e, bytes = source.len(), "Failed to decode image");
            ImageError::unsupported(e.to_string())
        })
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Bytes, ImageError> {
        let encoded = match format {
            ImageFormat::Webp => self.encode_webp(image),
            ImageFormat::Png => encode_png(image),
            ImageFormat::Jpeg => self.encode_jpeg(image),
            ImageFormat::Gif => encode_gif(image),
        };

        encoded.map(Bytes::from).map_err(|message| {
            warn!(format = %format, error = %message, "Failed to encode image");
            ImageError::encoding(format.to_string(), message)
        })
    }

    fn encode_webp(&self, image: &DynamicImage) -> Result<Vec<u8>, String> {
        let rgba = image.to_rgba8();
        let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
        encoder
            .encode_simple(false, self.webp_quality)
            .map(|memory| memory.to_vec())
            .map_err(|e| format!("{e:?}"))
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>, String> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| e.to_string())?;
        Ok(buf)
    }
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
    image.write_with_encoder(encoder).map_err(|e| e.to_string())?;
    Ok(buf)
}

fn encode_gif(image: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buf);
        encoder
            .encode_frame(Frame::new(image.to_rgba8()))
            .map_err(|e| e.to_string())?;
    }
    Ok(buf)
}

/// Scales `target` by `side / base`, never returning zero.
fn proportional(side: u32, base: u32, target: u32) -> u32 {
    if base == 0 {
        return target.max(1);
    }
    let scaled = (u64::from(side) * u64::from(target) + u64::from(base) / 2) / u64::from(base);
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

/// Rejects output sizes above [`DerivativeRequest::MAX_DIMENSION`] on either side.
fn check_bounds(width: u32, height: u32) -> Result<(u32, u32), ImageError> {
    let max = DerivativeRequest::MAX_DIMENSION;
    if width > max || height > max {
        warn!(width, height, max, "Derivative size out of bounds");
        return Err(ImageError::invalid_argument(format!(
            "derivative size {width}x{height} exceeds {max} pixels per side"
        )));
    }
    Ok((width, height))
}

/// Applies preset or explicit sizing. Any non-empty preset wins over explicit
/// dimensions; unknown presets keep the original size.
///
/// # Errors
///
/// Returns `InvalidArgument` when the target, including a side derived
/// proportionally from the source aspect ratio, exceeds the size limit.
pub fn apply_sizing(
    image: DynamicImage,
    request: &DerivativeRequest,
) -> Result<DynamicImage, ImageError> {
    if let Some(width) = request.size.target_width() {
        let (w, h) = check_bounds(width, proportional(image.height(), image.width(), width))?;
        return Ok(image.resize_exact(w, h, FilterType::Lanczos3));
    }
    if request.size != SizePreset::None {
        // Re-encoding drops EXIF and other metadata.
        return Ok(image);
    }

    if request.resize_mode != ResizeMode::Crop && (request.width.is_some() || request.height.is_some())
    {
        debug!(mode = ?request.resize_mode, "Explicit sizing always crops from the centre");
    }

    let width = request.width.filter(|w| *w > 0);
    let height = request.height.filter(|h| *h > 0);
    let sized = match (width, height) {
        (Some(w), Some(h)) => {
            let (w, h) = check_bounds(w, h)?;
            image.resize_to_fill(w, h, FilterType::Lanczos3)
        }
        (Some(w), None) => {
            let (w, h) = check_bounds(w, proportional(image.height(), image.width(), w))?;
            image.resize_exact(w, h, FilterType::Lanczos3)
        }
        (None, Some(h)) => {
            let (w, h) = check_bounds(proportional(image.width(), image.height(), h), h)?;
            image.resize_exact(w, h, FilterType::Lanczos3)
        }
        (None, None) => image,
    };
    Ok(sized)
}

impl TranscoderPort for ImageTranscoder {
    fn transcode(
        &self,
        source: &[u8],
        request: &DerivativeRequest,
    ) -> Result<DerivativeResult, ImageError> {
        let decoded = Self::decode(source)?;
        let (src_w, src_h) = (decoded.width(), decoded.height());
        let sized = apply_sizing(decoded, request)?;
        let format = request.output_format();

        debug!(
            identifier = %request.identifier,
            size = request.size.as_str(),
            from = %format!("{src_w}x{src_h}"),
            to = %format!("{}x{}", sized.width(), sized.height()),
            format = %format,
            "Transcoding derivative"
        );

        let bytes = self.encode(&sized, format)?;
        Ok(DerivativeResult::new(bytes, format))
    }

    fn convert(&self, source: &[u8], format: ImageFormat) -> Result<DerivativeResult, ImageError> {
        let decoded = Self::decode(source)?;
        let bytes = self.encode(&decoded, format)?;
        Ok(DerivativeResult::new(bytes, format))
    }
}
