//! Image transcoding port.

use crate::domain::entities::{DerivativeRequest, DerivativeResult, ImageFormat};
use crate::domain::errors::ImageError;

/// Port for CPU-bound decode, resize and encode work.
///
/// Calls block; async callers run them on a blocking thread.
pub trait TranscoderPort: Send + Sync {
    /// Produces the derivative described by `request` from encoded source bytes.
    fn transcode(
        &self,
        source: &[u8],
        request: &DerivativeRequest,
    ) -> Result<DerivativeResult, ImageError>;

    /// Re-encodes source bytes into `format` without resizing.
    fn convert(&self, source: &[u8], format: ImageFormat) -> Result<DerivativeResult, ImageError>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;

    use super::*;

    /// Transcoder that echoes a tagged payload and counts invocations.
    #[derive(Default)]
    pub struct CountingTranscoder {
        transcodes: AtomicUsize,
        conversions: AtomicUsize,
        fail: bool,
    }

    impl CountingTranscoder {
        /// Creates a transcoder that always succeeds.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a transcoder that always fails to decode.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Number of `transcode` calls so far.
        pub fn transcodes(&self) -> usize {
            self.transcodes.load(Ordering::SeqCst)
        }

        /// Number of `convert` calls so far.
        pub fn conversions(&self) -> usize {
            self.conversions.load(Ordering::SeqCst)
        }
    }

    impl TranscoderPort for CountingTranscoder {
        fn transcode(
            &self,
            source: &[u8],
            request: &DerivativeRequest,
        ) -> Result<DerivativeResult, ImageError> {
            let call = self.transcodes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(ImageError::unsupported("mock decode failure"));
            }
            let format = request.output_format();
            let mut payload = source.to_vec();
            payload.extend_from_slice(format!("#{call}").as_bytes());
            Ok(DerivativeResult::new(Bytes::from(payload), format))
        }

        fn convert(
            &self,
            source: &[u8],
            format: ImageFormat,
        ) -> Result<DerivativeResult, ImageError> {
            self.conversions.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ImageError::encoding(format.to_string(), "mock failure"));
            }
            let mut payload = format.extension().as_bytes().to_vec();
            payload.extend_from_slice(source);
            Ok(DerivativeResult::new(Bytes::from(payload), format))
        }
    }
}
