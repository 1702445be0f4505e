//! Image normalization contract and the JPEG recompression used before upload.

use crate::ProviderError;

pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpg", "image/jpeg", "image/png", "image/webp"];

pub fn is_supported_image_type(content_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&content_type)
}

pub trait ImageNormalizer: Send + Sync + std::fmt::Debug {
    fn normalize(&self, raw_bytes: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// MIME type of the bytes `normalize` produces.
    fn output_mime_type(&self) -> &'static str;
}

#[cfg(feature = "image-jpeg")]
pub use jpeg::JpegNormalizer;

#[cfg(feature = "image-jpeg")]
mod jpeg {
    use image::codecs::jpeg::JpegEncoder;

    use super::ImageNormalizer;
    use crate::ProviderError;

    #[derive(Debug, Clone, Copy)]
    pub struct JpegNormalizer {
        quality: u8,
    }

    impl Default for JpegNormalizer {
        fn default() -> Self {
            Self { quality: 50 }
        }
    }

    impl JpegNormalizer {
        pub fn new(quality: u8) -> Self {
            Self {
                quality: quality.clamp(1, 100),
            }
        }

        pub fn quality(&self) -> u8 {
            self.quality
        }
    }

    impl ImageNormalizer for JpegNormalizer {
        fn normalize(&self, raw_bytes: &[u8]) -> Result<Vec<u8>, ProviderError> {
            let decoded = image::load_from_memory(raw_bytes)
                .map_err(|err| ProviderError::invalid_request(format!("undecodable image: {err}")))?;
            let rgb = decoded.to_rgb8();

            let mut output = Vec::new();
            JpegEncoder::new_with_quality(&mut output, self.quality)
                .encode_image(&rgb)
                .map_err(|err| ProviderError::other(format!("jpeg encoding failed: {err}")))?;

            tracing::debug!(
                phase = "media",
                event = "normalized",
                input_bytes = raw_bytes.len(),
                output_bytes = output.len()
            );
            Ok(output)
        }

        fn output_mime_type(&self) -> &'static str {
            "image/jpeg"
        }
    }
}
