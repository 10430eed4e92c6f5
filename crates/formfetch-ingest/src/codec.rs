//! Image codec seam
//!
//! The format normalizer talks to codecs through the narrow [`ImageCodec`]
//! trait: decode bytes into an RGB raster, encode a raster as JPEG at a
//! fixed quality. [`StdCodec`] is the production implementation on top of
//! the `image` crate; HEIF decoding needs the system libheif and sits behind
//! the `heif` cargo feature.

use crate::artifact::ArtifactFormat;
use thiserror::Error;

/// Codec failure
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Decoded raster image, 8-bit RGB, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Narrow codec interface consumed by the format normalizer
pub trait ImageCodec {
    /// Decode image bytes, using the artifact format as a hint
    fn decode(&self, bytes: &[u8], format: &ArtifactFormat) -> Result<RawImage, CodecError>;

    /// Encode a raster as JPEG at the given quality (1-100)
    fn encode_jpeg(&self, image: &RawImage, quality: u8) -> Result<Vec<u8>, CodecError>;
}

/// Production codec backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct StdCodec;

impl StdCodec {
    #[cfg(feature = "heif")]
    fn decode_heif(&self, bytes: &[u8]) -> Result<RawImage, CodecError> {
        use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

        let lib_heif = LibHeif::new();
        let context = HeifContext::read_from_bytes(bytes)
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        let handle = context
            .primary_image_handle()
            .map_err(|e| CodecError::Decode(e.to_string()))?;
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| CodecError::Decode("missing interleaved RGB plane".to_string()))?;

        // Rows are stride-padded; repack into a tight buffer.
        let width = plane.width;
        let height = plane.height;
        let row_bytes = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * plane.stride;
            pixels.extend_from_slice(&plane.data[start..start + row_bytes]);
        }

        Ok(RawImage {
            width,
            height,
            pixels,
        })
    }

    #[cfg(not(feature = "heif"))]
    fn decode_heif(&self, _bytes: &[u8]) -> Result<RawImage, CodecError> {
        Err(CodecError::Unsupported(
            "HEIF decoding requires the `heif` feature (libheif)".to_string(),
        ))
    }
}

impl ImageCodec for StdCodec {
    fn decode(&self, bytes: &[u8], format: &ArtifactFormat) -> Result<RawImage, CodecError> {
        let dynamic = match format {
            ArtifactFormat::Heif => return self.decode_heif(bytes),
            ArtifactFormat::Jpeg => {
                image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            },
            ArtifactFormat::Png => {
                image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            },
            ArtifactFormat::Tiff => {
                image::load_from_memory_with_format(bytes, image::ImageFormat::Tiff)
            },
            ArtifactFormat::Other(_) => image::load_from_memory(bytes),
        }
        .map_err(|e| CodecError::Decode(e.to_string()))?;

        let rgb = dynamic.to_rgb8();
        Ok(RawImage {
            width: rgb.width(),
            height: rgb.height(),
            pixels: rgb.into_raw(),
        })
    }

    fn encode_jpeg(&self, image: &RawImage, quality: u8) -> Result<Vec<u8>, CodecError> {
        let buffer = image::RgbImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| {
                CodecError::Encode("pixel buffer does not match dimensions".to_string())
            })?;

        let mut encoded = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut encoded, quality);
        image::DynamicImage::ImageRgb8(buffer)
            .write_with_encoder(encoder)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(encoded)
    }
}
