//! Lossless image encode and decode of pixel buffers, plus the data URLs projects embed them in.

use base64::Engine;

use crate::{
    buffer::{PixelBuffer, Snapshot},
    color::Color,
};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("not a base64 data URL")]
    NotDataUrl,
    #[error("bad base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("undecodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode the full contents of `buffer` as an 8-bit RGBA PNG.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    encode_rgba8(buffer.size(), buffer.as_bytes())
}

/// Encode a committed history state as an 8-bit RGBA PNG.
pub fn encode_snapshot_png(snapshot: &Snapshot) -> Result<Vec<u8>, EncodeError> {
    encode_rgba8(snapshot.size(), bytemuck::cast_slice(snapshot.pixels()))
}

fn encode_rgba8([width, height]: [u32; 2], data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
        writer.finish()?;
    }
    Ok(bytes)
}

/// Decode any image format the decoder understands into a fresh `width` x `height` buffer.
///
/// The image is placed at the top-left. Parts outside the buffer are cropped, parts of the buffer
/// the image does not reach stay transparent.
pub fn decode_into(bytes: &[u8], width: u32, height: u32) -> Result<PixelBuffer, DecodeError> {
    let decoded = image::load_from_memory(bytes)?.into_rgba8();
    let (image_width, image_height) = decoded.dimensions();
    let pixels: Vec<Color> = bytemuck::cast_slice(decoded.as_raw()).to_vec();

    let mut buffer = PixelBuffer::new(width, height);
    // Length always matches, it came from an image of exactly these dimensions.
    if let Some(image) = PixelBuffer::from_pixels(image_width, image_height, pixels) {
        buffer.copy_from(&image, [0, 0]);
    }
    Ok(buffer)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
#[must_use]
pub fn to_data_url(png: &[u8]) -> String {
    let mut url = String::from(PNG_DATA_URL_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(png, &mut url);
    url
}

/// Extract the payload of a base64 data URL. Any media type is accepted, the bytes are sniffed
/// at decode time.
pub fn from_data_url(url: &str) -> Result<Vec<u8>, DecodeError> {
    let (header, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(DecodeError::NotDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(DecodeError::NotDataUrl);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}
