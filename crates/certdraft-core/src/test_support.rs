//! Fixtures shared by unit tests.

use crate::layers::encode_data_uri;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Build a PNG data URI of a solid-color image.
pub(crate) fn png_data_uri(width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    encode_data_uri(&bytes)
}
