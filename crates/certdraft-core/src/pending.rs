//! Background image requests that complete asynchronously.
//!
//! A request remembers the canvas it was issued against. Decoding can run
//! anywhere; the result is only applied if that canvas is still current.

use crate::canvas::CanvasToken;
use crate::layers::{DecodedImage, ImageError, decode_data_uri};

/// A background image waiting to be decoded.
#[derive(Debug, Clone)]
pub struct BackgroundRequest {
    token: CanvasToken,
    data_uri: String,
}

impl BackgroundRequest {
    pub fn new(token: CanvasToken, data_uri: String) -> Self {
        Self { token, data_uri }
    }

    /// Canvas this request was issued against.
    pub fn token(&self) -> CanvasToken {
        self.token
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Decode the image. Safe to call off the editor's thread.
    pub fn decode(self) -> DecodedBackground {
        let result = decode_data_uri(&self.data_uri);
        DecodedBackground {
            token: self.token,
            result,
        }
    }
}

/// The outcome of decoding a [`BackgroundRequest`].
#[derive(Debug)]
pub struct DecodedBackground {
    pub token: CanvasToken,
    pub result: Result<DecodedImage, ImageError>,
}

impl DecodedBackground {
    /// A completion that failed before decoding (for example, a failed file read).
    pub fn failed(token: CanvasToken, error: ImageError) -> Self {
        Self {
            token,
            result: Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::format::Format;
    use crate::test_support::png_data_uri;

    #[test]
    fn test_decode_keeps_token() {
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let request = BackgroundRequest::new(canvas.token(), png_data_uri(3, 3));
        let decoded = request.decode();
        assert_eq!(decoded.token, canvas.token());
        assert!(decoded.result.is_ok());
    }

    #[test]
    fn test_decode_off_thread() {
        let canvas = Canvas::new(Format::Square, Canvas::DEFAULT_BACKGROUND);
        let uri = "data:image/png;base64,AAAA".to_string();
        let request = BackgroundRequest::new(canvas.token(), uri);
        let decoded = std::thread::spawn(move || request.decode()).join().unwrap();
        assert!(decoded.result.is_err());
    }
}
