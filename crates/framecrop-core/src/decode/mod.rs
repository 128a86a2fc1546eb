//! Source image decoding.
//!
//! Turns encoded bytes (JPEG, PNG) into an immutable [`SourceImage`] with
//! EXIF orientation already applied, so every later stage works in the
//! image's upright pixel space. The decoder is synchronous and
//! single-threaded, suitable for running inside a Web Worker.

mod reader;
mod types;

pub use reader::{decode_image, decode_image_no_orientation, detect_format, get_orientation};
pub use types::{DecodeError, Orientation, SourceImage};
