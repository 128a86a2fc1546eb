//! Encoded-bytes to `SourceImage` decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, Orientation, SourceImage};

/// Decode an image (JPEG, PNG) from bytes, applying EXIF orientation.
///
/// The result is always RGBA8 so transparent PNGs keep their alpha channel.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be detected,
/// `DecodeError::CorruptedFile` if decoding fails and
/// `DecodeError::EmptyImage` if the image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = read_dynamic(bytes)?;
    finish(apply_orientation(img, orientation))
}

/// Decode an image from bytes without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    finish(read_dynamic(bytes)?)
}

/// Detect the container format of `bytes` without decoding pixels.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Extract EXIF orientation value from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() || detect_format(bytes).is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn finish(img: DynamicImage) -> Result<SourceImage, DecodeError> {
    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(DecodeError::EmptyImage);
    }
    Ok(SourceImage::from_rgba_image(rgba))
}

fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_keeps_alpha() {
        let bytes = png_bytes(4, 3, [10, 20, 30, 128]);
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(&img.pixels()[0..4], &[10, 20, 30, 128]);
    }

    #[test]
    fn test_decode_jpeg_is_opaque() {
        let bytes = jpeg_bytes(8, 8);
        let img = decode_image(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
        assert!(img.pixels().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(&png_bytes(1, 1, [0; 4])), Some(ImageFormat::Png));
        assert_eq!(detect_format(&jpeg_bytes(1, 1)), Some(ImageFormat::Jpeg));
        assert_eq!(detect_format(b"not an image"), None);
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_garbage() {
        let garbage = vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        assert!(matches!(
            decode_image(&garbage),
            Err(DecodeError::InvalidFormat)
        ));
    }

    #[test]
    fn test_decode_truncated_png() {
        let mut bytes = png_bytes(16, 16, [1, 2, 3, 255]);
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(
            decode_image(&bytes),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_no_exif_is_normal_orientation() {
        assert_eq!(get_orientation(&png_bytes(2, 2, [0; 4])), Orientation::Normal);
        assert_eq!(get_orientation(&jpeg_bytes(2, 2)), Orientation::Normal);
    }

    #[test]
    fn test_decode_no_orientation_matches_plain_png() {
        let bytes = png_bytes(3, 2, [5, 6, 7, 255]);
        let a = decode_image(&bytes).unwrap();
        let b = decode_image_no_orientation(&bytes).unwrap();
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        // 2x1 image: red at (0,0), blue at (1,0)
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let rotated = apply_orientation(DynamicImage::ImageRgba8(img), Orientation::Rotate90CW);
        assert_eq!(rotated.width(), 1);
        assert_eq!(rotated.height(), 2);

        let rgba = rotated.to_rgba8();
        // After 90 CW rotation, red moves to top and blue to bottom
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(0, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let flipped = apply_orientation(DynamicImage::ImageRgba8(img), Orientation::FlipHorizontal);
        let rgba = flipped.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }
}
