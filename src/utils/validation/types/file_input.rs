//! Provides a safe way to handle and validate uploaded post images.
//! This module ensures that files meet our format and size requirements
//! before they are written to the media directory.

use image::{GenericImageView, ImageFormat};
use std::path::Path;
use thiserror::Error;

/// Represents the maximum allowed file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Represents the maximum allowed image dimensions
const MAX_IMAGE_DIMENSIONS: (u32, u32) = (4096, 4096);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileInputError {
    #[error("The submitted file is empty.")]
    Empty,
    #[error("The submitted file is too large (at most 5 MB).")]
    TooLarge,
    #[error("No file name was submitted.")]
    MissingFilename,
    #[error("File extension is not allowed. Allowed extensions are: jpg, jpeg, png, gif.")]
    InvalidExtension,
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    InvalidImage,
    #[error("Image dimensions exceed {}x{} pixels.", MAX_IMAGE_DIMENSIONS.0, MAX_IMAGE_DIMENSIONS.1)]
    TooBig,
}

/// A validated image upload. Guarantees about the file's format, size, and
/// integrity hold for every instance.
#[derive(Debug, Clone)]
pub struct FileInput {
    // The actual bytes of the file content
    content: Vec<u8>,
    // The sanitized and validated filename
    filename: String,
    // Format detected from the content itself
    format: ImageFormat,
    dimensions: (u32, u32),
}

impl FileInput {
    /// Creates a new FileInput instance after validating both the file
    /// content and filename.
    ///
    /// # Returns
    /// * `Ok(FileInput)` if validation passes
    /// * `Err` with a user-facing reason if any validation fails
    pub fn new(content: &[u8], filename: &str) -> Result<Self, FileInputError> {
        Self::validate_file_size(content)?;

        let sanitized_filename = Self::sanitize_filename(filename)?;

        let extension = Self::get_file_extension(&sanitized_filename)?;

        let format = Self::validate_image_format(content)?;

        // The extension must agree with what the bytes really are
        if !Self::extension_matches(&extension, format) {
            return Err(FileInputError::InvalidExtension);
        }

        let dimensions = Self::validate_image_integrity(content, format)?;

        Ok(Self {
            content: content.to_vec(),
            filename: sanitized_filename,
            format,
            dimensions,
        })
    }

    /// Validates that the file size is within acceptable limits
    fn validate_file_size(content: &[u8]) -> Result<(), FileInputError> {
        if content.is_empty() {
            return Err(FileInputError::Empty);
        }
        if content.len() > MAX_FILE_SIZE {
            return Err(FileInputError::TooLarge);
        }
        Ok(())
    }

    /// Strips any path components from the client-supplied name
    fn sanitize_filename(filename: &str) -> Result<String, FileInputError> {
        let filename = filename.trim();

        if filename.is_empty() {
            return Err(FileInputError::MissingFilename);
        }

        let filename = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(FileInputError::MissingFilename)?;

        Ok(filename.to_string())
    }

    fn get_file_extension(filename: &str) -> Result<String, FileInputError> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .ok_or(FileInputError::InvalidExtension)
    }

    fn extension_matches(extension: &str, format: ImageFormat) -> bool {
        matches!(
            (extension, format),
            ("jpg" | "jpeg", ImageFormat::Jpeg) | ("png", ImageFormat::Png) | ("gif", ImageFormat::Gif)
        )
    }

    /// Sniffs the image format from the magic bytes
    fn validate_image_format(content: &[u8]) -> Result<ImageFormat, FileInputError> {
        match image::guess_format(content) {
            Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif)) => Ok(format),
            Ok(_) => Err(FileInputError::InvalidExtension),
            Err(_) => Err(FileInputError::InvalidImage),
        }
    }

    /// Decodes the image to validate its integrity and dimensions
    fn validate_image_integrity(
        content: &[u8],
        format: ImageFormat,
    ) -> Result<(u32, u32), FileInputError> {
        let img = image::load_from_memory_with_format(content, format)
            .map_err(|_| FileInputError::InvalidImage)?;

        let dimensions = img.dimensions();

        if dimensions.0 > MAX_IMAGE_DIMENSIONS.0 || dimensions.1 > MAX_IMAGE_DIMENSIONS.1 {
            return Err(FileInputError::TooBig);
        }

        Ok(dimensions)
    }

    /// Returns the file content as a byte slice
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the sanitized filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Canonical extension for the detected format, used for stored names
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            _ => "jpg",
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;
    use crate::utils::validation::tests_support::SMALL_GIF;

    fn create_test_image(format: ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::new(100, 100);

        // Create a buffer with a Cursor for seeking capability
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, format)
            .expect("Failed to create test image");

        buffer
    }

    #[test]
    fn test_valid_images() {
        let jpeg = create_test_image(ImageFormat::Jpeg);
        let file = FileInput::new(&jpeg, "photo.JPG").unwrap();
        assert_eq!(file.extension(), "jpg");
        assert_eq!(file.dimensions(), (100, 100));

        let png = create_test_image(ImageFormat::Png);
        assert_eq!(FileInput::new(&png, "drawing.png").unwrap().extension(), "png");

        let gif = FileInput::new(SMALL_GIF, "small.gif").unwrap();
        assert_eq!(gif.extension(), "gif");
        assert_eq!(gif.dimensions(), (2, 1));
    }

    #[test]
    fn test_filename_sanitization() {
        let content = create_test_image(ImageFormat::Jpeg);

        let cases = vec![
            ("test.jpg", true),
            ("../test.jpg", true),  // Path traversal attempt
            ("test.jpeg", true),
            ("test.png", false),  // Extension disagrees with content
            ("", false),
            ("test", false),
        ];

        for (filename, should_succeed) in cases {
            let result = FileInput::new(&content, filename);
            assert_eq!(
                result.is_ok(),
                should_succeed,
                "Failed for filename: {}", filename
            );
        }

        let file = FileInput::new(&content, "../../etc/test.jpg").unwrap();
        assert_eq!(file.filename(), "test.jpg");
    }

    #[test]
    fn test_file_size_limits() {
        assert_eq!(FileInput::new(&[], "test.jpg").unwrap_err(), FileInputError::Empty);

        let large_content = vec![0; MAX_FILE_SIZE + 1];
        assert_eq!(
            FileInput::new(&large_content, "test.jpg").unwrap_err(),
            FileInputError::TooLarge
        );
    }

    #[test]
    fn test_image_integrity() {
        let invalid_data = vec![0u8; 100];
        let result = FileInput::new(&invalid_data, "test.jpg");
        assert!(result.is_err(), "Should reject completely invalid data");

        let mut content = create_test_image(ImageFormat::Jpeg);
        content[0] = 0x00;  // Corrupt the JPEG SOI marker (should be 0xFF 0xD8)
        let result = FileInput::new(&content, "test.jpg");
        assert!(result.is_err(), "Should reject JPEG with invalid header");

        let mut content = create_test_image(ImageFormat::Jpeg);
        content.truncate(20);
        let result = FileInput::new(&content, "test.jpg");
        assert!(result.is_err(), "Should reject truncated JPEG");
    }
}
