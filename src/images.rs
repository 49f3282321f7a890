use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::Error;
use crate::html::ImageConverter;
use crate::model::{Image, ImageDisplaySize, ImageMetadata};

/// Intrinsic pixel size decoded from the image header.
pub(crate) fn intrinsic_dimensions(data: &[u8]) -> Result<(u32, u32), Error> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| Error::ImageDecode(e.to_string()))
}

pub(crate) fn data_uri(content_type: &str, data: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(data))
}

/// Sizes and inlines images as the writer reaches them.
///
/// The n-th call is paired with `display_sizes[n]`: both follow document
/// order, nothing else links them.
pub(crate) struct ImageResolver<'g> {
    display_sizes: &'g [ImageDisplaySize],
    metadata: Vec<ImageMetadata>,
}

impl<'g> ImageResolver<'g> {
    pub(crate) fn new(display_sizes: &'g [ImageDisplaySize]) -> Self {
        Self {
            display_sizes,
            metadata: Vec::new(),
        }
    }

    pub(crate) fn into_metadata(self) -> Vec<ImageMetadata> {
        self.metadata
    }
}

impl ImageConverter for ImageResolver<'_> {
    fn convert(&mut self, image: &Image, data: Result<Vec<u8>, Error>) -> String {
        let sequence = self.metadata.len();
        let declared = self
            .display_sizes
            .get(sequence)
            .filter(|d| d.sequence == sequence)
            .and_then(|d| Some((d.width_px?, d.height_px?)));

        let (src, dimensions) = match data {
            Ok(bytes) => {
                let dimensions = declared.or_else(|| match intrinsic_dimensions(&bytes) {
                    Ok(dims) => Some(dims),
                    Err(e) => {
                        log::warn!("Image {sequence} ({}) has no usable size: {e}", image.part);
                        None
                    }
                });
                (data_uri(&image.content_type, &bytes), dimensions)
            }
            Err(e) => {
                log::warn!("Image {sequence} ({}) could not be read: {e}", image.part);
                (String::new(), declared)
            }
        };

        self.metadata.push(ImageMetadata {
            sequence,
            content_type: image.content_type.clone(),
            alt_text: image.alt_text.clone(),
            width_px: dimensions.map(|(w, _)| w),
            height_px: dimensions.map(|(_, h)| h),
        });
        src
    }
}
