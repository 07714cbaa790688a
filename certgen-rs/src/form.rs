//! Validation of user-submitted certificate details.

use crate::error::FormError;
use crate::request::{ImageSource, RenderRequest, TextDirection};

/// Largest accepted picture upload (10 MiB).
pub const MAX_PICTURE_BYTES: usize = 10 * 1024 * 1024;

/// Raw certificate form input.
#[derive(Debug, Clone, Default)]
pub struct CertificateForm {
    pub full_name: String,
    pub class_name: String,
    pub signature: String,
    /// Whether the "include picture" option is checked.
    pub include_picture: bool,
    /// The uploaded picture as selected by the user.
    pub picture: Option<Vec<u8>>,
    /// The cropped version of the picture, preferred over `picture` when present.
    pub cropped_picture: Option<Vec<u8>>,
    pub direction: TextDirection,
}

impl CertificateForm {
    pub fn new(
        full_name: impl Into<String>,
        class_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            class_name: class_name.into(),
            signature: signature.into(),
            ..Default::default()
        }
    }

    /// Check the form. Text fields must be non-blank; the uploaded and the
    /// cropped picture must each be at most [`MAX_PICTURE_BYTES`] and look
    /// like an image.
    pub fn validate(&self) -> Result<(), FormError> {
        for (label, value) in [
            ("full name", &self.full_name),
            ("class", &self.class_name),
            ("signature", &self.signature),
        ] {
            if value.trim().is_empty() {
                return Err(FormError::MissingField(label));
            }
        }
        for picture in [&self.picture, &self.cropped_picture].into_iter().flatten() {
            validate_picture(picture)?;
        }
        Ok(())
    }

    /// Validate and turn the form into a render request.
    ///
    /// The picture is used only when `include_picture` is set; a checked box
    /// with no upload renders the picture-less layout.
    pub fn into_request(self) -> Result<RenderRequest, FormError> {
        self.validate()?;

        let picture = if self.include_picture {
            self.cropped_picture.or(self.picture)
        } else {
            None
        };

        let mut request = RenderRequest::new(self.full_name, self.class_name, self.signature)
            .with_direction(self.direction);
        request.picture = picture.map(ImageSource::from_bytes);
        Ok(request)
    }
}

/// Size and content-type checks for an uploaded picture.
pub fn validate_picture(bytes: &[u8]) -> Result<(), FormError> {
    if bytes.len() > MAX_PICTURE_BYTES {
        return Err(FormError::PictureTooLarge {
            size: bytes.len(),
            max: MAX_PICTURE_BYTES,
        });
    }
    if image::guess_format(bytes).is_err() {
        return Err(FormError::NotAnImage);
    }
    Ok(())
}
