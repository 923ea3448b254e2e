use actix_multipart::{Field, Multipart};
use futures::{StreamExt, TryStreamExt};
use shared::has_accepted_extension;

pub const IMAGE_FIELD: &str = "image";

const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Request has no `image` file field")]
    MissingImage,
    #[error("Unsupported upload {file_name} ({content_type}); expected a jpg, jpeg or png image")]
    UnsupportedType {
        file_name: String,
        content_type: String,
    },
    #[error("File too large: more than {max} bytes")]
    TooLarge { max: usize },
    #[error("Uploaded file is empty")]
    Empty,
    #[error("Malformed multipart body: {0}")]
    Multipart(String),
}

#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Pulls the single `image` field out of a multipart body, skipping any other fields.
pub async fn read_image_upload(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<ImageUpload, UploadError> {
    let mut upload = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if field.name() != Some(IMAGE_FIELD) || upload.is_some() {
            drain(&mut field).await?;
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content_type = field.content_type().map(|m| m.essence_str().to_string());
        validate_type(&file_name, content_type.as_deref())?;

        let bytes = read_limited(&mut field, max_bytes).await?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    upload.ok_or(UploadError::MissingImage)
}

/// Accepts declared jpeg/png content types, or a jpg/jpeg/png extension when the browser
/// sent no specific type.
pub fn validate_type(file_name: &str, content_type: Option<&str>) -> Result<(), UploadError> {
    let accepted = match content_type {
        Some(ct) if ct != "application/octet-stream" => ACCEPTED_MIME_TYPES.contains(&ct),
        _ => has_accepted_extension(file_name),
    };
    if accepted {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType {
            file_name: file_name.to_string(),
            content_type: content_type.unwrap_or("unknown").to_string(),
        })
    }
}

async fn read_limited(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, UploadError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
        if data.len() + chunk.len() > max_bytes {
            return Err(UploadError::TooLarge { max: max_bytes });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn drain(field: &mut Field) -> Result<(), UploadError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_declared_image_types() {
        assert!(validate_type("photo.jpg", Some("image/jpeg")).is_ok());
        assert!(validate_type("photo", Some("image/png")).is_ok());
    }

    #[test]
    fn falls_back_to_extension_without_a_specific_type() {
        assert!(validate_type("photo.JPEG", None).is_ok());
        assert!(validate_type("photo.png", Some("application/octet-stream")).is_ok());
        assert!(validate_type("photo.gif", None).is_err());
    }

    #[test]
    fn rejects_other_image_types() {
        let err = validate_type("anim.gif", Some("image/gif")).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(validate_type("photo.png", Some("image/webp")).is_err());
    }
}
