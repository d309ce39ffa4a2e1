use axum::http::HeaderMap;
use bytes::Bytes;

/// A report upload as submitted by the presentation layer.
#[derive(Debug)]
pub struct UploadForm {
    pub file_name: String,
    pub content: Bytes,
    pub notes: Option<String>,
}

/// Parse a `multipart/form-data` upload with a `file` part and an optional `notes` part.
pub async fn parse_upload(headers: &HeaderMap, body: Bytes) -> Result<UploadForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut file: Option<(String, Bytes)> = None;
    let mut notes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| format!("File read error: {e}"))?;
                file = Some((file_name, content));
            }
            Some("notes") => {
                notes = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| format!("Field read error: {e}"))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, content) = file.ok_or_else(|| "A 'file' part is required".to_string())?;

    Ok(UploadForm {
        file_name,
        content,
        notes,
    })
}
