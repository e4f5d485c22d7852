//! Single-part `multipart/form-data` bodies for media uploads.
//!
//! The body is assembled by hand so the file bytes go out untouched:
//! header section, raw content, closing boundary, in that order.

use uuid::Uuid;

/// Form field the media endpoint reads the file from
pub const FILE_FIELD: &str = "file";

const BOUNDARY_PREFIX: &str = "----MicropressFormBoundary";

/// Encoded upload body plus the boundary it was framed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPayload {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartPayload {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// MIME type for an image filename; unknown extensions are octet-stream
pub fn mime_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// A fresh random boundary token
pub fn generate_boundary() -> String {
    format!("{}{}", BOUNDARY_PREFIX, Uuid::new_v4().simple())
}

/// Encode `content` as the `file` part of a new multipart body
pub fn encode(content: &[u8], filename: &str, mime_type: &str) -> MultipartPayload {
    encode_with_boundary(content, filename, mime_type, generate_boundary())
}

/// Encode with a caller-chosen boundary
pub fn encode_with_boundary(
    content: &[u8],
    filename: &str,
    mime_type: &str,
    boundary: impl Into<String>,
) -> MultipartPayload {
    let boundary = boundary.into();

    let header = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{FILE_FIELD}\"; filename=\"{}\"\r\nContent-Type: {mime_type}\r\n\r\n",
        quote_filename(filename),
    );
    let trailer = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(header.len() + content.len() + trailer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(trailer.as_bytes());

    MultipartPayload { boundary, body }
}

/// Keep the filename inside its quoted header parameter
fn quote_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { "%22".to_string() } else { c.to_string() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for("a.png"), "image/png");
        assert_eq!(mime_type_for("a.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("a.gif"), "image/gif");
        assert_eq!(mime_type_for("a.webp"), "image/webp");
        assert_eq!(mime_type_for("a.bmp"), "image/bmp");
        assert_eq!(mime_type_for("a.tiff"), "application/octet-stream");
        assert_eq!(mime_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_exact_layout() {
        let payload = encode_with_boundary(b"DATA", "photo.png", "image/png", "XYZ");
        let expected = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n\
Content-Type: image/png\r\n\
\r\n\
DATA\r\n\
--XYZ--\r\n";
        assert_eq!(payload.body(), &expected[..]);
        assert_eq!(payload.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_binary_content_is_verbatim() {
        let content: Vec<u8> = (0..=255u8).collect();
        let payload = encode(&content, "bytes.bmp", "image/bmp");
        let body = payload.body();

        let header_end = body
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|i| i + 4)
            .unwrap();
        assert_eq!(&body[header_end..header_end + content.len()], &content[..]);

        let trailer = format!("\r\n--{}--\r\n", payload.boundary());
        assert!(body.ends_with(trailer.as_bytes()));
        assert_eq!(body.len(), header_end + content.len() + trailer.len());
    }

    #[test]
    fn test_boundaries_are_fresh() {
        let a = encode(b"x", "a.png", "image/png");
        let b = encode(b"x", "a.png", "image/png");
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.boundary().starts_with(BOUNDARY_PREFIX));
    }

    #[test]
    fn test_filename_quotes_are_escaped() {
        let payload = encode_with_boundary(b"", "my \"best\".png", "image/png", "B");
        let text = String::from_utf8(payload.into_body()).unwrap();
        assert!(text.contains("filename=\"my %22best%22.png\""));
    }
}
