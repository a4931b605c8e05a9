use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use http_body_util::BodyExt;
use rand::RngCore;

/// Boundary used by every multipart body built in tests
pub const BOUNDARY: &str = "----upload-relay-test-boundary";

/// Builder for raw `multipart/form-data` request bodies
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file part
    pub fn file(mut self, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a plain form value
    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    /// Closes the body and wraps it in a POST request to `route`
    pub fn into_request(mut self, route: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .uri(route)
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// Generate JPEG-looking bytes of the given size with random content
pub fn generate_test_image(size: usize) -> Vec<u8> {
    let mut buf = vec![0u8; size.max(6)];
    rand::rngs::OsRng.fill_bytes(&mut buf);

    // SOI/APP0 markers up front, EOI at the end
    buf[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    let len = buf.len();
    buf[len - 2..].copy_from_slice(&[0xFF, 0xD9]);
    buf
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
