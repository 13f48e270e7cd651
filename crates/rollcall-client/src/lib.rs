//! rollcall-client: talks to the face-recognition service.
//!
//! The service does all liveness scoring and recognition. The client only
//! uploads a JPEG frame and decodes the verdict.

use std::time::Duration;

use rollcall_core::RecognitionResponse;
use thiserror::Error;

mod multipart;

pub use multipart::MultipartBody;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/recognize_face";

/// Form field and filename the service reads the frame from.
const IMAGE_FIELD: &str = "image";
const IMAGE_FILENAME: &str = "frame.jpg";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("recognition service returned HTTP {0}")]
    Status(u16),
    #[error("recognition request failed: {0}")]
    Transport(#[source] ureq::Error),
    #[error("invalid recognition response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ureq::Error> for ServiceError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => ServiceError::Status(code),
            other => ServiceError::Transport(other),
        }
    }
}

/// Anything that can turn a JPEG frame into a liveness/recognition verdict.
///
/// Calls block; async callers run them on a blocking thread.
pub trait RecognitionService: Send + Sync {
    fn recognize(&self, jpeg: &[u8]) -> Result<RecognitionResponse, ServiceError>;
}

/// Blocking HTTP client for the recognition endpoint.
pub struct HttpRecognitionService {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpRecognitionService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RecognitionService for HttpRecognitionService {
    fn recognize(&self, jpeg: &[u8]) -> Result<RecognitionResponse, ServiceError> {
        let body = MultipartBody::single_file(IMAGE_FIELD, IMAGE_FILENAME, "image/jpeg", jpeg);

        let mut resp = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", body.content_type())
            .send(body.as_bytes())?;

        let text = resp.body_mut().read_to_string()?;
        let verdict: RecognitionResponse = serde_json::from_str(&text)?;

        tracing::debug!(
            bytes = jpeg.len(),
            blink = verdict.blink,
            yaw = verdict.yaw,
            recognized = verdict.recognized,
            "recognition response"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    /// Serve exactly one HTTP request, replying with `status` and `body`.
    /// Returns the endpoint URL and a receiver for the raw request body.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if let Some(v) = lower.strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
            }
            let mut req_body = vec![0u8; content_length];
            reader.read_exact(&mut req_body).unwrap();
            tx.send(req_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        });

        (format!("http://{addr}/recognize_face"), rx)
    }

    #[test]
    fn posts_frame_and_parses_verdict() {
        let (url, rx) = serve_once(
            "200 OK",
            r#"{"blink":false,"yaw":21.0,"recognized":true,"student_id":42,"name":"Ada","confidence":0.9}"#,
        );
        let svc = HttpRecognitionService::new(url, Duration::from_secs(5));

        let verdict = svc.recognize(b"\xFF\xD8fakejpeg").unwrap();
        assert!(verdict.recognized);
        assert_eq!(verdict.subject_id.as_deref(), Some("42"));
        assert_eq!(verdict.display_name.as_deref(), Some("Ada"));

        let sent = String::from_utf8_lossy(&rx.recv().unwrap()).into_owned();
        assert!(sent.contains(r#"name="image"; filename="frame.jpg""#));
        assert!(sent.contains("Content-Type: image/jpeg"));
        assert!(sent.contains("fakejpeg"));
    }

    #[test]
    fn server_error_maps_to_status() {
        let (url, _rx) = serve_once("500 Internal Server Error", "{}");
        let svc = HttpRecognitionService::new(url, Duration::from_secs(5));
        let err = svc.recognize(b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Status(500)));
    }

    #[test]
    fn malformed_json_maps_to_parse() {
        let (url, _rx) = serve_once("200 OK", "not json");
        let svc = HttpRecognitionService::new(url, Duration::from_secs(5));
        let err = svc.recognize(b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Parse(_)));
    }

    #[test]
    fn refused_connection_maps_to_transport() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let svc = HttpRecognitionService::new(
            format!("http://127.0.0.1:{port}/recognize_face"),
            Duration::from_secs(2),
        );
        let err = svc.recognize(b"x").unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
