use std::io::Read;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub struct MockServer {
    pub base_url: String,
    pub requests: Receiver<CapturedRequest>,
}

/// Serve `replies` in order, one `(status, json body)` per request, then stop.
pub fn serve(replies: Vec<(u16, String)>) -> MockServer {
    let server = Server::http("127.0.0.1:0").expect("bind mock server");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("mock server listens on ip");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in replies {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut text = String::new();
            let _ = request.as_reader().read_to_string(&mut text);
            let captured = CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|h| (h.field.as_str().to_string(), h.value.as_str().to_string()))
                    .collect(),
                body: text,
            };
            let _ = tx.send(captured);

            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("content type header");
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(header);
            let _ = request.respond(response);
        }
    });

    MockServer {
        base_url: format!("http://{addr}"),
        requests: rx,
    }
}
