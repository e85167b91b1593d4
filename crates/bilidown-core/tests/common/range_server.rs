//! Minimal HTTP/1.1 server that answers OPTIONS probes and Range GETs for integration tests.
//!
//! Serves a single static body. OPTIONS returns a configurable status; GET with
//! `Range: bytes=X-Y` returns 206 with exactly that slice. Every request's
//! headers are recorded so tests can inspect what the client sent.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct RangeServerOptions {
    /// Status returned to OPTIONS; `None` = 200.
    pub preflight_status: Option<u16>,
    /// If true, GET ignores Range and always returns 200 with the full body.
    pub ignore_ranges: bool,
    /// If true, ranged responses declare the full slice length but send one byte less.
    pub truncate: bool,
    /// Delay before answering a range that starts at the given offset.
    pub delays: HashMap<u64, Duration>,
    /// Status line used for every GET instead of 200/206; the body is unchanged.
    pub get_status: Option<&'static str>,
    /// If true, GET responses carry no Content-Length (body ends at close).
    pub omit_content_length: bool,
}

/// One request as seen by the server. Header names are lowercased.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct RangeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RangeServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method.eq_ignore_ascii_case(method))
            .collect()
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior (preflight rejected, ranges ignored, etc.).
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let recorded = Arc::clone(&recorded);
            thread::spawn(move || handle(stream, &body, &opts, &recorded));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/stream.flv", port),
        requests,
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: &RangeServerOptions,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_head(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let parsed = parse_request(&request);
    let method = parsed.method.clone();
    let range = parse_range(parsed.header("range"));
    recorded.lock().unwrap().push(parsed);

    let total = body.len() as u64;
    if method.eq_ignore_ascii_case("OPTIONS") {
        let status = opts.preflight_status.unwrap_or(200);
        let response = format!(
            "HTTP/1.1 {} Preflight\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if method.eq_ignore_ascii_case("GET") {
        let (status, slice) = match range {
            Some((start, end_incl)) if !opts.ignore_ranges => {
                if let Some(delay) = opts.delays.get(&start) {
                    thread::sleep(*delay);
                }
                let end_incl = end_incl.min(total.saturating_sub(1));
                if start > end_incl || start >= total {
                    ("416 Range Not Satisfiable", &body[0..0])
                } else {
                    (
                        "206 Partial Content",
                        &body[start as usize..(end_incl + 1) as usize],
                    )
                }
            }
            _ => ("200 OK", body),
        };
        let sent = if opts.truncate && !slice.is_empty() {
            &slice[..slice.len() - 1]
        } else {
            slice
        };
        let status = opts.get_status.unwrap_or(status);
        let length = if opts.omit_content_length {
            String::new()
        } else {
            format!("Content-Length: {}\r\n", slice.len())
        };
        let response = format!(
            "HTTP/1.1 {}\r\n{}Content-Type: video/x-flv\r\nConnection: close\r\n\r\n",
            status, length
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(sent);
        return;
    }
    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
}

/// Reads until the blank line ending the request head.
fn read_head(stream: &mut std::net::TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn parse_request(request: &str) -> RecordedRequest {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("")
        .to_string();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }
    RecordedRequest { method, headers }
}

/// Returns (start, end_inclusive) for `bytes=X-Y`.
fn parse_range(value: Option<&str>) -> Option<(u64, u64)> {
    let part = value?.trim().strip_prefix("bytes=")?;
    let (a, b) = part.split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let end = b.trim();
    let end_incl = if end.is_empty() {
        u64::MAX
    } else {
        end.parse::<u64>().ok()?
    };
    Some((start, end_incl))
}
