//! Minimal HTTP/1.1 server standing in for the backend in integration tests.
//!
//! Serves `GET /rest/v1/{table}` (PostgREST-style JSON arrays, `id=eq.X`
//! filter on the records table) and `GET /storage/v1/object/{bucket}/{key}`.
//! Everything else is 404. One thread per connection; runs until the process exits.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const RECORDS_TABLE: &str = "records";
pub const BUCKET: &str = "documents";

#[derive(Debug, Clone, Default)]
pub struct Backend {
    /// Rows of the records table, already in the embedded shape the client selects.
    pub records: Vec<Value>,
    /// Other tables, for introspection.
    pub tables: HashMap<String, Vec<Value>>,
    /// Object key -> (bytes, content type).
    pub objects: HashMap<String, (Vec<u8>, String)>,
    /// Sleep before answering any request.
    pub delay: Option<Duration>,
    /// Extra sleep on storage routes only, after the request is counted.
    pub storage_delay: Option<Duration>,
}

impl Backend {
    pub fn with_record(mut self, row: Value) -> Self {
        self.records.push(row);
        self
    }

    pub fn with_object(mut self, key: &str, bytes: &[u8], content_type: &str) -> Self {
        self.objects
            .insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        self
    }

    pub fn with_table(mut self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_storage_delay(mut self, delay: Duration) -> Self {
        self.storage_delay = Some(delay);
        self
    }
}

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct Running {
    pub base_url: String,
    pub rest_requests: Arc<AtomicUsize>,
    pub storage_requests: Arc<AtomicUsize>,
    /// Raw request heads, in arrival order.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl Running {
    pub fn rest_count(&self) -> usize {
        self.rest_requests.load(Ordering::SeqCst)
    }

    pub fn storage_count(&self) -> usize {
        self.storage_requests.load(Ordering::SeqCst)
    }
}

pub fn start(backend: Backend) -> Running {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let running = Running {
        base_url: format!("http://127.0.0.1:{}", port),
        rest_requests: Arc::new(AtomicUsize::new(0)),
        storage_requests: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let backend = Arc::new(backend);
    let handle = running.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let backend = Arc::clone(&backend);
            let handle = handle.clone();
            thread::spawn(move || serve(stream, &backend, &handle));
        }
    });
    running
}

/// A local URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn serve(mut stream: TcpStream, backend: &Backend, running: &Running) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    running.requests.lock().unwrap().push(head.clone());

    let target = head
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let url = match url::Url::parse(&format!("http://localhost{}", target)) {
        Ok(u) => u,
        Err(_) => return respond(&mut stream, "400 Bad Request", "text/plain", b"bad target"),
    };
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

    if let Some(delay) = backend.delay {
        thread::sleep(delay);
    }

    match segments.as_slice() {
        ["rest", "v1", table] => {
            running.rest_requests.fetch_add(1, Ordering::SeqCst);
            let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let (status, body) = rest_response(backend, table, &query);
            respond(&mut stream, status, "application/json", body.to_string().as_bytes());
        }
        ["storage", "v1", "object", bucket, key @ ..] => {
            running.storage_requests.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = backend.storage_delay {
                thread::sleep(delay);
            }
            let key = key.join("/");
            match backend.objects.get(&key) {
                Some((bytes, content_type)) if *bucket == BUCKET => {
                    respond(&mut stream, "200 OK", content_type, bytes)
                }
                _ => {
                    let body = json!({
                        "statusCode": "404",
                        "error": "not_found",
                        "message": "Object not found"
                    });
                    respond(
                        &mut stream,
                        "400 Bad Request",
                        "application/json",
                        body.to_string().as_bytes(),
                    )
                }
            }
        }
        _ => respond(&mut stream, "404 Not Found", "text/plain", b"no route"),
    }
}

fn rest_response(
    backend: &Backend,
    table: &str,
    query: &HashMap<String, String>,
) -> (&'static str, Value) {
    if table == RECORDS_TABLE {
        let rows: Vec<Value> = match query.get("id").and_then(|f| f.strip_prefix("eq.")) {
            Some(id) => backend
                .records
                .iter()
                .filter(|r| r["id"].as_str() == Some(id))
                .cloned()
                .collect(),
            None => backend.records.clone(),
        };
        return ("200 OK", limited(rows, query));
    }
    match backend.tables.get(table) {
        Some(rows) => ("200 OK", limited(rows.clone(), query)),
        None => (
            "404 Not Found",
            json!({
                "code": "42P01",
                "details": null,
                "hint": null,
                "message": format!("relation \"public.{}\" does not exist", table)
            }),
        ),
    }
}

fn limited(mut rows: Vec<Value>, query: &HashMap<String, String>) -> Value {
    if let Some(n) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(n);
    }
    Value::Array(rows)
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(buf).ok()
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
