//! Shared fixtures for connector tests

#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use aquaguard_core::time::{format_store_timestamp, MS_PER_HOUR};
use aquaguard_core::Timestamp;
use serde_json::{json, Value};

/// 2024-01-01 00:00:00 UTC
pub const START_MS: Timestamp = 1_704_067_200_000;

/// Hourly store documents from a quiet distribution line
pub fn store_documents(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            json!({
                "_id": format!("doc-{:04}", i),
                "Timestamp": format_store_timestamp(START_MS + i as i64 * MS_PER_HOUR),
                "Pressure": 100.0 + (t * 0.3).sin(),
                "Flow_rate": 50.0 + (t * 0.2).cos(),
                "Water_quality": 97.0 + (t * 0.1).sin() * 0.5,
                "Temperature": 20.0 + (t * 0.26).sin(),
            })
        })
        .collect()
}

/// Write documents as a store export file inside `dir`
pub fn write_export(dir: &Path, docs: &[Value]) -> PathBuf {
    let path = dir.join("export.json");
    fs::write(&path, Value::Array(docs.to_vec()).to_string()).unwrap();
    path
}

/// One-shot HTTP server answering every connection with the same response
pub struct MockServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Serve `connections` requests, then stop accepting
    pub fn start(status: u16, body: impl Into<String>, connections: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let body = body.into();

        thread::spawn(move || {
            for stream in listener.incoming().take(connections) {
                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => break,
                };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }
                seen.lock().unwrap().push(request_line.trim_end().to_string());

                let response = format!(
                    "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self { url, requests }
    }

    /// Request lines received so far (`GET /path?query HTTP/1.1`)
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
