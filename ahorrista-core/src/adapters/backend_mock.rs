//! Mock backend server for testing
//!
//! Simulates the REST endpoints the client consumes so the reqwest adapter
//! can be exercised end to end:
//! - POST /authentication/login and /authentication/register
//! - GET /expenses_category, /expenses_summary, /expenses/detail
//! - POST /expenses, DELETE /expenses/{id}
//! - GET/POST /goals, PATCH /goals/{id}
//!
//! Every request is recorded for assertions.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Mock backend server for testing
pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Behaviour knobs for the mock
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl MockConfig {
    pub const VALID_TOKEN: &'static str = "mock-token";
    pub const VALID_PASSWORD: &'static str = "correct-horse";
    pub const MISSING_EXPENSE_ID: i64 = 404;
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Request target including the query string
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl MockBackend {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &log);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().ok()?.last().cloned()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one full HTTP request: headers, then Content-Length bytes of body
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    stream.set_nonblocking(false).ok()?;
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((head, body))
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    log: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, r#"{"message": "Invalid request"}"#);
        return;
    }
    let method = parts[0].to_string();
    let path = parts[1].to_string();

    let authorization = head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("authorization")
            .then(|| value.trim().to_string())
    });

    if let Ok(mut requests) = log.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            authorization: authorization.clone(),
            body: body.clone(),
        });
    }

    let authorized =
        authorization.as_deref() == Some(&format!("Bearer {}", MockConfig::VALID_TOKEN));
    let route = path.split('?').next().unwrap_or("");

    match (method.as_str(), route) {
        ("POST", "/authentication/login") | ("POST", "/authentication/register") => {
            if body.contains(MockConfig::VALID_PASSWORD) {
                let response = format!(
                    r#"{{"token": "{}", "email": "ana@example.com"}}"#,
                    MockConfig::VALID_TOKEN
                );
                send_response(&mut stream, 200, &response);
            } else {
                send_response(&mut stream, 401, r#"{"message": "Credenciales inválidas"}"#);
            }
        }
        _ if !authorized => {
            send_response(&mut stream, 401, r#"{"message": "Token expirado"}"#);
        }
        ("GET", "/expenses_category") => {
            send_response(
                &mut stream,
                200,
                r#"[{"id": 1, "name": "Comida"}, {"id": 2, "name": "Transporte"}]"#,
            );
        }
        ("GET", "/expenses_summary") => {
            send_response(
                &mut stream,
                200,
                r#"[
                    {"id": 1, "category": {"id": 1, "name": "Comida"}, "year": 2025, "month": 6, "amount": 120.5},
                    {"id": 2, "expenseCategory": {"id": 2, "name": "Transporte"}, "year": 2025, "month": 6, "amount": 40},
                    {"id": 3, "category": {"id": 1, "name": "Comida"}, "year": 2025, "month": 5, "amount": "99.90"}
                ]"#,
            );
        }
        ("GET", "/expenses/detail") => {
            send_response(
                &mut stream,
                200,
                r#"[
                    {"id": 10, "description": "Mercado", "amount": 80.5, "date": "2025-06-03", "category": {"id": 1, "name": "Comida"}},
                    {"id": 11, "amount": 40, "date": "2025-06-20", "category": {"id": 1, "name": "Comida"}}
                ]"#,
            );
        }
        ("POST", "/expenses") => {
            send_response(&mut stream, 201, r#"{"id": 99, "year": 2025, "month": 6}"#);
        }
        ("DELETE", r) if r.starts_with("/expenses/") => {
            let id = r.trim_start_matches("/expenses/");
            if id == MockConfig::MISSING_EXPENSE_ID.to_string() {
                send_response(&mut stream, 404, r#"{"message": "Gasto no encontrado"}"#);
            } else {
                send_response(&mut stream, 204, "");
            }
        }
        ("GET", "/goals") => {
            send_response(&mut stream, 200, r#"[{"id": 1, "targetAmount": 500}]"#);
        }
        ("POST", "/goals") => {
            let response = merge_id(2, &body);
            send_response(&mut stream, 201, &response);
        }
        ("PATCH", r) if r.starts_with("/goals/") => {
            let id = r.trim_start_matches("/goals/").parse::<i64>().unwrap_or(0);
            let response = merge_id(id, &body);
            send_response(&mut stream, 200, &response);
        }
        _ => {
            send_response(&mut stream, 404, r#"{"message": "Not found"}"#);
        }
    }
}

/// Echo a JSON object body back with an id
fn merge_id(id: i64, body: &str) -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(body).unwrap_or_else(|_| serde_json::json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("id".to_string(), serde_json::json!(id));
    }
    value.to_string()
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
