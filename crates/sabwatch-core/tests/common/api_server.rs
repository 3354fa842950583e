//! Minimal HTTP/1.1 server imitating the control API for integration tests.
//!
//! Routes on the `mode` query parameter. Queue bodies are served from a script
//! (the last one repeats); every request's query string is recorded.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Default)]
struct State {
    queue: VecDeque<String>,
    history: Option<String>,
    action_reply: String,
    queue_status: u16,
    requests: Vec<String>,
}

#[derive(Clone)]
pub struct ApiServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl ApiServer {
    /// Start in a background thread; runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            action_reply: r#"{"status": true}"#.to_string(),
            queue_status: 200,
            ..State::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Accept connections and hold them open without ever answering.
    /// Returns the base URL.
    pub fn start_silent() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming().flatten() {
                held.push(stream);
            }
        });
        format!("http://127.0.0.1:{}", port)
    }

    pub fn push_queue(&self, body: impl Into<String>) {
        self.state.lock().unwrap().queue.push_back(body.into());
    }

    pub fn set_history(&self, body: impl Into<String>) {
        self.state.lock().unwrap().history = Some(body.into());
    }

    pub fn set_action_reply(&self, body: impl Into<String>) {
        self.state.lock().unwrap().action_reply = body.into();
    }

    pub fn set_queue_status(&self, code: u16) {
        self.state.lock().unwrap().queue_status = code;
    }

    /// Recorded `mode[/name]` of every request, in arrival order.
    pub fn modes(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|q| {
                let url = url::Url::parse(&format!("http://x/api?{q}")).unwrap();
                let get = |k: &str| {
                    url.query_pairs()
                        .find(|(key, _)| key == k)
                        .map(|(_, v)| v.into_owned())
                };
                match (get("mode"), get("name")) {
                    (Some(m), Some(n)) => format!("{m}/{n}"),
                    (Some(m), None) => m,
                    _ => String::new(),
                }
            })
            .collect()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let target = request.split_whitespace().nth(1).unwrap_or("/");
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("").to_string();
    let url = url::Url::parse(&format!("http://x{target}")).unwrap();
    let mode = url
        .query_pairs()
        .find(|(k, _)| k == "mode")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    let (code, body) = {
        let mut st = state.lock().unwrap();
        st.requests.push(query);
        match mode.as_str() {
            "queue" if url.query_pairs().any(|(k, _)| k == "name") => {
                (200, st.action_reply.clone())
            }
            "queue" => {
                let body = if st.queue.len() > 1 {
                    st.queue.pop_front().unwrap_or_default()
                } else {
                    st.queue.front().cloned().unwrap_or_default()
                };
                (st.queue_status, body)
            }
            "history" => match &st.history {
                Some(h) => (200, h.clone()),
                None => (404, String::new()),
            },
            _ => (200, st.action_reply.clone()),
        }
    };

    let response = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Queue body with the given status, speed, slots, free space and jobs.
pub fn queue_body(status: &str, kbpersec: f64, slots: u32, disk_free_gb: f64, jobs: &str) -> String {
    format!(
        r#"{{"queue": {{"status": "{status}", "kbpersec": "{kbpersec:.2}", "noofslots": {slots},
            "diskspace1": "{disk_free_gb:.2}", "slots": [{jobs}]}}}}"#
    )
}
