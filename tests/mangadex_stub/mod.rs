#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use mangafetch::client::ClientConfig;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct StubRequest {
    pub base_url: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub received_at: Instant,
}

impl StubRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

pub struct StubResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

pub fn json_response(value: Value) -> StubResponse {
    StubResponse {
        status: 200,
        body: value.to_string().into_bytes(),
        content_type: "application/json",
    }
}

pub fn image_response(bytes: &[u8]) -> StubResponse {
    StubResponse {
        status: 200,
        body: bytes.to_vec(),
        content_type: "image/jpeg",
    }
}

pub fn status_response(status: u16) -> StubResponse {
    StubResponse {
        status,
        body: b"{\"result\":\"error\"}".to_vec(),
        content_type: "application/json",
    }
}

/// One feed element as the listing endpoint returns it.
pub fn feed_chapter(id: &str, chapter: Option<&str>, lang: &str) -> Value {
    json!({
        "id": id,
        "type": "chapter",
        "attributes": {
            "chapter": chapter,
            "title": null,
            "translatedLanguage": lang,
            "hash": format!("hash-{id}"),
        }
    })
}

pub fn feed_page(chapters: Vec<Value>) -> StubResponse {
    json_response(json!({ "result": "ok", "data": chapters }))
}

/// Delivery-server answer pointing image requests back at the stub.
pub fn delivery(base_url: &str, hash: &str, full: &[&str], reduced: &[&str]) -> StubResponse {
    json_response(json!({
        "result": "ok",
        "baseUrl": base_url,
        "chapter": {
            "hash": hash,
            "data": full,
            "dataSaver": reduced,
        }
    }))
}

pub fn test_config(base_url: &str, page_size: usize) -> ClientConfig {
    ClientConfig {
        api_base: base_url.to_owned(),
        page_size,
        list_delay: Duration::ZERO,
        page_delay: Duration::ZERO,
        ..ClientConfig::default()
    }
}

pub struct MangadexStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MangadexStub {
    pub fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start mangadex stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_requests = Arc::clone(&requests);
        let thread_base_url = base_url.clone();
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let received_at = Instant::now();
                let parsed = url::Url::parse(&format!("{thread_base_url}{}", request.url()))
                    .expect("parse stub request url");
                let stub_request = StubRequest {
                    base_url: thread_base_url.clone(),
                    path: parsed.path().to_owned(),
                    query: parsed
                        .query_pairs()
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect(),
                    received_at,
                };

                let response = handler(&stub_request);
                thread_requests
                    .lock()
                    .expect("stub request log")
                    .push(stub_request);

                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    response.content_type.as_bytes(),
                )
                .expect("build header");
                let _ = request.respond(
                    tiny_http::Response::from_data(response.body)
                        .with_status_code(response.status)
                        .with_header(header),
                );
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().expect("stub request log").clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    /// Time between consecutive requests whose path satisfies `filter`.
    pub fn gaps(&self, filter: impl Fn(&str) -> bool) -> Vec<Duration> {
        let times: Vec<_> = self
            .requests()
            .into_iter()
            .filter(|r| filter(&r.path))
            .map(|r| r.received_at)
            .collect();
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

impl Drop for MangadexStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
