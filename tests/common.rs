//! Common test utilities
//!
//! Shared functionality used across all test modules: an in-process HTTP
//! fixture server, fake viewer and catalog, and archive helpers.
// Common test utilities - all must be public

use async_trait::async_trait;
use mangaka::prelude::*;
use mangaka::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned response.
#[derive(Clone, Debug)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
}

#[allow(dead_code)]
impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::ok(value.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Minimal HTTP/1.1 server answering GETs from a fixed route table.
///
/// Routes are matched on the path without the query string. Unknown paths get
/// a 404. Every request target (with query) is recorded.
pub struct FixtureServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    task: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl FixtureServer {
    pub async fn start(routes: Vec<(&str, Route)>) -> Self {
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, route)| (path.to_string(), route))
                .collect(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &log).await;
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    log: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().push(target.clone());

    let path = target.split('?').next().unwrap_or("/");
    let route = routes
        .get(path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));

    if !route.delay.is_zero() {
        tokio::time::sleep(route.delay).await;
    }

    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&route.body).await?;
    stream.shutdown().await
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Deterministic fake image bytes for page `n`.
#[allow(dead_code)]
pub fn page_bytes(n: usize) -> Vec<u8> {
    let mut bytes = format!("page-{}-", n).into_bytes();
    bytes.extend((0..512).map(|i| ((i * 31 + n) % 251) as u8));
    bytes
}

/// Records every path handed to it instead of launching anything.
#[derive(Default)]
pub struct RecordingViewer {
    pub opened: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingViewer {
    pub fn failing() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().clone()
    }
}

impl Viewer for RecordingViewer {
    fn open(&self, path: &Path) -> Result<()> {
        if self.fail {
            return Err(Error::viewer("no display"));
        }
        self.opened.lock().push(path.to_path_buf());
        Ok(())
    }
}

/// Catalog returning fixed page URLs per chapter and counting lookups.
#[derive(Default)]
pub struct FakeSource {
    pub pages: HashMap<String, Vec<String>>,
    pub page_lookups: Mutex<usize>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn with_chapter(mut self, chapter_id: &str, urls: Vec<String>) -> Self {
        self.pages.insert(chapter_id.to_string(), urls);
        self
    }

    pub fn lookups(&self) -> usize {
        *self.page_lookups.lock()
    }
}

#[async_trait]
impl Source for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(&self, _params: SearchParams) -> Result<SearchPage> {
        Ok(SearchPage::default())
    }

    async fn get_chapters(&self, _manga_id: &str) -> Result<Vec<Chapter>> {
        Ok(Vec::new())
    }

    async fn get_pages(&self, chapter_id: &str) -> Result<Vec<String>> {
        *self.page_lookups.lock() += 1;
        self.pages
            .get(chapter_id)
            .cloned()
            .ok_or_else(|| Error::not_found(chapter_id.to_string()))
    }
}

/// Reads every entry of an archive as (name, bytes), in stored order.
#[allow(dead_code)]
pub fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), bytes)
        })
        .collect()
}

/// Lists file names in a directory, sorted.
#[allow(dead_code)]
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
