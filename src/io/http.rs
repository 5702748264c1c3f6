use reqwest::blocking::Client;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use super::RandomRead;
use crate::error::{Result, ZipError};

fn http_err(msg: String) -> io::Error {
    io::Error::other(msg)
}

/// Shared view of an [`HttpSource`]'s transfer statistics.
///
/// The source itself is moved into the archive, so callers that want to
/// report traffic afterwards clone this counter first.
#[derive(Clone)]
pub struct TransferCounter(Arc<AtomicU64>);

impl TransferCounter {
    /// Total bytes fetched from the network so far.
    pub fn bytes(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// HTTP Range source for remote ZIP files.
pub struct HttpSource {
    client: Client,
    url: String,
    size: u64,
    transferred: Arc<AtomicU64>,
    max_retry: u32,
}

impl HttpSource {
    /// Create a new HTTP Range source.
    ///
    /// Sends a HEAD request to verify Range support and get the file size.
    pub fn open(url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ZipError::Io(http_err(e.to_string())))?;

        let resp = client
            .head(&url)
            .send()
            .map_err(|e| ZipError::Io(http_err(e.to_string())))?;

        if !resp.status().is_success() {
            return Err(ZipError::Io(http_err(format!(
                "HTTP request failed with status: {}",
                resp.status()
            ))));
        }

        // The server must advertise Range support; without it every read
        // would pull the whole file.
        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");

        if !accept_ranges.contains("bytes") {
            return Err(ZipError::Io(http_err(
                "remote server does not support Range requests".to_string(),
            )));
        }

        let size = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                ZipError::Io(http_err(
                    "remote server did not return Content-Length".to_string(),
                ))
            })?;

        Ok(Self {
            client,
            url,
            size,
            transferred: Arc::new(AtomicU64::new(0)),
            max_retry: 10,
        })
    }

    /// Handle for querying transferred bytes after the source has been
    /// handed to an archive.
    pub fn transfer_counter(&self) -> TransferCounter {
        TransferCounter(Arc::clone(&self.transferred))
    }
}

impl RandomRead for HttpSource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        let end = (offset + buf.len() as u64 - 1).min(self.size - 1);
        let expected_size = (end - offset + 1) as usize;

        let mut received = 0;
        let mut retry_count = 0;

        while received < expected_size {
            let current_start = offset + received as u64;
            let range = format!("bytes={}-{}", current_start, end);

            let result = self.client.get(&self.url).header("Range", &range).send();

            match result {
                Ok(resp) => {
                    if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        return Err(http_err(format!(
                            "HTTP request failed with status: {}",
                            resp.status()
                        )));
                    }

                    let bytes = resp.bytes().map_err(|e| http_err(e.to_string()))?;
                    let chunk_len = bytes.len().min(expected_size - received);

                    // A 206 with an empty body makes no progress; without a
                    // retry budget this loop would re-request forever.
                    if chunk_len == 0 {
                        retry_count += 1;
                        if retry_count >= self.max_retry {
                            return Err(http_err("max retries exceeded".to_string()));
                        }
                        continue;
                    }

                    buf[received..received + chunk_len].copy_from_slice(&bytes[..chunk_len]);
                    received += chunk_len;

                    self.transferred
                        .fetch_add(chunk_len as u64, Ordering::Relaxed);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        return Err(http_err("max retries exceeded".to_string()));
                    }
                    eprintln!(
                        "Connection error, retry {}/{}: {}",
                        retry_count, self.max_retry, e
                    );
                    thread::sleep(Duration::from_millis(500 * retry_count as u64));
                }
                Err(e) => return Err(http_err(e.to_string())),
            }
        }

        Ok(received)
    }

    fn len(&self) -> u64 {
        self.size
    }
}
