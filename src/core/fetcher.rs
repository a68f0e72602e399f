use crate::utils::error::{ImportError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use url::Url;

/// Opens dictionary sources (HTTP(S) URLs, `file://` URLs, or plain paths) as
/// a lazy line stream. Payload size is bounded while streaming; the fetch
/// deadline is enforced by the HTTP client.
#[derive(Clone)]
pub struct SourceFetcher {
    client: Client,
    max_bytes: u64,
    timeout_seconds: u64,
}

impl SourceFetcher {
    pub fn new(max_bytes: u64, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            max_bytes,
            timeout_seconds,
        })
    }

    pub async fn open(&self, source: &str) -> Result<LineStream> {
        match Url::parse(source) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                self.open_http(url).await
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| ImportError::InvalidSource {
                    reason: format!("invalid file URL: {}", source),
                })?;
                self.open_path(path).await
            }
            Ok(url) => Err(ImportError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            }),
            // Not parseable as a URL: treat as a local path.
            Err(_) => self.open_path(PathBuf::from(source)).await,
        }
    }

    async fn open_http(&self, url: Url) -> Result<LineStream> {
        tracing::debug!("Fetching dictionary source from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.map_http_error(e))?;

        let total_bytes = response.content_length();
        if let Some(len) = total_bytes {
            if len > self.max_bytes {
                return Err(ImportError::SizeLimitExceeded {
                    limit: self.max_bytes,
                });
            }
        }

        Ok(LineStream::new(
            ByteSource::Http(response),
            self.max_bytes,
            total_bytes,
            self.timeout_seconds,
        ))
    }

    async fn open_path(&self, path: PathBuf) -> Result<LineStream> {
        tracing::debug!("Reading dictionary source from {:?}", path);
        let metadata = tokio::fs::metadata(&path).await?;
        if metadata.len() > self.max_bytes {
            return Err(ImportError::SizeLimitExceeded {
                limit: self.max_bytes,
            });
        }

        let file = File::open(&path).await?;
        Ok(LineStream::new(
            ByteSource::File(file),
            self.max_bytes,
            Some(metadata.len()),
            self.timeout_seconds,
        ))
    }

    fn map_http_error(&self, e: reqwest::Error) -> ImportError {
        if e.is_timeout() {
            ImportError::FetchTimeout {
                seconds: self.timeout_seconds,
            }
        } else {
            ImportError::Http(e)
        }
    }
}

enum ByteSource {
    Http(reqwest::Response),
    File(File),
}

/// Lazy line sequence over a byte source. Bytes are pulled chunk by chunk and
/// counted against the size limit, so an oversized source fails mid-stream
/// instead of being buffered whole.
pub struct LineStream {
    source: ByteSource,
    buf: Vec<u8>,
    bytes_read: u64,
    lines_yielded: u64,
    total_bytes: Option<u64>,
    max_bytes: u64,
    timeout_seconds: u64,
    eof: bool,
}

impl LineStream {
    fn new(
        source: ByteSource,
        max_bytes: u64,
        total_bytes: Option<u64>,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            source,
            buf: Vec::new(),
            bytes_read: 0,
            lines_yielded: 0,
            total_bytes,
            max_bytes,
            timeout_seconds,
            eof: false,
        }
    }

    /// Total byte length of the source, when the transport reports one.
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn lines_yielded(&self) -> u64 {
        self.lines_yielded
    }

    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                self.lines_yielded += 1;
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                // Final line without a trailing newline.
                let mut line = std::mem::take(&mut self.buf);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                self.lines_yielded += 1;
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> Result<()> {
        let read = match &mut self.source {
            ByteSource::Http(response) => {
                let chunk = response.chunk().await.map_err(|e| {
                    if e.is_timeout() {
                        ImportError::FetchTimeout {
                            seconds: self.timeout_seconds,
                        }
                    } else {
                        ImportError::Http(e)
                    }
                })?;
                match chunk {
                    Some(bytes) => {
                        self.buf.extend_from_slice(&bytes);
                        bytes.len()
                    }
                    None => {
                        self.eof = true;
                        0
                    }
                }
            }
            ByteSource::File(file) => {
                let mut chunk = [0u8; 8192];
                let n = file.read(&mut chunk).await?;
                if n == 0 {
                    self.eof = true;
                } else {
                    self.buf.extend_from_slice(&chunk[..n]);
                }
                n
            }
        };

        self.bytes_read += read as u64;
        if self.bytes_read > self.max_bytes {
            return Err(ImportError::SizeLimitExceeded {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}
