//! download_with_progress - リモートのファイルをディスクへストリーミングする
//!
//! gzip / deflate は reqwest の feature で展開されます。再送はしません（呼び出し側の責務）。
//! 受信中は `<dest>.part` に書き、完了してから `dest` へ rename します。
//! 途中で失敗したら `.part` は消すので、`dest` に中途半端なファイルは残りません。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::time::Instant;

use crate::domain::PublisherError;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadReport {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl DownloadReport {
    /// Average throughput in MiB/s.
    pub fn mib_per_sec(&self) -> f64 {
        throughput(self.bytes, self.elapsed)
    }
}

fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    bytes as f64 / MIB / secs
}

/// Stream `url` into `dest`, logging cumulative throughput at most once per second.
pub async fn download_with_progress(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<DownloadReport, PublisherError> {
    let download_error = |source: reqwest::Error| PublisherError::Download {
        url: url.to_string(),
        source,
    };
    let io_error = |context: &'static str, source: std::io::Error| PublisherError::Io {
        context,
        path: dest.to_path_buf(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(download_error)?;

    let partial = partial_path(dest);
    let started = Instant::now();
    let bytes = match stream_to_file(response, &partial, url, started).await {
        Ok(bytes) => bytes,
        Err(e) => {
            match tokio::fs::remove_file(&partial).await {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    tracing::warn!(
                        path = %partial.display(),
                        error = %cleanup,
                        "failed to remove partial download"
                    );
                }
                _ => {}
            }
            return Err(e);
        }
    };
    tokio::fs::rename(&partial, dest)
        .await
        .map_err(|e| io_error("failed to move download into place", e))?;

    let report = DownloadReport {
        bytes,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        url,
        dest = %dest.display(),
        bytes,
        mib_per_sec = format_args!("{:.2}", report.mib_per_sec()),
        "download finished"
    );
    Ok(report)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(
    response: reqwest::Response,
    path: &Path,
    url: &str,
    started: Instant,
) -> Result<u64, PublisherError> {
    let io_error = |context: &'static str, source: std::io::Error| PublisherError::Io {
        context,
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| io_error("failed to create download target", e))?;
    let mut writer = BufWriter::new(file);

    let mut last_log = started;
    let mut bytes: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| PublisherError::Download {
            url: url.to_string(),
            source,
        })?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| io_error("failed to write download target", e))?;
        bytes += chunk.len() as u64;

        if last_log.elapsed() >= PROGRESS_INTERVAL {
            last_log = Instant::now();
            tracing::info!(
                url,
                downloaded_mib = format_args!("{:.2}", bytes as f64 / MIB),
                mib_per_sec = format_args!("{:.2}", throughput(bytes, started.elapsed())),
                "download progress"
            );
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| io_error("failed to write download target", e))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn writes_served_bytes() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        Mock::given(method("GET"))
            .and(path("/dump.ttl"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dump.ttl");
        let report = download_with_progress(
            &reqwest::Client::new(),
            &format!("{}/dump.ttl", server.uri()),
            &dest,
        )
        .await
        .unwrap();

        assert_eq!(report.bytes, body.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
    }

    #[tokio::test]
    async fn non_success_status_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.ttl");
        let err = download_with_progress(
            &reqwest::Client::new(),
            &format!("{}/missing.ttl", server.uri()),
            &dest,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublisherError::Download { .. }));
        assert!(!dest.exists());
    }

    /// Serve one response that announces more bytes than it sends, then hang up.
    async fn truncating_server() -> String {
        const HEAD: &[u8] = b"HTTP/1.1 200 OK\r\ncontent-length: 100000\r\n\r\n";

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut request).await;
            socket.write_all(HEAD).await.unwrap();
            socket.write_all(b"<http://x/1> <http://x/p> ").await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/dump.ttl")
    }

    #[tokio::test]
    async fn interrupted_stream_leaves_no_file() {
        let url = truncating_server().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dump.ttl");

        let err = download_with_progress(&reqwest::Client::new(), &url, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, PublisherError::Download { .. }), "{err}");
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn partial_file_sits_next_to_the_target() {
        assert_eq!(
            partial_path(Path::new("/share/out/dump.ttl")),
            PathBuf::from("/share/out/dump.ttl.part")
        );
    }

    #[test]
    fn zero_elapsed_has_zero_throughput() {
        assert_eq!(throughput(1024, Duration::ZERO), 0.0);
        assert_eq!(throughput(2 * 1024 * 1024, Duration::from_secs(2)), 1.0);
    }
}
