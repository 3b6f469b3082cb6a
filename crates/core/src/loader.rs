use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::Dataset;

pub const DEFAULT_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/tree_map/video-game-sales-data.json";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::File(PathBuf::from(s))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::Url(u) => u.clone(),
            DataSource::File(p) => p.display().to_string(),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_URL.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum LoadMsg {
    Done(Dataset),
    Failed(String),
}

/// Fetch and parse the dataset. Exactly one request or file read is made;
/// there is no retry.
pub fn load(source: &DataSource) -> Result<Dataset, LoadError> {
    let body = match source {
        DataSource::Url(url) => fetch(url)?,
        DataSource::File(path) => std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?,
    };
    let data: Dataset = serde_json::from_str(&body).map_err(|e| LoadError::Parse {
        origin: source.describe(),
        source: e,
    })?;
    tracing::debug!(
        origin = %source.describe(),
        groups = data.children.len(),
        "dataset loaded"
    );
    Ok(data)
}

fn fetch(url: &str) -> Result<String, LoadError> {
    let request_err = |source| LoadError::Request {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("salesmap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(request_err)?;
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(request_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(request_err)
}

/// Run [`load`] on a worker thread and report the outcome over `tx`.
pub fn spawn_load(source: DataSource, tx: Sender<LoadMsg>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let msg = match load(&source) {
            Ok(data) => LoadMsg::Done(data),
            Err(e) => LoadMsg::Failed(e.to_string()),
        };
        let _ = tx.send(msg);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("salesmap-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parse_picks_url_or_file() {
        assert_eq!(
            DataSource::parse("https://example.com/data.json"),
            DataSource::Url("https://example.com/data.json".into())
        );
        assert_eq!(
            DataSource::parse("data/sales.json"),
            DataSource::File(PathBuf::from("data/sales.json"))
        );
    }

    #[test]
    fn loads_from_file() {
        let path = temp_file(
            "ok.json",
            r#"{"name":"root","children":[{"name":"NES","children":[{"name":"Duck Hunt","category":"Shooter","value":"28.31"}]}]}"#,
        );
        let data = load(&DataSource::File(path.clone())).unwrap();
        assert_eq!(data.children[0].children[0].name, "Duck Hunt");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn malformed_json_is_an_error() {
        let path = temp_file("bad.json", "{ not json");
        let err = load(&DataSource::File(path.clone())).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load(&DataSource::File(PathBuf::from("/nonexistent/salesmap.json"))).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn refused_connection_is_an_error() {
        let err = load(&DataSource::Url("http://127.0.0.1:9/data.json".into())).unwrap_err();
        assert!(matches!(err, LoadError::Request { .. }));
    }

    #[test]
    fn error_status_is_reported_with_its_code() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .unwrap();
        });
        let url = format!("http://{addr}/video-game-sales-data.json");
        let err = load(&DataSource::Url(url.clone())).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, LoadError::Status { status: 404, .. }), "{err}");
        assert_eq!(err.to_string(), format!("{url} answered with status 404"));
    }

    #[test]
    fn worker_reports_failure() {
        let (tx, rx) = crossbeam_channel::unbounded();
        spawn_load(DataSource::File(PathBuf::from("/nonexistent/salesmap.json")), tx)
            .join()
            .unwrap();
        assert!(matches!(rx.recv().unwrap(), LoadMsg::Failed(_)));
    }
}
