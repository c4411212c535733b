//! Loading CSV text from a local path or an HTTP(S) URL.
//!
//! This is the only asynchronous step of the pipeline; normalization runs
//! once the whole body is in memory.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::debug;

use crate::errors::HeatmapError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BOM: char = '\u{feff}';

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>, HeatmapError> {
    let parsed = url.parse::<reqwest::Url>().map_err(|e| HeatmapError::file_read(url, e))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client
        .execute(req)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| HeatmapError::file_read(url, e))?;

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| HeatmapError::file_read(url, e))?;
    Ok(bytes.to_vec())
}

/// Reads `source` and returns its text, gunzipped when needed.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<String, HeatmapError> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source).await?
    } else {
        tokio::fs::read(source)
            .await
            .map_err(|e| HeatmapError::file_read(source, e))?
    };
    debug!(bytes = bytes.len(), "Source read");
    decode_text(source, bytes)
}

/// Turns raw bytes into text: gzip is detected by suffix or magic number and
/// a leading byte-order mark is dropped so it cannot hide the first header.
pub fn decode_text(source: &str, bytes: Vec<u8>) -> Result<String, HeatmapError> {
    let bytes = if source.ends_with(".gz") || bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut out)
            .map_err(|e| HeatmapError::file_read(source, e))?;
        debug!(decompressed = out.len(), "Gzip source decoded");
        out
    } else {
        bytes
    };

    let text = String::from_utf8(bytes).map_err(|e| HeatmapError::file_read(source, e))?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::env;
    use std::fs;
    use std::io::Write;

    const CSV: &str = "Post URL,Post publish date,Engagement\nhttp://x,2024-08-29,13\n";

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/export.csv"));
        assert!(is_remote("http://localhost/export.csv"));
        assert!(!is_remote("exports/http.csv"));
    }

    #[test]
    fn test_decode_plain_and_bom() {
        let text = decode_text("a.csv", format!("{BOM}{CSV}").into_bytes()).unwrap();
        assert_eq!(text, CSV);
    }

    #[test]
    fn test_decode_gzip_by_magic_number() {
        let text = decode_text("upload.bin", gzip(CSV.as_bytes())).unwrap();
        assert_eq!(text, CSV);
    }

    #[test]
    fn test_decode_rejects_invalid_utf8_and_bad_gzip() {
        let err = decode_text("a.csv", vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, HeatmapError::FileRead { .. }));

        let err = decode_text("a.csv.gz", b"not gzip".to_vec()).unwrap_err();
        assert!(matches!(err, HeatmapError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_load_local_gzip_file() {
        let path = temp_path("post_heatmap_test_load.csv.gz");
        fs::write(&path, gzip(CSV.as_bytes())).unwrap();

        let client = BasicClient::new().unwrap();
        let text = load_source(&client, &path).await.unwrap();
        assert_eq!(text, CSV);

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_file_read_error() {
        let client = BasicClient::new().unwrap();
        let err = load_source(&client, "/nonexistent/post_heatmap.csv")
            .await
            .unwrap_err();
        match err {
            HeatmapError::FileRead { source_name, .. } => {
                assert_eq!(source_name, "/nonexistent/post_heatmap.csv")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
