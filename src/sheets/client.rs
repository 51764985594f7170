// src/sheets/client.rs
use crate::utils::error::SheetError;
use reqwest::header;

/// Creates a reqwest client for the sheet exports.
fn build_sheet_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        // Transport defaults only; no timeout or retry configuration
        .build()
}

/// Downloads a published sheet export and returns the body as text.
/// Non-2xx statuses, network failures and bodies that are not valid UTF-8 all surface as `SheetError`.
pub async fn fetch_sheet_csv(url: &str) -> Result<String, SheetError> {
    let client = build_sheet_client()?; // Propagate client build error if any

    tracing::info!("Downloading sheet from: {}", url);

    let response = client.get(url)
        .header(header::ACCEPT, "text/csv,text/plain,*/*")
        .send()
        .await?; // Propagates reqwest::Error as SheetError::Network

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        return Err(SheetError::Http(status));
    }

    // Exports are UTF-8 whatever the charset header says; no lossy decoding
    let bytes = response.bytes().await?;
    let body = String::from_utf8(bytes.to_vec())?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response on a local port and returns the URL to hit.
    async fn serve_once(response: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}/pub?output=csv", addr)
    }

    fn http_response(status_line: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[test]
    fn test_invalid_url_is_a_network_error() {
        let result = tokio_test::block_on(fetch_sheet_csv("not a url"));
        assert!(matches!(result, Err(SheetError::Network(_))), "Unexpected result: {:?}", result);
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let url = serve_once(http_response("200 OK", ",31 Jan\n,9:00\n".as_bytes())).await;
        let body = fetch_sheet_csv(&url).await.unwrap();
        assert_eq!(body, ",31 Jan\n,9:00\n");
    }

    #[tokio::test]
    async fn test_not_found_is_an_http_error() {
        let url = serve_once(http_response("404 Not Found", b"")).await;
        let result = fetch_sheet_csv(&url).await;
        assert!(
            matches!(result, Err(SheetError::Http(status)) if status == reqwest::StatusCode::NOT_FOUND),
            "Unexpected result: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_a_decode_error() {
        let url = serve_once(http_response("200 OK", b",\xff\xfe31 Jan\n")).await;
        let result = fetch_sheet_csv(&url).await;
        assert!(matches!(result, Err(SheetError::Decode(_))), "Unexpected result: {:?}", result);
    }
}
