//! Shared HTTP client plumbing. One `reqwest::Client` is built once and
//! reused across all phases for connection-pool (keep-alive) efficiency
//! (SPEC_FULL.md §5 "Shared resources").

use std::time::Duration;

use bytes::Bytes;

const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Response-body size cap applied after decompression (SPEC_FULL.md §9 open
/// question: "HTTP body caps" — the original source doesn't cap; we do).
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .expect("reqwest client with static configuration should always build")
}

/// Fetch `url`, returning the body capped at [`MAX_BODY_BYTES`] and the HTTP
/// status. Streams the body so an over-budget response never fully buffers.
pub async fn get_capped(
    client: &reqwest::Client,
    url: &str,
) -> Result<(u16, String), reqwest::Error> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();

    let mut body = Vec::with_capacity(8 * 1024);
    let mut stream = response;
    while let Some(chunk) = stream.chunk().await? {
        push_capped(&mut body, &chunk);
        if body.len() >= MAX_BODY_BYTES {
            break;
        }
    }

    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

fn push_capped(body: &mut Vec<u8>, chunk: &Bytes) {
    let remaining = MAX_BODY_BYTES.saturating_sub(body.len());
    let take = remaining.min(chunk.len());
    body.extend_from_slice(&chunk[..take]);
}
