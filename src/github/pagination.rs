use serde::de::DeserializeOwned;
use tracing::debug;

use super::{GitHubError, Transport};

/// Records requested per page; a shorter page is the last one.
pub const PAGE_SIZE: usize = 100;

/// Whether the page walk should go on after a page was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Walk a list endpoint page by page, starting at page 1.
///
/// Each decoded page is handed to `visit`. The walk ends when a page is
/// empty, when a page holds fewer than [`PAGE_SIZE`] records, or when
/// `visit` returns [`Flow::Stop`]. The first failed page aborts the walk;
/// whatever `visit` collected so far stays with the caller.
pub async fn paginate<T, F>(
    transport: &dyn Transport,
    path: &str,
    query: &[(&str, String)],
    mut visit: F,
) -> Result<(), GitHubError>
where
    T: DeserializeOwned,
    F: FnMut(Vec<T>) -> Flow,
{
    let mut page: u32 = 1;
    loop {
        let mut params = query.to_vec();
        params.push(("per_page", PAGE_SIZE.to_string()));
        params.push(("page", page.to_string()));

        let body = transport.get(path, &params).await?.into_body()?;
        let items: Vec<T> = serde_json::from_str(&body)?;
        let count = items.len();
        debug!(path, page, count, "received page");

        if count == 0 || visit(items) == Flow::Stop || count < PAGE_SIZE {
            return Ok(());
        }
        page += 1;
    }
}
