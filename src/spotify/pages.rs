//! Draining of paginated Spotify collections.
//!
//! Spotify list endpoints return pages with an `items` array and a `next`
//! URL. The helpers here flatten those into a single ordered sequence. They
//! do not retry anything themselves - retrying is layered underneath in
//! [`super::client`] - and they enforce no page limit of their own; the
//! API's pagination is trusted to terminate.

use serde::de::DeserializeOwned;

use crate::spotify::client::{ApiClient, ApiError, Transport};
use crate::types::Page;

/// Fetches every remaining page after `first` and returns the flattened,
/// ordered item sequence.
pub async fn fetch_all<T, C>(client: &ApiClient<C>, first: Page<T>) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned,
    C: Transport,
{
    let Page {
        mut items,
        mut next,
        ..
    } = first;

    while let Some(url) = next {
        let page: Page<T> = client.get(&url).await?;
        items.extend(page.items);
        next = page.next;
    }

    Ok(items)
}

/// Fetches pages while applying a pluggable keep/stop predicate.
///
/// For each page, `keep` receives the raw items and returns the items worth
/// keeping plus a flag saying whether further pages should be fetched at
/// all. This supports windowed scans such as "keep current-year releases,
/// but only stop once every album kind group has been seen" without
/// hardcoding the domain rule here.
pub async fn fetch_filtered<T, C, F>(
    client: &ApiClient<C>,
    first: Page<T>,
    mut keep: F,
) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned,
    C: Transport,
    F: FnMut(Vec<T>) -> (Vec<T>, bool),
{
    let mut contents: Vec<T> = Vec::new();
    let mut page = first;

    loop {
        let Page { items, next, .. } = page;
        let (kept, fetch_more) = keep(items);
        contents.extend(kept);

        match next {
            Some(url) if fetch_more => page = client.get(&url).await?,
            _ => break,
        }
    }

    Ok(contents)
}
