use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use sporlsync::spotify::client::{ApiClient, ApiRequest, ApiResponse, Transport, TransportError};
use sporlsync::spotify::pages::{fetch_all, fetch_filtered};
use sporlsync::types::{Page, PlaylistTrackItem};

/// Transport answering by URL, for exercising cursor walks.
struct RoutedTransport {
    routes: Mutex<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl RoutedTransport {
    fn new(routes: Vec<(&str, String)>) -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(
                routes
                    .into_iter()
                    .map(|(url, body)| (url.to_string(), body))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for RoutedTransport {
    fn execute(
        &self,
        _token: &str,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.routes.lock().unwrap().get(&request.url).cloned();
        async move {
            match body {
                Some(body) => Ok(ApiResponse {
                    status: 200,
                    retry_after: None,
                    body,
                }),
                None => Ok(ApiResponse {
                    status: 404,
                    retry_after: None,
                    body: "{}".to_string(),
                }),
            }
        }
    }
}

fn page_json(items: &[u32], next: Option<&str>) -> String {
    let items: Vec<String> = items.iter().map(|n| n.to_string()).collect();
    let next = match next {
        Some(url) => format!(r#""{}""#, url),
        None => "null".to_string(),
    };
    format!(r#"{{"items":[{}],"next":{},"total":null}}"#, items.join(","), next)
}

fn page(items: &[u32], next: Option<&str>) -> Page<u32> {
    Page {
        items: items.to_vec(),
        next: next.map(|s| s.to_string()),
        total: None,
    }
}

#[tokio::test]
async fn test_single_page_needs_no_fetch() {
    let transport = RoutedTransport::new(vec![]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let items = fetch_all(&client, page(&[1, 2, 3], None)).await.unwrap();
    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_linked_pages_concatenate_in_order() {
    let transport = RoutedTransport::new(vec![
        ("https://x.test/p2", page_json(&[4, 5], Some("https://x.test/p3"))),
        ("https://x.test/p3", page_json(&[6], None)),
    ]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let first = page(&[1, 2, 3], Some("https://x.test/p2"));
    let items = fetch_all(&client, first).await.unwrap();

    assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_null_track_slots_survive_deserialization() {
    let transport = RoutedTransport::new(vec![(
        "https://x.test/tracks?page=2",
        r#"{"items":[{"track":null}],"next":null,"total":null}"#.to_string(),
    )]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let first: Page<PlaylistTrackItem> = Page {
        items: vec![PlaylistTrackItem { track: None }],
        next: Some("https://x.test/tracks?page=2".to_string()),
        total: None,
    };
    let items = fetch_all(&client, first).await.unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.track.is_none()));
}

#[tokio::test]
async fn test_filtered_fetch_stops_on_predicate() {
    let transport = RoutedTransport::new(vec![
        ("https://x.test/p2", page_json(&[4, 5], Some("https://x.test/p3"))),
        ("https://x.test/p3", page_json(&[6], None)),
    ]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let first = page(&[1, 2, 3], Some("https://x.test/p2"));
    let mut pages_seen = 0;
    let kept = fetch_filtered(&client, first, |items| {
        pages_seen += 1;
        let keep: Vec<u32> = items.into_iter().filter(|n| n % 2 == 0).collect();
        (keep, pages_seen < 2)
    })
    .await
    .unwrap();

    // Page three was never requested
    assert_eq!(kept, vec![2, 4]);
    assert_eq!(pages_seen, 2);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_filtered_fetch_drains_when_predicate_allows() {
    let transport = RoutedTransport::new(vec![
        ("https://x.test/p2", page_json(&[4, 5], Some("https://x.test/p3"))),
        ("https://x.test/p3", page_json(&[6], None)),
    ]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let first = page(&[1, 2, 3], Some("https://x.test/p2"));
    let kept = fetch_filtered(&client, first, |items| (items, true)).await.unwrap();

    assert_eq!(kept, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(transport.calls(), 2);
}
