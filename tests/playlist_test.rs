use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use sporlsync::spotify::client::{ApiClient, ApiRequest, ApiResponse, Transport, TransportError};
use sporlsync::spotify::playlist::add_tracks;

/// Transport with a canned response queue and a call counter.
struct FakeTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    calls: AtomicUsize,
}

impl FakeTransport {
    fn new(responses: Vec<ApiResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from(responses)),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    fn execute(
        &self,
        _token: &str,
        _request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        async move {
            match next {
                Some(response) => Ok(response),
                None => Err(TransportError::Failed("queue exhausted".to_string())),
            }
        }
    }
}

fn snapshot() -> ApiResponse {
    ApiResponse {
        status: 201,
        retry_after: None,
        body: r#"{"snapshot_id":"abc"}"#.to_string(),
    }
}

fn not_found() -> ApiResponse {
    ApiResponse {
        status: 404,
        retry_after: None,
        body: "{}".to_string(),
    }
}

fn uris(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("spotify:track:{}", i)).collect()
}

#[tokio::test(start_paused = true)]
async fn test_add_tracks_counts_only_successful_chunks() {
    // 150 uris split into chunks of 100 and 50; the second chunk fails
    let transport = FakeTransport::new(vec![snapshot(), not_found()]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let added = add_tracks(&client, "pl1", &uris(150), false).await;

    assert_eq!(transport.calls(), 2);
    assert_eq!(added, 100);
}

#[tokio::test(start_paused = true)]
async fn test_add_tracks_counts_everything_on_success() {
    let transport = FakeTransport::new(vec![snapshot(), snapshot(), snapshot()]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let added = add_tracks(&client, "pl1", &uris(250), true).await;

    assert_eq!(transport.calls(), 3);
    assert_eq!(added, 250);
}

#[tokio::test(start_paused = true)]
async fn test_add_tracks_with_nothing_to_add() {
    let transport = FakeTransport::new(vec![]);
    let client = ApiClient::new(Arc::clone(&transport), "token");

    let added = add_tracks(&client, "pl1", &[], false).await;

    assert_eq!(transport.calls(), 0);
    assert_eq!(added, 0);
}
