//! Session acquisition and credential refresh.
//!
//! Users arrive with stored token material; the initial authorization flow
//! happens outside this binary. Acquiring a session probes `/me` with the
//! stored access token and, only on a 401, refreshes through the token
//! endpoint and retries the probe once. Live clients are kept in an
//! explicit bounded cache keyed by access token, with manual invalidation
//! when a token turns out to be dead.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::config;
use crate::spotify::client::{ApiClient, ApiError, HttpTransport, Transport};
use crate::types::{CurrentUser, SpotifyKeys, Token};

const CLIENT_CACHE_CAP: usize = 64;

/// Bounded cache of live API clients keyed by access token.
///
/// Eviction is explicit: FIFO when the cap is hit, and manual via
/// [`ClientCache::evict`] when a 401 proves a token dead. The underlying
/// transport (and its connection pool) is shared by every cached client.
pub struct ClientCache<C: Transport = HttpTransport> {
    transport: Arc<C>,
    inner: Mutex<CacheInner<C>>,
}

struct CacheInner<C: Transport> {
    clients: HashMap<String, ApiClient<C>>,
    order: VecDeque<String>,
}

impl<C: Transport> ClientCache<C> {
    pub fn new(transport: Arc<C>) -> Self {
        Self {
            transport,
            inner: Mutex::new(CacheInner {
                clients: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Returns the cached client for `token`, creating and caching one when
    /// absent. The oldest entry is dropped once the cap is reached.
    pub async fn obtain(&self, token: &str) -> ApiClient<C> {
        let mut inner = self.inner.lock().await;
        if let Some(client) = inner.clients.get(token) {
            return client.clone();
        }

        while inner.clients.len() >= CLIENT_CACHE_CAP {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.clients.remove(&oldest);
                }
                None => break,
            }
        }

        let client = ApiClient::new(Arc::clone(&self.transport), token);
        inner.clients.insert(token.to_string(), client.clone());
        inner.order.push_back(token.to_string());
        client
    }

    /// Drops the entry for `token`, if any. Called on 401.
    pub async fn evict(&self, token: &str) {
        let mut inner = self.inner.lock().await;
        inner.clients.remove(token);
        inner.order.retain(|t| t != token);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.clients.len()
    }
}

/// An authenticated view of one user against the Spotify API.
pub struct Session<C: Transport> {
    pub client: ApiClient<C>,
    pub user: CurrentUser,
    pub token: Token,
}

/// Acquires a session for stored token material.
///
/// Returns the session plus a flag telling the caller whether the token was
/// refreshed along the way and needs persisting. Any failure other than a
/// 401 on the probe is propagated untouched; a second 401 after a refresh
/// is terminal too.
pub async fn spotify_session(
    keys: &SpotifyKeys,
    token: &Token,
    cache: &ClientCache,
) -> Result<(Session<HttpTransport>, bool), ApiError> {
    let me_url = format!("{}/me", config::spotify_apiurl());

    let client = cache.obtain(&token.access_token).await;
    match client.get::<CurrentUser>(&me_url).await {
        Ok(user) => Ok((
            Session {
                client,
                user,
                token: token.clone(),
            },
            false,
        )),
        Err(err) if err.is_unauthorized() => {
            cache.evict(&token.access_token).await;
            let refreshed = refresh_access_token(keys, token).await?;
            let client = cache.obtain(&refreshed.access_token).await;
            let user = client.get::<CurrentUser>(&me_url).await?;
            Ok((
                Session {
                    client,
                    user,
                    token: refreshed,
                },
                true,
            ))
        }
        Err(err) => Err(err),
    }
}

/// Exchanges a refresh token for fresh token material.
///
/// Spotify does not always return a new refresh token; the stored one is
/// carried over in that case. A response without an access token is a
/// decode failure, never an empty credential.
pub async fn refresh_access_token(keys: &SpotifyKeys, current: &Token) -> Result<Token, ApiError> {
    refresh_from(keys, current, config::spotify_apitoken_url()).await
}

async fn refresh_from(keys: &SpotifyKeys, current: &Token, url: String) -> Result<Token, ApiError> {
    let client = Client::new();

    let response = client
        .post(&url)
        .basic_auth(&keys.client_id, Some(&keys.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", &current.refresh_token),
        ])
        .send()
        .await
        .map_err(|e| ApiError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| ApiError::Transport {
        url: url.clone(),
        message: e.to_string(),
    })?;

    if !(200..300).contains(&status) {
        return Err(ApiError::Status {
            status,
            url,
            message: body.trim().to_string(),
        });
    }

    let json: serde_json::Value =
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })?;

    let access_token = json["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Decode {
            url: url.clone(),
            message: "token response carries no access_token".to_string(),
        })?;

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or(&current.refresh_token)
            .to_string(),
        scope: json["scope"].as_str().unwrap_or(&current.scope).to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP request with the given JSON body, returning the URL.
    async fn token_endpoint(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}", addr)
    }

    fn keys() -> SpotifyKeys {
        SpotifyKeys {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn stored_token() -> Token {
        Token {
            access_token: "stale".to_string(),
            refresh_token: "keepme".to_string(),
            scope: "user-follow-read".to_string(),
            expires_in: 3600,
            obtained_at: 0,
        }
    }

    #[tokio::test]
    async fn refresh_carries_over_missing_fields() {
        let url = token_endpoint(r#"{"access_token":"fresh","expires_in":1800}"#).await;

        let token = refresh_from(&keys(), &stored_token(), url).await.unwrap();
        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token, "keepme");
        assert_eq!(token.scope, "user-follow-read");
        assert_eq!(token.expires_in, 1800);
    }

    #[tokio::test]
    async fn refresh_without_access_token_is_a_decode_error() {
        let url = token_endpoint(r#"{"token_type":"Bearer","expires_in":3600}"#).await;

        let err = refresh_from(&keys(), &stored_token(), url).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn refresh_with_empty_access_token_is_a_decode_error() {
        let url = token_endpoint(r#"{"access_token":""}"#).await;

        let err = refresh_from(&keys(), &stored_token(), url).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
