//! Production herald client.

use super::http::{AsyncHttpClient, AsyncReqwestClient};
use super::types::{FightSource, HeraldError};
use crate::record::FightId;

/// Base URL of the Eden herald.
pub const DEFAULT_BASE_URL: &str = "https://eden-daoc.net";

/// Name of the session cookie issued at login.
const SESSION_COOKIE: &str = "eden_daoc_sid";

/// Requests the single-letter-key payload variant.
const MINIFIED_HEADER: (&str, &str) = ("X-Herald-Api", "minified");

/// HTTP-backed [`FightSource`] for the Eden herald.
///
/// Authentication is a session cookie whose token is obtained out of band
/// (browser login is not this crate's concern); the token is treated as an
/// opaque string. Detail responses are requested in the minified format
/// that [`FightDetail`](crate::record::FightDetail) parses.
///
/// # Example
///
/// ```ignore
/// use fightfeed::herald::HeraldClient;
///
/// let client = HeraldClient::new(session_token)?;
/// let bytes = client.fight_detail(&"f_91c2".into()).await?;
/// ```
pub struct HeraldClient<C> {
    http: C,
    base_url: String,
    session_cookie: String,
}

impl HeraldClient<AsyncReqwestClient> {
    /// Creates a client against the default herald with a pooled reqwest
    /// transport.
    pub fn new(session_token: impl Into<String>) -> Result<Self, HeraldError> {
        Ok(Self::with_client(
            AsyncReqwestClient::new()?,
            DEFAULT_BASE_URL,
            session_token,
        ))
    }
}

impl<C: AsyncHttpClient> HeraldClient<C> {
    /// Creates a client over an arbitrary HTTP implementation.
    pub fn with_client(
        http: C,
        base_url: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session_cookie: format!("{}={}", SESSION_COOKIE, session_token.into()),
        }
    }

    fn detail_url(&self, id: &FightId) -> String {
        format!("{}/fghts/fight.php?{}", self.base_url, id)
    }

    fn class_config_url(&self) -> String {
        format!("{}/chrplan/daoc.json", self.base_url)
    }
}

impl<C: AsyncHttpClient + Send + Sync + 'static> FightSource for HeraldClient<C> {
    async fn fight_detail(&self, id: &FightId) -> Result<Vec<u8>, HeraldError> {
        let url = self.detail_url(id);
        self.http
            .get_with_headers(&url, &[MINIFIED_HEADER, ("Cookie", &self.session_cookie)])
            .await
    }

    async fn class_config(&self) -> Result<Vec<u8>, HeraldError> {
        let url = self.class_config_url();
        self.http
            .get_with_headers(&url, &[("Cookie", &self.session_cookie)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::herald::http::tests::MockAsyncHttpClient;

    fn client(mock: MockAsyncHttpClient) -> HeraldClient<MockAsyncHttpClient> {
        HeraldClient::with_client(mock, "https://herald.test/", "tok3n")
    }

    #[tokio::test]
    async fn detail_request_hits_fight_endpoint_with_session() {
        let herald = client(MockAsyncHttpClient::returning(Ok(b"{}".to_vec())));

        herald.fight_detail(&"f_1".into()).await.unwrap();

        let requests = herald.http.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://herald.test/fghts/fight.php?f_1");
        assert!(requests[0]
            .headers
            .contains(&("X-Herald-Api".into(), "minified".into())));
        assert!(requests[0]
            .headers
            .contains(&("Cookie".into(), "eden_daoc_sid=tok3n".into())));
    }

    #[tokio::test]
    async fn class_config_request_hits_config_endpoint() {
        let herald = client(MockAsyncHttpClient::returning(Ok(b"{}".to_vec())));

        herald.class_config().await.unwrap();

        let requests = herald.http.requests.lock().unwrap();
        assert_eq!(requests[0].url, "https://herald.test/chrplan/daoc.json");
    }

    #[tokio::test]
    async fn http_errors_pass_through() {
        let herald = client(MockAsyncHttpClient::returning(Err(HeraldError::Http {
            status: 404,
        })));

        let result = herald.fight_detail(&"gone".into()).await;
        assert_eq!(result, Err(HeraldError::Http { status: 404 }));
    }
}
