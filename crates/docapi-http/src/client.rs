//! The authenticated client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use docapi_core::{
    AccessToken, ApiKey, ApiResponse, ApiUrl, Credentials, HttpRequest, HttpResponse,
    MemoryTokenStore, Method, RefreshToken, ResponseOverrides, ResponseParts, Result, TokenStore,
    Transport,
};

use crate::endpoints::{
    LOGIN, LOGOUT, LoginRequest, LogoutRequest, REFRESH, RefreshRequest, RefreshedTokens,
    TokenPair,
};
use crate::response::{decode_success, failure, parse_body, transport_failure};
use crate::transport::ReqwestTransport;

const LOGIN_FAILED: &str = "login failed";
const LOGOUT_FAILED: &str = "logout failed";
const LOGGED_OUT: &str = "Logged out";
const REFRESH_FAILED: &str = "token refresh failed";
const NO_REFRESH_TOKEN: &str = "no refresh token available";
const REQUEST_FAILED: &str = "request failed";
const RETRY_FAILED: &str = "retried request failed";
const API_KEY_REJECTED: &str = "request with API key rejected; not retrying";

/// An authenticated client for a single backend.
///
/// Every operation returns an [`ApiResponse`]; none of them return `Err` or
/// panic. A request that gets a 401 while a refresh token is stored is
/// retried exactly once after refreshing the access token. Requests sent with
/// an API key are never retried.
///
/// Clients are cheap to clone and safe to share across tasks. Refreshes are
/// serialized: when several requests hit a 401 at once, the first one
/// refreshes and the others retry with its new token.
///
/// # Example
///
/// ```no_run
/// use docapi_core::Credentials;
/// use docapi_http::DocClient;
///
/// # async fn example() -> Result<(), docapi_core::Error> {
/// let client = DocClient::new("https://stage.document.no:3790")?;
/// let login = client
///     .login(&Credentials::new("dummy@test.com", "secret").with_domain("somewhere"))
///     .await;
/// if !login.is_success() {
///     eprintln!("{}", login);
/// }
///
/// let whoami = client.get::<serde_json::Value>("/api/v1/whoami").await;
/// if let Some(user) = whoami.success_data() {
///     println!("{}", user);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DocClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    api_url: ApiUrl,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
    api_key: RwLock<Option<ApiKey>>,
    debug: AtomicBool,
    tokens_enabled: AtomicBool,
    refresh_lock: Mutex<()>,
}

/// The credential attached to one attempt.
#[derive(Debug, Clone)]
enum Credential {
    ApiKey(ApiKey),
    /// Token mode; `None` is sent as `Bearer null`.
    Token(Option<AccessToken>),
    Anonymous,
}

impl Credential {
    fn header_value(&self) -> Option<String> {
        match self {
            Credential::ApiKey(key) => Some(format!("Bearer {}", key.as_str())),
            Credential::Token(Some(token)) => Some(format!("Bearer {}", token.as_str())),
            Credential::Token(None) => Some("Bearer null".to_string()),
            Credential::Anonymous => None,
        }
    }
}

impl DocClient {
    /// Create a client with in-memory token storage and the default transport.
    pub fn new(api_url: impl AsRef<str>) -> Result<Self> {
        Self::builder(api_url).build()
    }

    pub fn builder(api_url: impl AsRef<str>) -> ClientBuilder {
        ClientBuilder::new(api_url)
    }

    pub fn api_url(&self) -> &ApiUrl {
        &self.inner.api_url
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Toggle verbose diagnostics (response headers). No behavioral effect.
    pub fn set_debug(&self, debug: bool) {
        self.inner.debug.store(debug, Ordering::Relaxed);
    }

    pub fn debug(&self) -> bool {
        self.inner.debug.load(Ordering::Relaxed)
    }

    /// Enable or disable attaching the access token to requests, e.g. when the
    /// transport carries a session cookie instead.
    pub fn set_tokens_enabled(&self, enabled: bool) {
        self.inner.tokens_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn tokens_enabled(&self) -> bool {
        self.inner.tokens_enabled.load(Ordering::Relaxed)
    }

    pub fn api_key(&self) -> Option<ApiKey> {
        self.inner
            .api_key
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_api_key(&self, api_key: Option<ApiKey>) {
        *self.inner.api_key.write().unwrap_or_else(|e| e.into_inner()) = api_key;
    }

    pub async fn access_token(&self) -> Option<AccessToken> {
        self.inner.store.access_token().await
    }

    pub async fn set_access_token(&self, token: Option<AccessToken>) -> Result<()> {
        self.inner.store.set_access_token(token).await
    }

    pub async fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.store.refresh_token().await
    }

    pub async fn set_refresh_token(&self, token: Option<RefreshToken>) -> Result<()> {
        self.inner.store.set_refresh_token(token).await
    }

    // ========================================================================
    // Session Operations
    // ========================================================================

    /// Log in and store the returned token pair.
    #[instrument(skip(self, credentials), fields(api = %self.inner.api_url, login = %credentials.login()))]
    pub async fn login(&self, credentials: &Credentials) -> ApiResponse<TokenPair> {
        info!("Logging in");

        let body = LoginRequest {
            login: credentials.login(),
            password: credentials.password(),
            domain: credentials.domain(),
            fingerprint: credentials.fingerprint(),
        };
        let request = match self.session_request(LOGIN, &body) {
            Ok(request) => request,
            Err(reply) => return reply,
        };

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(reply) => return reply,
        };
        if !response.is_success() {
            warn!(status = response.status, "Login rejected");
            return failure(&response, LOGIN_FAILED);
        }

        let reply: ApiResponse<TokenPair> = decode_success(&response, "Logged in");
        let Some(tokens) = reply.success_data() else {
            return missing_payload(reply, "login response carried no tokens");
        };

        if let Err(err) = self.store_pair(tokens).await {
            return ApiResponse::error(err.to_string(), ResponseOverrides::new());
        }

        info!("Login successful");
        reply
    }

    /// Log out, optionally revoking a specific token.
    ///
    /// Stored tokens are cleared only when the backend confirms with a 2xx.
    /// A 2xx is a successful logout whatever its body; an empty `token` is
    /// treated as no token.
    #[instrument(skip(self, token), fields(api = %self.inner.api_url))]
    pub async fn logout(&self, token: Option<&str>) -> ApiResponse<Value> {
        info!("Logging out");

        let token = token.filter(|token| !token.is_empty());
        let request = match self.session_request(LOGOUT, &LogoutRequest { token }) {
            Ok(request) => request,
            Err(reply) => return reply,
        };

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(reply) => return reply,
        };
        if !response.is_success() {
            warn!(status = response.status, "Logout rejected; keeping tokens");
            return failure(&response, LOGOUT_FAILED);
        }

        if let Err(err) = self.clear_tokens().await {
            return ApiResponse::error(err.to_string(), ResponseOverrides::new());
        }

        info!("Logout successful");
        if let Err(err) = parse_body(&response) {
            debug!(error = %err, "Logout response is not JSON");
            return ApiResponse::from_parts(ResponseParts {
                success: true,
                code: response.status,
                message: LOGGED_OUT.into(),
                data: None,
                errors: Default::default(),
            });
        }
        decode_success(&response, LOGGED_OUT)
    }

    /// Exchange the stored refresh token for a new token pair.
    #[instrument(skip(self), fields(api = %self.inner.api_url))]
    async fn refresh(&self) -> ApiResponse<RefreshedTokens> {
        let Some(refresh_token) = self.inner.store.refresh_token().await else {
            return ApiResponse::error(NO_REFRESH_TOKEN, ResponseOverrides::new().code(401));
        };

        info!("Refreshing access token");

        let body = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };
        let request = match self.session_request(REFRESH, &body) {
            Ok(request) => request,
            Err(reply) => return reply,
        };

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(reply) => return reply,
        };
        if !response.is_success() {
            warn!(status = response.status, "Token refresh rejected");
            return failure(&response, REFRESH_FAILED);
        }

        let reply: ApiResponse<RefreshedTokens> = decode_success(&response, "Token refreshed");
        let Some(tokens) = reply.success_data() else {
            return missing_payload(reply, "refresh response carried no tokens");
        };

        let stored = async {
            self.inner
                .store
                .set_access_token(Some(tokens.access_token.clone()))
                .await?;
            // Backends that do not rotate refresh tokens keep the old one valid.
            if let Some(refresh_token) = &tokens.refresh_token {
                self.inner
                    .store
                    .set_refresh_token(Some(refresh_token.clone()))
                    .await?;
            }
            Ok::<_, docapi_core::Error>(())
        };
        if let Err(err) = stored.await {
            return ApiResponse::error(err.to_string(), ResponseOverrides::new());
        }

        debug!("Access token refreshed");
        reply
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Issue a request against `{api_url}{command}`.
    ///
    /// `R` is the type of the backend's `data` field; use
    /// [`serde::de::IgnoredAny`] to discard it.
    #[instrument(skip(self, body), fields(api = %self.inner.api_url))]
    pub async fn request<B, R>(&self, method: Method, command: &str, body: Option<&B>) -> ApiResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = match body.map(serde_json::to_string).transpose() {
            Ok(body) => body,
            Err(err) => {
                return ApiResponse::error(
                    format!("failed to serialize request body: {}", err),
                    ResponseOverrides::new(),
                );
            }
        };
        let url = self.inner.api_url.endpoint(command);

        let credential = self.credential().await;
        // The refresh check compares against the token that was actually sent.
        let observed_access = match &credential {
            Credential::Token(token) => token.clone(),
            _ => self.inner.store.access_token().await,
        };
        let request = build_request(method, &url, body.as_deref(), &credential);

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(reply) => return reply,
        };
        if response.is_success() {
            return decode_success(&response, docapi_core::envelope::OK_MESSAGE);
        }

        if matches!(credential, Credential::ApiKey(_)) {
            debug!(status = response.status, "Not retrying request sent with an API key");
            return failure(&response, API_KEY_REJECTED);
        }

        if response.status != 401 || self.inner.store.refresh_token().await.is_none() {
            return failure(&response, REQUEST_FAILED);
        }

        info!("Access token rejected; refreshing and retrying once");
        if let Err(refresh_failure) = self.refresh_after_unauthorized(observed_access).await {
            return ApiResponse::error(
                refresh_failure.message(),
                ResponseOverrides::new()
                    .code(refresh_failure.code())
                    .errors(refresh_failure.errors().clone()),
            );
        }

        let credential = self.credential().await;
        let retry = build_request(method, &url, body.as_deref(), &credential);

        match self.send(retry).await {
            Err(reply) => reply,
            Ok(response) if response.is_success() => {
                decode_success(&response, docapi_core::envelope::OK_MESSAGE)
            }
            Ok(response) => {
                warn!(status = response.status, "Retried request failed");
                failure(&response, RETRY_FAILED)
            }
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, command: &str) -> ApiResponse<R> {
        self.request::<(), R>(Method::Get, command, None).await
    }

    pub async fn post<B, R>(&self, command: &str, body: &B) -> ApiResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Post, command, Some(body)).await
    }

    pub async fn put<B, R>(&self, command: &str, body: &B) -> ApiResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Put, command, Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, command: &str) -> ApiResponse<R> {
        self.request::<(), R>(Method::Delete, command, None).await
    }

    /// DELETE with a JSON body.
    pub async fn delete_with<B, R>(&self, command: &str, body: &B) -> ApiResponse<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.request(Method::Delete, command, Some(body)).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn credential(&self) -> Credential {
        if let Some(key) = self.api_key() {
            Credential::ApiKey(key)
        } else if self.tokens_enabled() {
            Credential::Token(self.inner.store.access_token().await)
        } else {
            Credential::Anonymous
        }
    }

    /// Refresh once, unless a concurrent request already replaced the access
    /// token this request was sent with.
    async fn refresh_after_unauthorized(
        &self,
        observed_access: Option<AccessToken>,
    ) -> std::result::Result<(), ApiResponse<RefreshedTokens>> {
        let _guard = self.inner.refresh_lock.lock().await;

        if self.inner.store.access_token().await != observed_access {
            debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        let refreshed = self.refresh().await;
        if refreshed.success() {
            Ok(())
        } else {
            Err(refreshed)
        }
    }

    /// Login/logout/refresh requests carry no credential header.
    fn session_request<B: Serialize, R>(
        &self,
        command: &str,
        body: &B,
    ) -> std::result::Result<HttpRequest, ApiResponse<R>> {
        let body = serde_json::to_string(body).map_err(|e| {
            ApiResponse::error(
                format!("failed to serialize request body: {}", e),
                ResponseOverrides::new(),
            )
        })?;
        let url = self.inner.api_url.endpoint(command);
        Ok(build_request(Method::Post, &url, Some(&body), &Credential::Anonymous))
    }

    async fn send<R>(&self, request: HttpRequest) -> std::result::Result<HttpResponse, ApiResponse<R>> {
        debug!(method = %request.method, url = %request.url, "Sending request");
        trace!(?request, "request descriptor");

        match self.inner.transport.send(request).await {
            Ok(response) => {
                trace!(status = response.status, "Received response");
                if self.debug() {
                    info!(status = response.status, headers = ?response.headers, "Response headers");
                }
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "Transport failure");
                Err(transport_failure(&err))
            }
        }
    }

    async fn store_pair(&self, tokens: &TokenPair) -> Result<()> {
        self.inner
            .store
            .set_access_token(Some(tokens.access_token.clone()))
            .await?;
        self.inner
            .store
            .set_refresh_token(Some(tokens.refresh_token.clone()))
            .await
    }

    async fn clear_tokens(&self) -> Result<()> {
        self.inner.store.set_access_token(None).await?;
        self.inner.store.set_refresh_token(None).await
    }
}

fn build_request(
    method: Method,
    url: &str,
    body: Option<&str>,
    credential: &Credential,
) -> HttpRequest {
    let mut request = HttpRequest::new(method, url).header("Content-Type", "application/json");
    if let Some(value) = credential.header_value() {
        request = request.header("Authorization", value);
    }
    if let Some(body) = body {
        request = request.body(body);
    }
    request
}

/// A 2xx reply that should have carried a payload but did not, or could not
/// be decoded.
fn missing_payload<T>(reply: ApiResponse<T>, message: &str) -> ApiResponse<T> {
    if reply.success() {
        ApiResponse::error(message, ResponseOverrides::new().code(reply.code()))
    } else {
        reply
    }
}

impl std::fmt::Debug for DocClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocClient")
            .field("api_url", &self.inner.api_url)
            .field("api_key", &self.api_key().map(|_| "[REDACTED]"))
            .field("tokens", &"[REDACTED]")
            .field("debug", &self.debug())
            .field("tokens_enabled", &self.tokens_enabled())
            .finish()
    }
}

/// Builder for [`DocClient`].
pub struct ClientBuilder {
    api_url: String,
    api_key: Option<ApiKey>,
    store: Option<Arc<dyn TokenStore>>,
    transport: Option<Arc<dyn Transport>>,
    debug: bool,
    tokens_enabled: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    pub fn new(api_url: impl AsRef<str>) -> Self {
        Self {
            api_url: api_url.as_ref().to_string(),
            api_key: None,
            store: None,
            transport: None,
            debug: false,
            tokens_enabled: true,
            timeout: None,
            user_agent: None,
        }
    }

    /// Authenticate with a static API key instead of tokens.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(api_key));
        self
    }

    /// Where to keep the access/refresh pair. Defaults to [`MemoryTokenStore`].
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default `reqwest` transport. `timeout` and `user_agent`
    /// are ignored when a transport is supplied.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn tokens_enabled(mut self, enabled: bool) -> Self {
        self.tokens_enabled = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the default transport cannot
    /// be built.
    pub fn build(self) -> Result<DocClient> {
        let api_url = ApiUrl::new(&self.api_url)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = ReqwestTransport::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                Arc::new(builder.build()?)
            }
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(DocClient {
            inner: Arc::new(ClientInner {
                api_url,
                transport,
                store,
                api_key: RwLock::new(self.api_key),
                debug: AtomicBool::new(self.debug),
                tokens_enabled: AtomicBool::new(self.tokens_enabled),
                refresh_lock: Mutex::new(()),
            }),
        })
    }
}
