//! OAuth2 credentials for the calendar API.
//!
//! 1. Reuse the cached token if it is still valid
//! 2. Otherwise refresh it when it has expired and carries a refresh token
//! 3. Otherwise run the installed-app flow: open the browser on the consent
//!    page, catch the redirect on a localhost listener, exchange the code
//! 4. Write whatever was obtained back to the token cache

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{OAuthError, Result};
use crate::storage::{read_json, write_json};

/// Full read/write access to the user's calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

const SUCCESS_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h2>Authentication successful!</h2><p>You can close this tab.</p></body></html>";
const FAILURE_PAGE: &str = "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h2>Authentication failed.</h2><p>Return to the terminal for details.</p></body></html>";
const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Cached "authorized user" token, as stored in the token file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Tokens without an expiry never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|exp| now + Duration::seconds(EXPIRY_MARGIN_SECS) >= exp)
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && !self.is_expired(now)
    }
}

/// OAuth client registration ("installed" or "web" client secrets file).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self> {
        let file: ClientSecretsFile = read_json(path)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| {
                OAuthError::MissingClient {
                    path: path.to_path_buf(),
                }
                .into()
            })
    }

    /// Consent page URL for an offline-access authorization code.
    pub fn consent_url(&self, redirect_uri: &str, scopes: &[String], state: &str) -> Result<Url> {
        let scope = scopes.join(" ");
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::AuthorizationFailed(format!("bad auth_uri: {e}")).into())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs))
    }

    fn scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(String::from).collect())
    }
}

async fn post_token_request(
    http: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> std::result::Result<TokenResponse, String> {
    let resp = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let body: Value = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(error) = body.get("error") {
        let error = error
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(match body.get("error_description").and_then(Value::as_str) {
            Some(description) => format!("{error}: {description}"),
            None => error,
        });
    }

    serde_json::from_value(body).map_err(|e| e.to_string())
}

/// Trade a refresh token for a new access token.
///
/// The old refresh token is kept when the server does not send a new one.
pub async fn refresh(http: &Client, creds: &Credentials) -> Result<Credentials> {
    let refresh_token = creds
        .refresh_token
        .as_deref()
        .ok_or_else(|| OAuthError::TokenRefreshFailed("no refresh token".to_string()))?;

    let params = [
        ("client_id", creds.client_id.as_str()),
        ("client_secret", creds.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    let resp = post_token_request(http, &creds.token_uri, &params)
        .await
        .map_err(OAuthError::TokenRefreshFailed)?;

    Ok(Credentials {
        expiry: resp.expiry(),
        scopes: resp.scopes().unwrap_or_else(|| creds.scopes.clone()),
        refresh_token: resp
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
        token: resp.access_token,
        ..creds.clone()
    })
}

async fn exchange_code(
    http: &Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    scopes: &[String],
) -> Result<Credentials> {
    let params = [
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
    ];
    let resp = post_token_request(http, &secrets.token_uri, &params)
        .await
        .map_err(OAuthError::TokenExchangeFailed)?;

    Ok(Credentials {
        expiry: resp.expiry(),
        scopes: resp.scopes().unwrap_or_else(|| scopes.to_vec()),
        refresh_token: resp.refresh_token,
        token: resp.access_token,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
    })
}

/// Query parameters of the redirect the browser sends back.
#[derive(Debug, Default, PartialEq)]
struct Callback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

impl Callback {
    fn is_oauth_redirect(&self) -> bool {
        self.code.is_some() || self.state.is_some() || self.error.is_some()
    }
}

fn parse_callback(request: &str) -> Option<Callback> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://localhost{path}")).ok()?;

    let mut callback = Callback::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => callback.code = Some(value.into_owned()),
            "state" => callback.state = Some(value.into_owned()),
            "error" => callback.error = Some(value.into_owned()),
            _ => {}
        }
    }
    Some(callback)
}

fn check_callback(callback: Callback, expected_state: &str) -> Result<String, OAuthError> {
    if let Some(error) = callback.error {
        return Err(OAuthError::AuthorizationFailed(error));
    }
    if callback.state.as_deref() != Some(expected_state) {
        return Err(OAuthError::InvalidCallback("state mismatch".to_string()));
    }
    callback
        .code
        .ok_or_else(|| OAuthError::InvalidCallback("no code in callback".to_string()))
}

/// Serve the redirect listener until the OAuth redirect arrives.
///
/// Unrelated requests (a browser asking for `/favicon.ico`) get a 404.
fn await_callback(listener: &TcpListener, expected_state: &str) -> Result<String> {
    loop {
        let (mut stream, _) = listener.accept()?;
        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf)?;
        let request = String::from_utf8_lossy(&buf[..n]);

        let callback = match parse_callback(&request) {
            Some(cb) if cb.is_oauth_redirect() => cb,
            _ => {
                stream.write_all(NOT_FOUND.as_bytes())?;
                continue;
            }
        };

        let outcome = check_callback(callback, expected_state);
        let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };
        stream.write_all(page.as_bytes())?;
        return Ok(outcome?);
    }
}

/// Run the interactive installed-app authorization flow.
pub async fn authorize(
    http: &Client,
    secrets: &ClientSecrets,
    scopes: &[String],
) -> Result<Credentials> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    let redirect_uri = format!("http://localhost:{port}/");
    let state = Uuid::new_v4().simple().to_string();

    let url = secrets.consent_url(&redirect_uri, scopes, &state)?;
    info!("Please visit this URL to authorize this application: {url}");
    if let Err(e) = open::that(url.as_str()) {
        warn!("Could not open a browser ({e}); open the URL above manually");
    }

    let code = await_callback(&listener, &state)?;
    drop(listener);

    exchange_code(http, secrets, &code, &redirect_uri, scopes).await
}

/// Obtains calendar credentials and keeps the token cache up to date.
pub struct CredentialManager {
    token_path: PathBuf,
    credentials_path: PathBuf,
    scopes: Vec<String>,
    http: Client,
}

impl CredentialManager {
    pub fn new(token_path: impl Into<PathBuf>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
            credentials_path: credentials_path.into(),
            scopes: vec![CALENDAR_SCOPE.to_string()],
            http: Client::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.token_path.clone(), config.credentials_path.clone())
    }

    /// The cached token, if the token file exists and parses.
    pub fn load_cached(&self) -> Option<Credentials> {
        if !self.token_path.exists() {
            return None;
        }
        match read_json(&self.token_path) {
            Ok(creds) => Some(creds),
            Err(e) => {
                warn!("Ignoring unreadable token cache: {e}");
                None
            }
        }
    }

    /// Return valid credentials, refreshing or re-authorizing as needed.
    pub async fn acquire(&self) -> Result<Credentials> {
        let now = Utc::now();
        let creds = match self.load_cached() {
            Some(cached) if cached.is_valid(now) => return Ok(cached),
            Some(cached) if cached.is_expired(now) && cached.refresh_token.is_some() => {
                info!("Access token expired, refreshing");
                refresh(&self.http, &cached).await?
            }
            _ => {
                info!("No usable token cached, starting authorization");
                let secrets = ClientSecrets::load(&self.credentials_path)?;
                authorize(&self.http, &secrets, &self.scopes).await?
            }
        };

        write_json(&self.token_path, &creds)?;
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;

    fn creds(expiry: Option<DateTime<Utc>>) -> Credentials {
        Credentials {
            token: "access".into(),
            refresh_token: Some("refresh".into()),
            token_uri: GOOGLE_TOKEN_URI.into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            scopes: vec![CALENDAR_SCOPE.into()],
            expiry,
        }
    }

    #[test]
    fn expiry_margin_applies() {
        let now = Utc::now();
        assert!(creds(Some(now + Duration::seconds(30))).is_expired(now));
        assert!(!creds(Some(now + Duration::minutes(10))).is_expired(now));
        assert!(!creds(None).is_expired(now));
    }

    #[test]
    fn empty_token_is_invalid_but_not_expired() {
        let mut c = creds(None);
        c.token.clear();
        assert!(!c.is_valid(Utc::now()));
        assert!(!c.is_expired(Utc::now()));
    }

    #[test]
    fn reads_authorized_user_file_with_extra_fields() {
        let raw = r#"{
            "token": "ya29.abc",
            "refresh_token": "1//xyz",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "s",
            "scopes": ["https://www.googleapis.com/auth/calendar"],
            "universe_domain": "googleapis.com",
            "expiry": "2024-06-01T10:00:00.123456Z"
        }"#;
        let c: Credentials = serde_json::from_str(raw).unwrap();
        assert_eq!(c.refresh_token.as_deref(), Some("1//xyz"));
        assert!(c.expiry.is_some());
    }

    #[test]
    fn consent_url_carries_offline_scope_and_state() {
        let secrets = ClientSecrets {
            client_id: "cid".into(),
            client_secret: "cs".into(),
            auth_uri: GOOGLE_AUTH_URI.into(),
            token_uri: GOOGLE_TOKEN_URI.into(),
        };
        let url = secrets
            .consent_url("http://localhost:5555/", &[CALENDAR_SCOPE.to_string()], "st")
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("scope".into(), CALENDAR_SCOPE.into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("state".into(), "st".into())));
        assert!(pairs.contains(&("redirect_uri".into(), "http://localhost:5555/".into())));
    }

    #[test]
    fn callback_errors() {
        let cb = parse_callback("GET /?error=access_denied&state=s HTTP/1.1\r\n").unwrap();
        assert!(matches!(
            check_callback(cb, "s"),
            Err(OAuthError::AuthorizationFailed(e)) if e == "access_denied"
        ));

        let cb = parse_callback("GET /?code=c&state=other HTTP/1.1\r\n").unwrap();
        assert!(matches!(check_callback(cb, "s"), Err(OAuthError::InvalidCallback(_))));
    }

    fn send(port: u16, request: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn listener_skips_stray_requests_and_returns_code() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let browser = thread::spawn(move || {
            let favicon = send(port, "GET /favicon.ico HTTP/1.1\r\nHost: localhost\r\n\r\n");
            let redirect = send(
                port,
                "GET /?state=abc&code=4%2F0Ab HTTP/1.1\r\nHost: localhost\r\n\r\n",
            );
            (favicon, redirect)
        });

        let code = await_callback(&listener, "abc").unwrap();
        drop(listener);
        let (favicon, redirect) = browser.join().unwrap();

        assert_eq!(code, "4/0Ab");
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(redirect.contains("Authentication successful!"));
    }
}
