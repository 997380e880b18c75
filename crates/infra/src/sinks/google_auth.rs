//! OAuth2 access tokens for the Google Sheets API.
//!
//! Credential discovery follows the usual Google order:
//!
//! 1. an explicit credentials file (`GOOGLE_APPLICATION_CREDENTIALS`)
//! 2. the gcloud well-known file (`~/.config/gcloud/application_default_credentials.json`)
//! 3. the GCE metadata server (Cloud Run, GCE, GKE)
//!
//! Files may hold a `service_account` key (exchanged through an RS256-signed
//! JWT bearer assertion) or an `authorized_user` refresh token.
//!
//! Tokens are cached inside the [`TokenSource`] and refreshed shortly before
//! they expire. Refreshes are serialized, so a burst of requests at expiry
//! performs a single token exchange.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::sinks::SinkError;

/// Read/write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime of a self-signed service account assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// `type: service_account` key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl core::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// `type: authorized_user` file, as written by `gcloud auth application-default login`.
#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl core::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

/// Where access tokens come from.
#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    /// Ambient credentials of the compute environment.
    Metadata { url: String },
}

impl Credentials {
    /// Resolve credentials, preferring an explicit file.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SinkError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = well_known_file().filter(|p| p.is_file()) {
            tracing::info!(path = %path.display(), "using gcloud application default credentials");
            return Self::from_file(&path);
        }

        tracing::info!("no credentials file found; using the metadata server");
        Ok(Self::metadata())
    }

    pub fn from_file(path: &Path) -> Result<Self, SinkError> {
        let raw = std::fs::read(path).map_err(|e| {
            SinkError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
            .map_err(|e| SinkError::Credentials(format!("{}: {e}", path.display())))
    }

    pub fn from_json(raw: &[u8]) -> Result<Self, String> {
        let file: CredentialsFile = serde_json::from_slice(raw)
            .map_err(|e| format!("unsupported credentials file: {e}"))?;
        Ok(match file {
            CredentialsFile::ServiceAccount(key) => Credentials::ServiceAccount(key),
            CredentialsFile::AuthorizedUser(user) => Credentials::AuthorizedUser(user),
        })
    }

    pub fn metadata() -> Self {
        Credentials::Metadata {
            url: METADATA_TOKEN_URL.to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Credentials::ServiceAccount(_) => "service_account",
            Credentials::AuthorizedUser(_) => "authorized_user",
            Credentials::Metadata { .. } => "metadata",
        }
    }
}

fn well_known_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("gcloud")
            .join("application_default_credentials.json")
    })
}

/// Prepared grant; private keys are parsed once, at construction.
enum Grant {
    JwtBearer {
        client_email: String,
        key_id: Option<String>,
        key: EncodingKey,
        token_uri: String,
    },
    RefreshToken(AuthorizedUser),
    Metadata { url: String },
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - ChronoDuration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Caching source of bearer tokens for one set of credentials.
pub struct TokenSource {
    http: reqwest::Client,
    grant: Grant,
    kind: &'static str,
    cached: Mutex<Option<AccessToken>>,
}

impl core::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSource")
            .field("credentials", &self.kind)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Prepare a token source. Fails on unusable private keys.
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Result<Self, SinkError> {
        let kind = credentials.kind();
        let grant = match credentials {
            Credentials::ServiceAccount(sa) => {
                let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes()).map_err(|e| {
                    SinkError::Credentials(format!("service account private key: {e}"))
                })?;
                Grant::JwtBearer {
                    client_email: sa.client_email,
                    key_id: sa.private_key_id,
                    key,
                    token_uri: sa.token_uri,
                }
            }
            Credentials::AuthorizedUser(user) => Grant::RefreshToken(user),
            Credentials::Metadata { url } => Grant::Metadata { url },
        };

        Ok(Self {
            http,
            grant,
            kind,
            cached: Mutex::new(None),
        })
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }

    /// Current bearer token, exchanging credentials when the cache is stale.
    pub async fn token(&self) -> Result<String, SinkError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch(now).await?;
        tracing::debug!(
            credentials = self.kind,
            expires_at = %fresh.expires_at,
            "obtained access token"
        );
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<AccessToken, SinkError> {
        let request = match &self.grant {
            Grant::JwtBearer {
                client_email,
                key_id,
                key,
                token_uri,
            } => {
                let claims = AssertionClaims {
                    iss: client_email,
                    scope: SHEETS_SCOPE,
                    aud: token_uri,
                    iat: now.timestamp(),
                    exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
                };
                let mut header = Header::new(Algorithm::RS256);
                header.kid = key_id.clone();
                let assertion = jsonwebtoken::encode(&header, &claims, key)
                    .map_err(|e| SinkError::Auth(format!("cannot sign assertion: {e}")))?;

                self.http.post(token_uri).form(&[
                    ("grant_type", JWT_BEARER_GRANT),
                    ("assertion", assertion.as_str()),
                ])
            }
            Grant::RefreshToken(user) => self.http.post(&user.token_uri).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
            ]),
            Grant::Metadata { url } => self
                .http
                .get(url)
                .header("Metadata-Flavor", "Google")
                .query(&[("scopes", SHEETS_SCOPE)]),
        };

        let response = request.send().await.map_err(SinkError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(SinkError::transport)?;
        if !status.is_success() {
            return Err(SinkError::Auth(
                SinkError::api("oauth", status.as_u16(), &body).to_string(),
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SinkError::Auth(format!("malformed token response: {e}")))?;

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: now + ChronoDuration::seconds(parsed.expires_in),
        })
    }
}
