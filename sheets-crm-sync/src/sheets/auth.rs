//! Service-account authentication for the Google Sheets API
//!
//! Signs a short-lived RS256 JWT assertion with the account's private key and
//! exchanges it for an OAuth access token.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Fields of a service-account JSON key file used for token exchange
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// JWT claims of the token request assertion
#[derive(Debug, Serialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read service account file: {}", path.display())
        })?;
        serde_json::from_str(&content).with_context(|| {
            format!("Invalid service account file: {}", path.display())
        })
    }

    pub fn claims(&self, scope: &str, now: DateTime<Utc>) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        }
    }

    /// Signed assertion for the given scope
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("Service account private_key is not a valid RSA PEM key")?;
        jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &self.claims(scope, now),
            &key,
        )
        .context("Failed to sign service account assertion")
    }
}

/// Exchange a signed assertion for an access token
pub async fn fetch_access_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<String> {
    let assertion = key.assertion(scope, Utc::now())?;
    debug!("Requesting access token for {}", key.client_email);

    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .with_context(|| format!("Failed to reach token endpoint: {}", key.token_uri))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Token endpoint returned HTTP {}: {}", status.as_u16(), body);
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("Invalid token endpoint response")?;
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "sync@project.iam.gserviceaccount.com".to_string(),
            private_key: "not a key".to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    #[test]
    fn test_claims() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = key().claims(SHEETS_READONLY_SCOPE, now);

        assert_eq!(claims.iss, "sync@project.iam.gserviceaccount.com");
        assert_eq!(claims.scope, SHEETS_READONLY_SCOPE);
        assert_eq!(claims.aud, DEFAULT_TOKEN_URI);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn test_invalid_private_key_is_rejected() {
        let err = key().assertion(SHEETS_READONLY_SCOPE, Utc::now()).unwrap_err();

        assert!(err.to_string().contains("not a valid RSA PEM key"));
    }

    #[test]
    fn test_key_file_defaults_token_uri() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type":"service_account","client_email":"a@b.iam","private_key":"pem"}}"#
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(file.path()).unwrap();

        assert_eq!(key.client_email, "a@b.iam");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_missing_key_file() {
        let err = ServiceAccountKey::from_file(Path::new("/nonexistent/creds.json")).unwrap_err();

        assert!(err.to_string().contains("Failed to read service account file"));
    }
}
