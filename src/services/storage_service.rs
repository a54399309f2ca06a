use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Read-only view of the resume object store. This crate only ever asks for
/// time-limited download links; uploads and deletions live elsewhere.
#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn signed_url(&self, path: &str, ttl_secs: u64) -> Result<Url>;
}

/// Issues `?expires=<unix>&signature=<hex hmac-sha256>` download links that
/// the object store verifies with the shared secret.
#[derive(Clone)]
pub struct HmacUrlSigner {
    base_url: Url,
    secret: String,
}

impl HmacUrlSigner {
    pub fn new(base_url: &str, secret: impl Into<String>) -> Result<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("Invalid storage base URL {}: {}", base_url, e)))?;
        Ok(Self {
            base_url,
            secret: secret.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.storage_base_url, config.storage_signing_secret.clone())
    }

    pub fn sign_until(&self, path: &str, expires_at: i64) -> Result<Url> {
        let object = path.trim_start_matches('/');
        if object.is_empty() {
            return Err(Error::validation("Resume path must not be empty"));
        }
        let mut url = self
            .base_url
            .join(object)
            .map_err(|e| Error::validation(format!("Invalid resume path {}: {}", path, e)))?;
        let key = self
            .object_key(&url)
            .ok_or_else(|| Error::validation(format!("Resume path escapes the bucket: {}", path)))?
            .to_string();
        let signature = self.signature(&key, expires_at)?;
        url.query_pairs_mut()
            .append_pair("expires", &expires_at.to_string())
            .append_pair("signature", &signature);
        Ok(url)
    }

    /// Checks a link issued by this signer against `now` (unix seconds).
    pub fn verify(&self, url: &Url, now: i64) -> bool {
        let Some(object) = self.object_key(url) else {
            return false;
        };
        let mut expires = None;
        let mut signature = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "expires" => expires = value.parse::<i64>().ok(),
                "signature" => signature = Some(value.into_owned()),
                _ => {}
            }
        }
        let (Some(expires), Some(signature)) = (expires, signature) else {
            return false;
        };
        if expires < now {
            return false;
        }
        let Ok(mut mac) = HmacSha256::new_from_slice(self.secret.as_bytes()) else {
            return false;
        };
        mac.update(format!("{}\n{}", object, expires).as_bytes());
        match hex::decode(signature) {
            Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
            Err(_) => false,
        }
    }

    // Signed form is the percent-encoded path below the base URL.
    fn object_key<'a>(&self, url: &'a Url) -> Option<&'a str> {
        if url.origin() != self.base_url.origin() {
            return None;
        }
        url.path()
            .strip_prefix(self.base_url.path())
            .filter(|key| !key.is_empty())
    }

    fn signature(&self, object: &str, expires_at: i64) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Config(format!("Invalid signing secret: {}", e)))?;
        mac.update(format!("{}\n{}", object, expires_at).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl ResumeStorage for HmacUrlSigner {
    async fn signed_url(&self, path: &str, ttl_secs: u64) -> Result<Url> {
        let ttl = i64::try_from(ttl_secs).map_err(|_| Error::validation("TTL too large"))?;
        self.sign_until(path, Utc::now().timestamp() + ttl)
    }
}
