use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Timestamp and signature attached to one outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub timestamp: String,
    pub signature: String,
}

/// Signs requests as `HMAC-SHA256(secret, timestamp + METHOD + path[?query])`.
///
/// The query string is only part of the message for GET requests. Its pairs
/// are sorted by key and form-urlencoded. Bodies are never signed.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn sign(&self, method: &Method, path: &str, query: &[(&str, String)]) -> SignedRequest {
        let timestamp = Utc::now().timestamp_millis().to_string();
        let signature = self.sign_at(&timestamp, method, path, query);
        SignedRequest {
            timestamp,
            signature,
        }
    }

    pub fn sign_at(
        &self,
        timestamp: &str,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
    ) -> String {
        let message = canonical_message(timestamp, method, path, query);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

pub fn canonical_message(
    timestamp: &str,
    method: &Method,
    path: &str,
    query: &[(&str, String)],
) -> String {
    let method = method.as_str().to_uppercase();
    let query = if method == "GET" {
        encode_query(query)
    } else {
        String::new()
    };

    if query.is_empty() {
        format!("{}{}{}", timestamp, method, path)
    } else {
        format!("{}{}{}?{}", timestamp, method, path, query)
    }
}

pub fn encode_query(query: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = query.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}
