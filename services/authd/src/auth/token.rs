//! Bearer token 编解码：`header.payload.signature`，三段均为无填充 base64url。
//!
//! header 固定为 `{"alg":"HS256","typ":"JWT"}`，签名为
//! HMAC-SHA256(secret, "header.payload")。payload 为任意 JSON 对象，签发时写入 `exp`。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::Sha256;
use thiserror::Error;

/// token 有效期（秒）。
pub(crate) const TOKEN_TTL_SEC: u64 = 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

/// 当前 unix 秒。
fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// token 载荷。
pub(crate) type Claims = Map<String, Value>;

/// token 校验失败原因。
#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("token is not three dot-separated segments")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token payload is not a JSON object with numeric exp")]
    BadPayload,
    #[error("token expired at {exp}")]
    Expired { exp: u64 },
    #[error("encode token failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("token signing key rejected")]
    InvalidKey,
}

#[derive(Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: TokenHeader = TokenHeader {
    alg: "HS256",
    typ: "JWT",
};

/// 持有进程级密钥的 token 编解码器。
#[derive(Clone)]
pub(crate) struct TokenCodec {
    secret: String,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub(crate) fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// 以当前时间签发。
    pub(crate) fn issue(&self, payload: Claims) -> Result<String, TokenError> {
        self.issue_at(payload, unix_now())
    }

    /// 以指定时间签发，`exp = now + 24h`，覆盖调用方传入的 `exp`。
    pub(crate) fn issue_at(&self, mut payload: Claims, now: u64) -> Result<String, TokenError> {
        payload.insert(
            "exp".to_string(),
            Value::from(now.saturating_add(TOKEN_TTL_SEC)),
        );
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&HEADER)?);
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);
        let signing_input = format!("{header_b64}.{payload_b64}");
        let sig_b64 = URL_SAFE_NO_PAD.encode(
            self.mac(signing_input.as_bytes())?
                .finalize()
                .into_bytes(),
        );
        Ok(format!("{signing_input}.{sig_b64}"))
    }

    /// 以当前时间校验。
    pub(crate) fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, unix_now())
    }

    /// 以指定时间校验：格式、签名（常量时间）、payload、过期。
    pub(crate) fn validate_at(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let header_b64 = parts.next().unwrap_or_default();
        let payload_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if header_b64.is_empty()
            || payload_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(TokenError::Malformed);
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| TokenError::BadSignature)?;
        let signing_input = format!("{header_b64}.{payload_b64}");
        self.mac(signing_input.as_bytes())?
            .verify_slice(&sig)
            .map_err(|_| TokenError::BadSignature)?;

        let payload_raw = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| TokenError::BadPayload)?;
        let claims: Claims =
            serde_json::from_slice(&payload_raw).map_err(|_| TokenError::BadPayload)?;
        let exp = claims
            .get("exp")
            .and_then(Value::as_u64)
            .ok_or(TokenError::BadPayload)?;
        if exp < now {
            return Err(TokenError::Expired { exp });
        }
        Ok(claims)
    }

    fn mac(&self, input: &[u8]) -> Result<HmacSha256, TokenError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .map_err(|_| TokenError::InvalidKey)?;
        mac.update(input);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
    use hmac::Mac;
    use serde_json::{Value, json};

    use super::{Claims, TOKEN_TTL_SEC, TokenCodec, TokenError};

    const ISSUED_AT: u64 = 1_700_000_000;

    fn claims(value: Value) -> Claims {
        value.as_object().cloned().unwrap()
    }

    fn flip_char(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn validate_returns_payload_plus_exp() {
        let codec = TokenCodec::new("secret");
        let payload = claims(json!({"email": "a@b.com", "role": "tester"}));
        let token = codec.issue_at(payload.clone(), ISSUED_AT).unwrap();

        let decoded = codec.validate_at(&token, ISSUED_AT + 10).unwrap();
        let mut expected = payload;
        expected.insert("exp".into(), json!(ISSUED_AT + TOKEN_TTL_SEC));
        assert_eq!(decoded, expected);
    }

    #[test]
    fn issue_overrides_caller_exp() {
        let codec = TokenCodec::new("secret");
        let token = codec
            .issue_at(claims(json!({"email": "a@b.com", "exp": 1})), ISSUED_AT)
            .unwrap();
        let decoded = codec.validate_at(&token, ISSUED_AT).unwrap();
        assert_eq!(decoded["exp"], json!(ISSUED_AT + TOKEN_TTL_SEC));
    }

    #[test]
    fn token_has_jwt_shape() {
        let codec = TokenCodec::new("secret");
        let token = codec
            .issue_at(claims(json!({"email": "a@b.com"})), ISSUED_AT)
            .unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        assert!(!token.contains('='));

        let header: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
        assert_eq!(header, json!({"alg": "HS256", "typ": "JWT"}));
    }

    #[test]
    fn expiry_boundary() {
        let codec = TokenCodec::new("secret");
        let token = codec
            .issue_at(claims(json!({"email": "a@b.com"})), ISSUED_AT)
            .unwrap();

        assert!(codec.validate_at(&token, ISSUED_AT + 86_399).is_ok());
        assert!(codec.validate_at(&token, ISSUED_AT + 86_400).is_ok());
        assert!(matches!(
            codec.validate_at(&token, ISSUED_AT + 86_401),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn tampering_any_signature_or_payload_char_is_rejected() {
        let codec = TokenCodec::new("secret");
        let token = codec
            .issue_at(claims(json!({"email": "a@b.com"})), ISSUED_AT)
            .unwrap();
        let header_len = token.find('.').unwrap() + 1;

        for index in header_len..token.len() {
            if token.as_bytes()[index] == b'.' {
                continue;
            }
            let tampered = flip_char(&token, index);
            assert!(
                codec.validate_at(&tampered, ISSUED_AT).is_err(),
                "tampered index {index} accepted"
            );
        }
    }

    #[test]
    fn rejects_other_secret() {
        let token = TokenCodec::new("secret")
            .issue_at(claims(json!({"email": "a@b.com"})), ISSUED_AT)
            .unwrap();
        assert!(matches!(
            TokenCodec::new("other").validate_at(&token, ISSUED_AT),
            Err(TokenError::BadSignature)
        ));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let codec = TokenCodec::new("secret");
        for token in ["", "abc", "a.b", "a.b.c.d", "a..c", ".b.c"] {
            assert!(matches!(
                codec.validate_at(token, ISSUED_AT),
                Err(TokenError::Malformed)
            ));
        }
    }

    #[test]
    fn rejects_signed_payload_without_exp() {
        let codec = TokenCodec::new("secret");
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"email":"a@b.com"}"#);
        let signing_input = format!("{header}.{payload}");
        let sig = URL_SAFE_NO_PAD.encode(
            codec
                .mac(signing_input.as_bytes())
                .unwrap()
                .finalize()
                .into_bytes(),
        );

        assert!(matches!(
            codec.validate_at(&format!("{signing_input}.{sig}"), ISSUED_AT),
            Err(TokenError::BadPayload)
        ));
    }
}
