//! 口令摘要：SHA-256(password ‖ salt)，十六进制输出。
//!
//! 不做迭代拉伸，与既有账号数据保持兼容。

use std::fmt::Write;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// 盐长度（字节），十六进制后 32 字符。
const SALT_BYTES: usize = 16;

/// 计算口令摘要。
pub(crate) fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    to_hex(&hasher.finalize())
}

/// 生成新盐（OS CSPRNG）。
pub(crate) fn generate_salt() -> String {
    random_hex(SALT_BYTES)
}

/// 校验口令，摘要比较为常量时间。
pub(crate) fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let attempt = hash_password(password, salt);
    constant_time_eq(attempt.as_bytes(), expected_hash.as_bytes())
}

/// 未命中账号时也计算一次摘要，使两种失败耗时接近。
pub(crate) fn burn_hash(password: &str) {
    let _ = std::hint::black_box(hash_password(
        std::hint::black_box(password),
        "00000000000000000000000000000000",
    ));
}

/// 指定字节数的随机十六进制串。
pub(crate) fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// 常量时间比较。
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{burn_hash, constant_time_eq, generate_salt, hash_password, verify_password};

    #[test]
    fn hash_is_deterministic_sha256_hex() {
        // sha256("pw1" + "salt")
        let digest = hash_password("pw1", "salt");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_password("pw1", "salt"));
        assert_ne!(digest, hash_password("pw1", "salt2"));
        assert_ne!(digest, hash_password("pw2", "salt"));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_concatenates_password_then_salt() {
        assert_eq!(hash_password("ab", "c"), hash_password("a", "bc"));
        assert_eq!(
            hash_password("abc", ""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn salts_are_fresh_128_bit_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_only_matching_password() {
        let salt = generate_salt();
        let stored = hash_password("correct horse", &salt);
        assert!(verify_password("correct horse", &salt, &stored));
        assert!(!verify_password("wrong horse", &salt, &stored));
        assert!(!verify_password("correct horse", "other-salt", &stored));
    }

    #[test]
    fn digest_comparison_requires_exact_hex() {
        let digest = hash_password("pw1", "salt");
        assert!(constant_time_eq(digest.as_bytes(), digest.as_bytes()));
        assert!(!constant_time_eq(digest.as_bytes(), digest[..63].as_bytes()));
        assert!(!constant_time_eq(digest.as_bytes(), digest.to_uppercase().as_bytes()));
        assert!(!constant_time_eq(digest.as_bytes(), b""));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn burn_hash_runs_for_any_input() {
        burn_hash("");
        burn_hash("some password");
    }
}
