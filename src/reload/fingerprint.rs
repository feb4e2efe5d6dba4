use sha2::{Digest, Sha256};

/// SHA-256 of a code unit's text.
pub type Fingerprint = [u8; 32];

pub fn hash_bytes(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

pub fn to_hex(bytes: &Fingerprint) -> String {
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
