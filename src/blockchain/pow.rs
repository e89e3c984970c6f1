use sha2::{Digest, Sha256};

/// SHA-256 of `data`, hex encoded (64 lowercase chars).
pub fn hash_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash of a pre-image with the nonce appended as decimal digits.
pub fn calculate_hash(data: &str, nonce: u64) -> String {
    hash_hex(&format!("{data}{nonce}"))
}

/// Whether `digest` starts with `difficulty` literal `'0'` characters.
/// Difficulty counts hex characters, not bits.
pub fn meets_difficulty(digest: &str, difficulty: usize) -> bool {
    digest.len() >= difficulty && digest.as_bytes()[..difficulty].iter().all(|&c| c == b'0')
}

/// Linear nonce search from 0 until the digest meets `difficulty`.
/// Returns the qualifying digest and the nonce that produced it.
///
/// There is no attempt cap; the caller owns the thread for as long as the
/// search takes.
pub fn proof_of_work(data: &str, difficulty: usize) -> (String, u64) {
    let mut nonce: u64 = 0;
    loop {
        let digest = calculate_hash(data, nonce);
        if meets_difficulty(&digest, difficulty) {
            return (digest, nonce);
        }
        nonce = nonce.wrapping_add(1);
    }
}
