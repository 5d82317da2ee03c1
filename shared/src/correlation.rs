use rand::Rng;

/// Symbols a generated uid is drawn from: `0-9a-zA-Z-`.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-";

pub const DEFAULT_UID_LENGTH: usize = 30;

/// Generates a correlation id of `length` symbols, each picked uniformly from [ALPHABET].
///
/// Not cryptographically strong unless `rng` is. Uniqueness is probabilistic only.
pub fn generate_correlation_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
