//! Join codes
//!
//! Six characters drawn uniformly and independently from `[0-9a-z]`. Codes
//! are a shared secret between admins and invitees, not a credential: they
//! are not collision-checked across workspaces.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of every join code
pub const JOIN_CODE_LEN: usize = 6;

/// Generate a join code from the thread-local RNG
pub fn generate_join_code() -> String {
    generate_join_code_with(&mut rand::rng())
}

/// Generate a join code from the given RNG
pub fn generate_join_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Generate a code that differs from `current`
pub fn rotate_join_code(current: &str) -> String {
    loop {
        let code = generate_join_code();
        if code != current {
            return code;
        }
    }
}

/// Whether `code` has the shape of a generated join code
pub fn is_well_formed(code: &str) -> bool {
    code.len() == JOIN_CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b))
}
