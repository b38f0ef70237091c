//! Room code generation
//!
//! Codes are short and typeable: uppercase letters and digits without the
//! lookalikes 0/O and 1/I. With 32 symbols and 6 positions there are about
//! 10^9 codes, so a retry on collision is rare.

use rand::Rng;

use crate::constants::{ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH};

/// Generate a random room code
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generate a code for which `is_taken` returns false.
///
/// Only live rooms are checked; a code freed by a destroyed room may be
/// handed out again immediately.
pub fn generate_unique_room_code<R, F>(rng: &mut R, is_taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    loop {
        let code = generate_room_code(rng);
        if !is_taken(&code) {
            return code;
        }
        log::debug!("Room code {} collided with a live room, retrying", code);
    }
}
