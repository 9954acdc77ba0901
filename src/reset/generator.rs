use rand::Rng;

use crate::models::reset_code::CODE_LENGTH;

/// Draws a reset code from the given random source: the first digit uniform
/// in 1–9, the remaining four uniform in 0–9. Codes therefore never carry a
/// leading zero and are always exactly [`CODE_LENGTH`] characters.
pub fn generate_code<R: Rng>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_LENGTH);
    code.push(char::from(rng.gen_range(b'1'..=b'9')));
    for _ in 1..CODE_LENGTH {
        code.push(char::from(rng.gen_range(b'0'..=b'9')));
    }
    code
}

/// Draws a reset code from the thread-local random source.
pub fn generate() -> String {
    generate_code(&mut rand::thread_rng())
}
