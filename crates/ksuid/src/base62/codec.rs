use crate::{
    base62::EncodingError,
    id::{BYTE_LEN, ENCODED_LEN},
};

/// Digits, then upper case, then lower case. This is also ASCII order, which is
/// what makes the encoding order-preserving.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BASE: u64 = 62;
const NO_VALUE: u8 = 255;
const WORDS: usize = BYTE_LEN / 4;

/// Lookup table for base62 decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 62 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

const fn to_words(input: &[u8; BYTE_LEN]) -> [u32; WORDS] {
    let mut words = [0_u32; WORDS];
    let mut i = 0;
    while i < WORDS {
        words[i] = u32::from_be_bytes([
            input[i * 4],
            input[i * 4 + 1],
            input[i * 4 + 2],
            input[i * 4 + 3],
        ]);
        i += 1;
    }
    words
}

/// Encodes 20 big-endian bytes as exactly 27 base62 digits, left-padded with
/// `'0'`.
///
/// The value is treated as a 160-bit big-endian integer held in five `u32`
/// limbs. Each pass divides every limb by 62 (long division, most significant
/// limb first) and emits the remainder as the next digit from the right.
/// `62^27 > 2^160`, so after 27 passes the quotient is always zero and any
/// unused leading positions have been filled with the zero digit.
pub fn encode_base62(input: &[u8; BYTE_LEN], out: &mut [u8; ENCODED_LEN]) {
    let mut words = to_words(input);

    for slot in out.iter_mut().rev() {
        let mut rem = 0_u64;
        for word in words.iter_mut() {
            let acc = (rem << 32) | u64::from(*word);
            *word = (acc / BASE) as u32;
            rem = acc % BASE;
        }
        *slot = ALPHABET[rem as usize];
    }
}

/// Decodes a 27-character base62 string into 20 big-endian bytes.
///
/// # Errors
///
/// - [`EncodingError::InvalidLength`] if `encoded` is not 27 bytes
/// - [`EncodingError::InvalidAscii`] on the first byte outside the alphabet
/// - [`EncodingError::Overflow`] if the value is `>= 2^160`
pub fn decode_base62(encoded: &[u8]) -> Result<[u8; BYTE_LEN], EncodingError> {
    if encoded.len() != ENCODED_LEN {
        return Err(EncodingError::InvalidLength { len: encoded.len() });
    }

    let mut words = [0_u32; WORDS];
    for (index, &byte) in encoded.iter().enumerate() {
        let digit = LOOKUP[byte as usize];
        if digit == NO_VALUE {
            return Err(EncodingError::InvalidAscii { byte, index });
        }

        // words = words * 62 + digit, least significant limb first
        let mut carry = u64::from(digit);
        for word in words.iter_mut().rev() {
            let acc = u64::from(*word) * BASE + carry;
            *word = acc as u32;
            carry = acc >> 32;
        }
        if carry != 0 {
            return Err(EncodingError::Overflow);
        }
    }

    let mut out = [0_u8; BYTE_LEN];
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    Ok(out)
}
