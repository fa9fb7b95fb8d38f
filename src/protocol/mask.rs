// (c) 2025 Ross Younger

//! Payload obfuscation
//!
//! Every payload crossing the wire is XORed byte-for-byte against a fixed
//! repeating key; headers travel in the clear. The transform is its own
//! inverse, so the same pass runs on both send and receive.
//!
//! This is obfuscation, nothing more. Anyone holding a copy of the binary
//! can reverse it; do not mistake it for encryption.

/// The compiled-in key. Both ends must be built with the same value.
const KEY: &[u8] = &[
    0x6b, 0x51, 0xd3, 0x2e, 0x94, 0x7c, 0xa5, 0x38, 0xe1, 0x4f, 0xb2, 0x8d, 0x17, 0xc9, 0x66,
    0xfa,
];

/// Applies the keystream to `data` in place, cycling the key as needed.
pub fn mask_in_place(data: &mut [u8]) {
    for (byte, key) in data.iter_mut().zip(KEY.iter().cycle()) {
        *byte ^= key;
    }
}

/// Copying variant of [`mask_in_place`].
#[must_use]
pub fn mask(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    mask_in_place(&mut out);
    out
}
