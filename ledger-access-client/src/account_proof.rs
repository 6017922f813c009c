//! # Account Proof Messages
//!
//! Builds the canonical messages a wallet signs to prove control of an
//! account. Both versions are RLP lists:
//!
//! - v1: `[domain_tag?, address, timestamp]`, where the optional application
//!   domain tag is right-padded with zeros to 32 bytes.
//! - v2: `[app_id, address, nonce]`, where the nonce is hex and at least
//!   [`ACCOUNT_PROOF_NONCE_MIN_LEN`] bytes long.
//!
//! The returned bytes never include the user domain tag.

use crate::error::{AccessError, Result};
use crate::model::Address;

/// Minimum length of an account proof nonce, in bytes.
pub const ACCOUNT_PROOF_NONCE_MIN_LEN: usize = 32;

const DOMAIN_TAG_LEN: usize = 32;

/// Encodes a v1 account proof message.
///
/// An empty `app_domain_tag` produces the two-element form without a tag.
#[deprecated(note = "use `account_proof_message_v2`")]
pub fn account_proof_message(
    address: &Address,
    timestamp_ms: u64,
    app_domain_tag: &str,
) -> Result<Vec<u8>> {
    let mut items = Vec::with_capacity(3);
    if !app_domain_tag.is_empty() {
        items.push(rlp::bytes(&pad_domain_tag(app_domain_tag)?));
    }
    items.push(rlp::bytes(address.as_bytes()));
    items.push(rlp::uint(timestamp_ms));
    Ok(rlp::list(&items))
}

/// Encodes a v2 account proof message.
pub fn account_proof_message_v2(address: &Address, app_id: &str, nonce_hex: &str) -> Result<Vec<u8>> {
    let nonce = hex::decode(nonce_hex.trim_start_matches("0x"))
        .map_err(|e| AccessError::InvalidNonce(e.to_string()))?;
    if nonce.len() < ACCOUNT_PROOF_NONCE_MIN_LEN {
        return Err(AccessError::InvalidNonce(format!(
            "nonce must be at least {ACCOUNT_PROOF_NONCE_MIN_LEN} bytes"
        )));
    }

    Ok(rlp::list(&[
        rlp::bytes(app_id.as_bytes()),
        rlp::bytes(address.as_bytes()),
        rlp::bytes(&nonce),
    ]))
}

fn pad_domain_tag(tag: &str) -> Result<[u8; DOMAIN_TAG_LEN]> {
    let bytes = tag.as_bytes();
    if bytes.len() > DOMAIN_TAG_LEN {
        return Err(AccessError::InvalidArgument(format!(
            "domain tag {tag} cannot be longer than {DOMAIN_TAG_LEN} bytes"
        )));
    }
    let mut padded = [0u8; DOMAIN_TAG_LEN];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

/// The subset of RLP needed for account proofs.
mod rlp {
    const SHORT_STRING: u8 = 0x80;
    const LONG_STRING: u8 = 0xb7;
    const SHORT_LIST: u8 = 0xc0;
    const LONG_LIST: u8 = 0xf7;
    const SHORT_MAX: usize = 55;

    pub fn bytes(data: &[u8]) -> Vec<u8> {
        if data.len() == 1 && data[0] < SHORT_STRING {
            return data.to_vec();
        }
        let mut out = header(data.len(), SHORT_STRING, LONG_STRING);
        out.extend_from_slice(data);
        out
    }

    /// Unsigned integers are big-endian byte strings without leading zeros.
    pub fn uint(value: u64) -> Vec<u8> {
        bytes(trim_leading_zeros(&value.to_be_bytes()))
    }

    pub fn list(items: &[Vec<u8>]) -> Vec<u8> {
        let payload_len = items.iter().map(Vec::len).sum();
        let mut out = header(payload_len, SHORT_LIST, LONG_LIST);
        for item in items {
            out.extend_from_slice(item);
        }
        out
    }

    fn header(len: usize, short: u8, long: u8) -> Vec<u8> {
        if len <= SHORT_MAX {
            return vec![short + len as u8];
        }
        let len_bytes = (len as u64).to_be_bytes();
        let len_bytes = trim_leading_zeros(&len_bytes);
        let mut out = Vec::with_capacity(1 + len_bytes.len() + len);
        out.push(long + len_bytes.len() as u8);
        out.extend_from_slice(len_bytes);
        out
    }

    fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        &bytes[start..]
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn encodes_scalars() {
            assert_eq!(uint(0), vec![0x80]);
            assert_eq!(uint(0x7f), vec![0x7f]);
            assert_eq!(uint(0x400), vec![0x82, 0x04, 0x00]);
            assert_eq!(bytes(b""), vec![0x80]);
            assert_eq!(bytes(&[0x80]), vec![0x81, 0x80]);
        }

        #[test]
        fn encodes_long_strings_and_lists() {
            let long = vec![0xaa; 56];
            let encoded = bytes(&long);
            assert_eq!(&encoded[..2], &[0xb8, 56]);
            assert_eq!(encoded.len(), 58);

            let encoded = list(&[encoded]);
            assert_eq!(&encoded[..2], &[0xf8, 58]);
        }
    }
}
