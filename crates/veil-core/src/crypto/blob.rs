//! Wire format of an encrypted note.
//!
//! ```text
//! %%VEIL-ENCRYPTED-V1%%<base64 salt>:<base64 iv>:<base64 ciphertext+tag>
//! ```
//!
//! The format is plain ASCII so encrypted notes survive text-only sync tools,
//! and it is bit-exact so external tools can decrypt a vault without Veil.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::key::SALT_LENGTH;
use crate::error::{Result, VeilError};

/// Fixed tag that opens every encrypted blob.
pub const HEADER: &str = "%%VEIL-ENCRYPTED-V1%%";

/// Length of the AES-GCM nonce in bytes.
pub const IV_LENGTH: usize = 12;

/// Whether `content` is an encrypted blob (starts with [`HEADER`]).
pub fn is_encrypted(content: &str) -> bool {
    content.starts_with(HEADER)
}

/// A parsed encrypted blob.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub salt: [u8; SALT_LENGTH],
    pub iv: [u8; IV_LENGTH],
    /// AES-GCM output, authentication tag included.
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Parse the wire form.
    ///
    /// # Errors
    ///
    /// - `VeilError::NotEncrypted` if the header is missing
    /// - `VeilError::MalformedBlob` if the body is not exactly three valid
    ///   base64 fields of the expected sizes
    pub fn parse(content: &str) -> Result<Self> {
        let body = content
            .strip_prefix(HEADER)
            .ok_or(VeilError::NotEncrypted)?;
        // Editors may append a trailing newline on save.
        let body = body.trim_end();

        let fields: Vec<&str> = body.split(':').collect();
        if fields.len() != 3 {
            return Err(VeilError::MalformedBlob(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        }

        let salt = decode_fixed::<SALT_LENGTH>(fields[0], "salt")?;
        let iv = decode_fixed::<IV_LENGTH>(fields[1], "iv")?;
        let ciphertext = STANDARD
            .decode(fields[2])
            .map_err(|e| VeilError::MalformedBlob(format!("ciphertext: {}", e)))?;

        Ok(Self {
            salt,
            iv,
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(field: &str, name: &str) -> Result<[u8; N]> {
    let bytes = STANDARD
        .decode(field)
        .map_err(|e| VeilError::MalformedBlob(format!("{}: {}", name, e)))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        VeilError::MalformedBlob(format!(
            "{} must be {} bytes (got {})",
            name,
            N,
            bytes.len()
        ))
    })
}

impl fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}:{}",
            HEADER,
            STANDARD.encode(self.salt),
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ciphertext)
        )
    }
}

impl fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("salt", &STANDARD.encode(self.salt))
            .field("iv", &STANDARD.encode(self.iv))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedBlob {
        EncryptedBlob {
            salt: [1u8; SALT_LENGTH],
            iv: [2u8; IV_LENGTH],
            ciphertext: vec![3u8; 40],
        }
    }

    #[test]
    fn test_is_encrypted_detects_header() {
        assert!(is_encrypted(&sample().to_string()));
        assert!(!is_encrypted("# Plain note\n#private"));
        assert!(!is_encrypted(""));
        // Header must be a prefix, not merely present.
        assert!(!is_encrypted(&format!("intro\n{}", HEADER)));
    }

    #[test]
    fn test_wire_format_layout() {
        let wire = sample().to_string();
        let body = wire.strip_prefix(HEADER).unwrap();
        let fields: Vec<&str> = body.split(':').collect();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0], STANDARD.encode([1u8; SALT_LENGTH]));
        assert_eq!(fields[1], STANDARD.encode([2u8; IV_LENGTH]));
    }

    #[test]
    fn test_parse_accepts_trailing_newline() {
        let wire = format!("{}\n", sample());
        assert_eq!(EncryptedBlob::parse(&wire).unwrap(), sample());
    }

    #[test]
    fn test_parse_rejects_missing_header() {
        assert!(matches!(
            EncryptedBlob::parse("AAAA:BBBB:CCCC"),
            Err(VeilError::NotEncrypted)
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        for body in ["", "a", "a:b", "a:b:c:d"] {
            let wire = format!("{}{}", HEADER, body);
            assert!(
                matches!(EncryptedBlob::parse(&wire), Err(VeilError::MalformedBlob(_))),
                "body {:?} should be malformed",
                body
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_base64() {
        let wire = format!("{}!!!:{}:{}", HEADER, STANDARD.encode([2u8; 12]), "AAAA");
        assert!(matches!(
            EncryptedBlob::parse(&wire),
            Err(VeilError::MalformedBlob(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_salt_length() {
        let wire = format!(
            "{}{}:{}:{}",
            HEADER,
            STANDARD.encode([1u8; 8]),
            STANDARD.encode([2u8; IV_LENGTH]),
            STANDARD.encode([3u8; 20])
        );
        let err = EncryptedBlob::parse(&wire).unwrap_err();
        assert!(err.to_string().contains("salt must be 16 bytes"));
    }

    #[test]
    fn test_debug_hides_ciphertext() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("ciphertext_len: 40"));
    }
}
