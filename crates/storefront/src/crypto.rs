//! Checkout fingerprint cipher.
//!
//! AES-128 in ECB mode with PKCS#7 padding under a key shared with the store
//! API; ciphertext travels as lowercase hex. Both the validation fingerprint
//! and the issued token are wrapped this way.
//!
//! The key ships with every client, so this is request friction against
//! naive automation. It provides no confidentiality.

use aes::Aes128;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use thiserror::Error;

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// Key agreed with the store API.
pub const SHARED_KEY: [u8; 16] = *b"fn1=function(){}";

/// Errors from the fingerprint cipher.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not 128 bits.
    #[error("cipher key must be 16 bytes")]
    InvalidKey,

    /// The fingerprint could not be encoded before encryption.
    #[error("failed to encode fingerprint: {0}")]
    Encode(#[from] serde_json::Error),

    /// Ciphertext is not valid hex.
    #[error("ciphertext is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Ciphertext did not decrypt to correctly padded blocks.
    #[error("ciphertext padding is invalid")]
    Padding,

    /// Plaintext is not UTF-8.
    #[error("plaintext is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// AES-128-ECB with PKCS#7 padding and hex armor.
#[derive(Clone)]
pub struct ObfuscationCipher {
    key: [u8; 16],
}

impl ObfuscationCipher {
    /// Create a cipher with a custom key.
    #[must_use]
    pub const fn new(key: [u8; 16]) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` and return lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher cannot be keyed.
    pub fn encrypt_hex(&self, plaintext: &str) -> Result<String, CipherError> {
        Ok(hex::encode(self.encrypt_bytes(plaintext.as_bytes())?))
    }

    /// Decrypt lowercase or uppercase hex back to text.
    ///
    /// The client never needs this; the store API and test doubles do.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not hex, is not a whole number of
    /// padded blocks, or does not decode to UTF-8.
    pub fn decrypt_hex(&self, ciphertext: &str) -> Result<String, CipherError> {
        let bytes = hex::decode(ciphertext)?;
        let plaintext = Aes128EcbDec::new_from_slice(&self.key)
            .map_err(|_| CipherError::InvalidKey)?
            .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
            .map_err(|_| CipherError::Padding)?;
        Ok(String::from_utf8(plaintext)?)
    }

    fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let encryptor =
            Aes128EcbEnc::new_from_slice(&self.key).map_err(|_| CipherError::InvalidKey)?;
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    }
}

impl Default for ObfuscationCipher {
    fn default() -> Self {
        Self::new(SHARED_KEY)
    }
}

impl std::fmt::Debug for ObfuscationCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObfuscationCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fips197_known_answer() {
        // FIPS-197 appendix C.1; PKCS#7 appends a full padding block.
        let key: [u8; 16] = hex::decode("000102030405060708090a0b0c0d0e0f")
            .unwrap()
            .try_into()
            .unwrap();
        let plaintext = hex::decode("00112233445566778899aabbccddeeff").unwrap();

        let ciphertext = ObfuscationCipher::new(key).encrypt_bytes(&plaintext).unwrap();

        assert_eq!(ciphertext.len(), 32);
        assert_eq!(hex::encode(&ciphertext[..16]), "69c4e0d86a7b0430d8cdb78070b4c55a");
    }

    #[test]
    fn test_hex_output_is_lowercase_and_block_aligned() {
        let cipher = ObfuscationCipher::default();

        let short = cipher.encrypt_hex("T").unwrap();
        assert_eq!(short.len(), 32);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        // Exactly one block of input still gains a padding block.
        assert_eq!(cipher.encrypt_hex("0123456789abcdef").unwrap().len(), 64);
    }

    #[test]
    fn test_ecb_is_deterministic() {
        let cipher = ObfuscationCipher::default();
        assert_eq!(
            cipher.encrypt_hex("token-123").unwrap(),
            cipher.encrypt_hex("token-123").unwrap()
        );
        assert_ne!(cipher.encrypt_hex("token-123").unwrap(), "token-123");
    }

    #[test]
    fn test_decrypt_recovers_plaintext() {
        let cipher = ObfuscationCipher::default();
        let message = r#"{"keysOnUp":3,"tapsCount":1}"#;
        let encrypted = cipher.encrypt_hex(message).unwrap();
        assert_eq!(cipher.decrypt_hex(&encrypted).unwrap(), message);
    }

    #[test]
    fn test_decrypt_rejects_garbage() {
        let cipher = ObfuscationCipher::default();
        assert!(matches!(cipher.decrypt_hex("zz"), Err(CipherError::Hex(_))));
        assert!(matches!(
            cipher.decrypt_hex("00112233445566778899aabbccddee"),
            Err(CipherError::Padding)
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", ObfuscationCipher::default());
        assert!(!debug.contains("function"));
        assert!(debug.contains("[REDACTED]"));
    }
}
