//! Password-based envelope compatible with
//! `openssl enc -aes-256-cbc -pbkdf2 -md sha256 -a`.
//!
//! Layout before armoring: `"Salted__" || salt[8] || AES-256-CBC(PKCS#7)`.
//! Key and IV are the first 32 and next 16 bytes of PBKDF2-HMAC-SHA256 over
//! the password and salt.
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore as _;
use sha2::Sha256;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const MAGIC: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
/// PBKDF2 rounds; matches the `openssl enc -pbkdf2` default.
pub const ITERATIONS: u32 = 10_000;
/// Armored lines are wrapped like `openssl enc -a`.
const LINE_WIDTH: usize = 64;

fn derive(password: &str, salt: &[u8]) -> [u8; KEY_LEN + IV_LEN] {
    let mut out = [0u8; KEY_LEN + IV_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut out);
    out
}

/// Encrypt `plaintext` under `password` with a fresh random salt.
#[must_use]
pub fn seal(password: &str, plaintext: &[u8]) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    seal_with_salt(password, &salt, plaintext)
}

fn seal_with_salt(password: &str, salt: &[u8; SALT_LEN], plaintext: &[u8]) -> String {
    let material = derive(password, salt);
    let (key, iv) = material.split_at(KEY_LEN);
    let mut envelope = Vec::with_capacity(MAGIC.len() + SALT_LEN + plaintext.len() + IV_LEN);
    envelope.extend_from_slice(MAGIC);
    envelope.extend_from_slice(salt);
    // Key and IV lengths are fixed above, so construction cannot fail.
    if let Ok(cipher) = Aes256CbcEnc::new_from_slices(key, iv) {
        envelope.extend(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext));
    }
    armor(&envelope)
}

fn armor(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 1);
    for line in encoded.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out
}

/// Decrypt an armored envelope. `None` means the password is wrong or the
/// envelope is corrupt; the two are indistinguishable.
#[must_use]
pub fn open(password: &str, armored: &str) -> Option<Vec<u8>> {
    let compact: String = armored.split_whitespace().collect();
    let bytes = STANDARD.decode(compact).ok()?;
    let rest = bytes.strip_prefix(MAGIC)?;
    let (salt, ciphertext) = rest.split_at_checked(SALT_LEN)?;
    if ciphertext.is_empty() {
        return None;
    }
    let material = derive(password, salt);
    let (key, iv) = material.split_at(KEY_LEN);
    Aes256CbcDec::new_from_slices(key, iv)
        .ok()?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .ok()
}
