use web3::signing::{hash_message, recover};

use crate::middleware::error::AppError;

/// Recovers the signer address of an EIP-191 personal_sign signature.
/// Returns the address as a lowercase 0x-prefixed hex string.
pub fn recover_personal(message: &str, signature_hex: &str) -> Result<String, AppError> {
    let sig_hex = signature_hex.trim_start_matches("0x");
    let sig_bytes = hex::decode(sig_hex).map_err(|_| AppError::AuthenticationFail {
        description: "Signature is not valid hex".to_string(),
    })?;

    if sig_bytes.len() != 65 {
        return Err(AppError::AuthenticationFail {
            description: "Signature must be 65 bytes".to_string(),
        });
    }

    // wallets emit v as 27/28, some libraries as raw 0/1
    let recovery_id = match sig_bytes[64] {
        v @ 27..=28 => (v - 27) as i32,
        v @ 0..=1 => v as i32,
        _ => {
            return Err(AppError::AuthenticationFail {
                description: "Signature recovery id out of range".to_string(),
            })
        }
    };

    let msg_hash = hash_message(message.as_bytes());
    let address = recover(msg_hash.as_bytes(), &sig_bytes[..64], recovery_id).map_err(|_| {
        AppError::AuthenticationFail {
            description: "Signature does not recover to a valid address".to_string(),
        }
    })?;

    Ok(format!("{:#x}", address))
}

pub fn addresses_match(recovered: &str, claimed: &str) -> bool {
    recovered.eq_ignore_ascii_case(claimed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use secp256k1::SecretKey;
    use web3::signing::{Key, SecretKeyRef};

    fn random_key() -> SecretKey {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        SecretKey::from_slice(&bytes).unwrap()
    }

    fn sign_personal(key: &SecretKey, message: &str) -> (String, String) {
        let key_ref = SecretKeyRef::new(key);
        let address = format!("{:#x}", key_ref.address());
        let hash = hash_message(message.as_bytes());
        let sig = key_ref.sign(hash.as_bytes(), None).unwrap();
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(sig.r.as_bytes());
        bytes[32..64].copy_from_slice(sig.s.as_bytes());
        bytes[64] = sig.v as u8;
        (address, format!("0x{}", hex::encode(bytes)))
    }

    #[test]
    fn recovers_signer_address() {
        let key = random_key();
        let (address, signature) = sign_personal(&key, "hello nonce");
        let recovered = recover_personal("hello nonce", &signature).unwrap();
        assert!(addresses_match(&recovered, &address));
    }

    #[test]
    fn different_message_recovers_other_address() {
        let key = random_key();
        let (address, signature) = sign_personal(&key, "message one");
        let recovered = recover_personal("message two", &signature).unwrap();
        assert!(!addresses_match(&recovered, &address));
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert!(recover_personal("msg", "0xzz").is_err());
        assert!(recover_personal("msg", "0x1234").is_err());
        let mut bad = [0u8; 65];
        bad[64] = 5;
        assert!(recover_personal("msg", &hex::encode(bad)).is_err());
    }
}
