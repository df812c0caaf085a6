use rand::Rng;

pub fn generate_number_code(count: u8) -> String {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| rng.gen_range(0..10).to_string())
        .collect::<String>()
}

pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 4] = rng.gen();
    hex::encode(bytes).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_code_is_numeric() {
        let code = generate_number_code(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn nonce_is_hex() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, generate_nonce());
    }
}
