use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub fn trim_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

pub fn validate_wallet_address(value: &str) -> Result<(), ValidationError> {
    let regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_wallet_address")
            .with_message("Wallet address must be a 0x-prefixed 40 hex char string".into()))
    }
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    let rex = Regex::new(r"^[A-Za-z0-9]\w{0,20}$").unwrap();

    for tag in tags {
        let trimmed = tag.trim();

        if trimmed.is_empty() {
            return Err(
                ValidationError::new("invalid_tags").with_message("Tag cannot be empty".into())
            );
        }

        if !rex.is_match(trimmed) {
            return Err(ValidationError::new("invalid_tags")
                .with_message("Tag contains forbidden symbol".into()));
        }
    }
    Ok(())
}

pub fn validate_social_platform(value: &str) -> Result<(), ValidationError> {
    let platforms = ["twitter", "discord", "telegram", "github", "farcaster"];
    if platforms.contains(&value.to_lowercase().as_str()) {
        return Ok(());
    }
    Err(ValidationError::new("invalid_social_platform")
        .with_message("Platform must be twitter, discord, telegram, github or farcaster".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_format() {
        assert!(validate_wallet_address("0x36d37e1d8d70c5b6739fc3e21e1e7eae26a18117").is_ok());
        assert!(validate_wallet_address("0x36D37E1D8D70C5B6739FC3E21E1E7EAE26A18117").is_ok());
        assert!(validate_wallet_address("36d37e1d8d70c5b6739fc3e21e1e7eae26a18117").is_err());
        assert!(validate_wallet_address("0x36d37e1d").is_err());
        assert!(validate_wallet_address("0x36d37e1d8d70c5b6739fc3e21e1e7eae26a1811g").is_err());
    }

    #[test]
    fn tags_reject_symbols() {
        assert!(validate_tags(&["design".to_string(), "rust_dev".to_string()]).is_ok());
        assert!(validate_tags(&["".to_string()]).is_err());
        assert!(validate_tags(&["bad tag!".to_string()]).is_err());
    }

    #[test]
    fn social_platform_allowlist() {
        assert!(validate_social_platform("Twitter").is_ok());
        assert!(validate_social_platform("github").is_ok());
        assert!(validate_social_platform("myspace").is_err());
    }
}
