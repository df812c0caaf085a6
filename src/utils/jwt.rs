use chrono::{Duration, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entities::user_auth::local_user_entity::UserRole;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenType {
    Login,
    Otp,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub auth: String,
    pub role: Option<UserRole>,
    pub profile_completed: bool,
    pub exp: usize,
    pub iat: usize,
    pub r#type: TokenType,
}

pub struct JWT {
    key_enc: EncodingKey,
    key_dec: DecodingKey,
    duration: TimeDelta,
}

impl JWT {
    pub fn new(secret: String, duration: TimeDelta) -> Self {
        Self {
            duration,
            key_enc: EncodingKey::from_secret(secret.as_ref()),
            key_dec: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    pub fn create_by_login(
        &self,
        user_id: &str,
        role: Option<UserRole>,
        profile_completed: bool,
    ) -> Result<String, String> {
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            role,
            profile_completed,
            exp: (Utc::now() + self.duration).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
            r#type: TokenType::Login,
        };

        encode(&Header::default(), &claims, &self.key_enc).map_err(|err| err.to_string())
    }

    // short-lived token issued after OTP verification, only valid for password reset
    pub fn create_by_otp(&self, user_id: &str) -> Result<String, String> {
        let claims = Claims {
            sub: user_id.to_string(),
            auth: user_id.to_string(),
            role: None,
            profile_completed: false,
            exp: (Utc::now() + Duration::minutes(10)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
            r#type: TokenType::Otp,
        };

        encode(&Header::default(), &claims, &self.key_enc).map_err(|err| err.to_string())
    }

    pub fn decode_by_type(&self, token: &str, r#type: TokenType) -> Result<Claims, String> {
        let token_message =
            decode::<Claims>(token, &self.key_dec, &Validation::new(Algorithm::HS256));

        let data = match token_message {
            Ok(data) => data.claims,
            Err(err) => return Err(err.to_string()),
        };

        if data.r#type == r#type {
            Ok(data)
        } else {
            Err("Token type is not equal".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JWT {
        JWT::new("secret".to_string(), Duration::days(7))
    }

    #[test]
    fn login_token_round_trip() {
        let jwt = jwt();
        let token = jwt
            .create_by_login("local_user:abc", Some(UserRole::Creator), true)
            .unwrap();
        let claims = jwt.decode_by_type(&token, TokenType::Login).unwrap();
        assert_eq!(claims.auth, "local_user:abc");
        assert_eq!(claims.role, Some(UserRole::Creator));
        assert!(claims.profile_completed);
    }

    #[test]
    fn otp_token_is_not_a_login_token() {
        let jwt = jwt();
        let token = jwt.create_by_otp("local_user:abc").unwrap();
        assert!(jwt.decode_by_type(&token, TokenType::Login).is_err());
        assert!(jwt.decode_by_type(&token, TokenType::Otp).is_ok());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = jwt()
            .create_by_login("local_user:abc", None, false)
            .unwrap();
        let other = JWT::new("other-secret".to_string(), Duration::days(7));
        assert!(other.decode_by_type(&token, TokenType::Login).is_err());
    }
}
