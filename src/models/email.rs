pub fn password_reset_body(code: &str, ttl_minutes: i64) -> String {
    format!(
        "<p>Your BaseConnect password reset code is <b>{code}</b>.</p>\
         <p>It expires in {ttl_minutes} minutes. If you did not request a reset, ignore this email.</p>"
    )
}

pub const PASSWORD_RESET_SUBJECT: &str = "BaseConnect password reset code";
