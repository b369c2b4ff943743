use std::fmt;

use validator::Validate;

#[derive(Clone, Validate)]
pub struct CreateAccountDto {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,
    pub password: String,
}

impl fmt::Debug for CreateAccountDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountDto")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
