//! Authentication for the Tesla owner API.

use crate::tesla::thing::Token;
use std::{env, error, fmt};

/// Name of the environment variable that can supply an access token
/// directly, bypassing the password grant.
pub const ACCESS_TOKEN_ENV: &str = "TESLA_ACCESS_TOKEN";

/// Manages the bearer token sent with every API request.
#[derive(Clone)]
pub struct Auth {
    access_token: String,
}

impl Auth {
    /// Creates a new `Auth` structure using the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        Self { access_token }
    }

    /// Retrieves an access token from the environment.
    ///
    /// Returns an error if the token cannot be retrieved from the
    /// environment.
    pub fn from_env(envvar: impl Into<String>) -> AuthResult {
        let access_token = env::var(envvar.into()).map_err(AuthError::EnvError)?;
        Ok(Self { access_token })
    }

    /// The actual access token.
    ///
    /// # Examples
    ///
    /// ```
    /// use tesla_cli::tesla::Auth;
    /// let auth = Auth::new("ThisIsMyToken");
    /// assert_eq!(auth.access_token(), "ThisIsMyToken");
    /// ```
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value of the `Authorization` header for API requests.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl From<Token> for Auth {
    fn from(token: Token) -> Self {
        Auth::new(token.access_token())
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Standard result type for [`Auth`] creation.
pub type AuthResult = Result<Auth, AuthError>;

/// Indicates an error when creating an access token.
#[derive(Debug)]
pub enum AuthError {
    /// An error occurred while retrieving a token from the environment.
    EnvError(env::VarError),
}

impl From<env::VarError> for AuthError {
    fn from(error: env::VarError) -> Self {
        AuthError::EnvError(error)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::EnvError(err) => write!(f, "Environment error: {err}"),
        }
    }
}

impl error::Error for AuthError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            AuthError::EnvError(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::load_data;
    use temp_env::{with_var, with_var_unset};

    #[test]
    fn it_creates_an_auth_token_from_the_environment() {
        let key_name = "TESLA_TEST_ACCESS_TOKEN";
        let key_value = "ThisIsMyToken";
        with_var(key_name, Some(key_value), || {
            let auth = Auth::from_env(key_name);
            assert!(auth.is_ok());
            let auth = auth.unwrap();
            assert_eq!(auth.access_token(), key_value);
        })
    }

    #[test]
    fn it_returns_an_error_if_a_token_is_not_set_in_environment() {
        let key_name = "TESLA_TEST_ACCESS_TOKEN";
        with_var_unset(key_name, || {
            let auth = Auth::from_env(key_name);
            assert!(auth.is_err());
            assert!(matches!(
                auth.unwrap_err(),
                AuthError::EnvError(env::VarError::NotPresent)
            ));
        })
    }

    #[test]
    fn it_creates_an_auth_token_from_an_oauth_token() {
        let token = Token::parse(&load_data("token")).unwrap();
        let auth = Auth::from(token);
        assert_eq!(auth.access_token(), "qts-0123456789abcdef");
    }

    #[test]
    fn it_formats_a_bearer_header() {
        let auth = Auth::new("abc123");
        assert_eq!(auth.header_value(), "Bearer abc123");
    }

    #[test]
    fn it_does_not_leak_the_token_when_debugging() {
        let auth = Auth::new("abc123");
        let debugged = format!("{auth:?}");
        assert!(!debugged.contains("abc123"));
    }
}
