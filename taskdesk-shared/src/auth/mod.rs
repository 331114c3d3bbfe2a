/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token generation and validation
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{verify_password, PasswordHasher};
/// use taskdesk_shared::auth::jwt::{create_token, Claims, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = PasswordHasher::default().hash("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(1, TokenType::Access), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
