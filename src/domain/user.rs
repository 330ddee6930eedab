//! Account types.

use serde::{Deserialize, Serialize};

/// An authenticated account as seen by the rest of the application.
///
/// Never carries credential material; see [`StoredUser`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub assessment_complete: bool,
}

impl User {
    /// Copy of this user with the assessment flag set.
    #[must_use]
    pub fn with_assessment_complete(&self) -> Self {
        Self {
            assessment_complete: true,
            ..self.clone()
        }
    }
}

/// A user row together with its Argon2id password hash.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Everything needed to create an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NewUser {
    /// Build a new account with a fresh random id.
    #[must_use]
    pub fn new(email: &str, full_name: &str, password_hash: String) -> Self {
        Self {
            id: uuid_v4(),
            email: normalize_email(email),
            full_name: full_name.trim().to_string(),
            password_hash,
            created_at: chrono::Utc::now(),
        }
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Canonical form used for lookups: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate signup fields.
///
/// # Errors
/// Returns every violation found.
pub fn validate_signup(email: &str, password: &str, full_name: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
        _ => errors.push(format!("Invalid email address '{email}'")),
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
    }
    if full_name.trim().is_empty() {
        errors.push("Full name is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Generate a random UUID v4 string using a CSPRNG.
pub(crate) fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalization() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_signup_validation() {
        assert!(validate_signup("jane@example.com", "long-enough", "Jane Doe").is_ok());

        let errors = validate_signup("not-an-email", "short", "   ").expect_err("Should reject");
        assert_eq!(errors.len(), 3);

        assert!(validate_signup("@example.com", "long-enough", "Jane").is_err());
        assert!(validate_signup("jane@", "long-enough", "Jane").is_err());
    }

    #[test]
    fn test_new_user_normalizes_fields() {
        let user = NewUser::new(" Jane@Example.com", "  Jane Doe ", "$argon2id$stub".to_string());
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.full_name, "Jane Doe");
        assert_eq!(user.id.len(), 36);
    }

    #[test]
    fn test_user_json_shape() {
        let user = User {
            id: "u1".to_string(),
            email: "jane@example.com".to_string(),
            full_name: "Jane Doe".to_string(),
            assessment_complete: false,
        };
        let json = serde_json::to_value(&user).expect("Should serialize");
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["assessmentComplete"], false);

        let parsed: User =
            serde_json::from_str(r#"{"id":"u1","email":"a@b.c","fullName":"A"}"#).expect("Should parse");
        assert!(!parsed.assessment_complete);
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
