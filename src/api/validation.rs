use super::ApiError;

pub fn validate_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok((username, password))
}

pub fn validate_keyword(keyword: &str) -> Result<&str, ApiError> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Keyword cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_credentials() {
        assert_eq!(
            validate_credentials("  traveller ", "pw").unwrap(),
            ("traveller", "pw")
        );
        assert!(validate_credentials("   ", "password123").is_err());
        assert!(validate_credentials("traveller", "").is_err());
    }

    #[test]
    fn test_validate_keyword() {
        assert_eq!(validate_keyword("  cafe ").unwrap(), "cafe");
        assert!(validate_keyword("").is_err());
        assert!(validate_keyword("   ").is_err());
    }
}
