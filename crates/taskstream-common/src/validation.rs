//! Field validation for registration and task payloads.
//!
//! Validators collect every problem instead of failing on the first, so the
//! API can report the full list in one response.

/// Validate registration fields. Returns the list of problems (empty = valid).
pub fn validate_new_user(name: &str, email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if name.trim().chars().count() < 2 {
        errors.push("Name must be at least 2 characters".to_string());
    }
    if !is_valid_email(email) {
        errors.push("Invalid email".to_string());
    }
    if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }

    errors
}

/// Validate task title and description lengths.
pub fn validate_task_fields(title: &str, description: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let title_len = title.trim().chars().count();

    if title_len < 3 {
        errors.push("Title must be at least 3 characters".to_string());
    }
    if title_len > 100 {
        errors.push("Title must be at most 100 characters".to_string());
    }
    if description.chars().count() > 500 {
        errors.push("Description must be at most 500 characters".to_string());
    }

    errors
}

/// Shape check for email addresses: exactly one '@', no whitespace, and the
/// domain part must contain a dot with characters on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.co"));
        assert!(is_valid_email("a@b.c"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain."));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@ex@ample.com"));
    }

    #[test]
    fn test_validate_new_user_ok() {
        assert!(validate_new_user("Ada", "ada@example.com", "secret123").is_empty());
    }

    #[test]
    fn test_validate_new_user_collects_all_errors() {
        let errors = validate_new_user("A", "not-an-email", "123");
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("Name"));
        assert!(errors[1].contains("email"));
        assert!(errors[2].contains("Password"));
    }

    #[test]
    fn test_validate_new_user_short_password() {
        let errors = validate_new_user("Ada", "ada@example.com", "12345");
        assert_eq!(errors, vec!["Password must be at least 6 characters"]);
    }

    #[test]
    fn test_validate_task_fields_ok() {
        assert!(validate_task_fields("Fix the build", "").is_empty());
    }

    #[test]
    fn test_validate_task_title_too_short() {
        let errors = validate_task_fields("ab", "");
        assert_eq!(errors, vec!["Title must be at least 3 characters"]);
    }

    #[test]
    fn test_validate_task_title_trimmed_before_length_check() {
        let errors = validate_task_fields("  a  ", "");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_task_title_too_long() {
        let title = "x".repeat(101);
        let errors = validate_task_fields(&title, "");
        assert_eq!(errors, vec!["Title must be at most 100 characters"]);
    }

    #[test]
    fn test_validate_task_title_at_limit() {
        let title = "x".repeat(100);
        assert!(validate_task_fields(&title, "").is_empty());
    }

    #[test]
    fn test_validate_task_description_too_long() {
        let description = "d".repeat(501);
        let errors = validate_task_fields("Valid title", &description);
        assert_eq!(errors, vec!["Description must be at most 500 characters"]);
    }

    #[test]
    fn test_validate_task_multibyte_lengths() {
        // 3 multibyte chars are a valid title even though the byte length is larger
        assert!(validate_task_fields("äöü", "").is_empty());
    }
}
