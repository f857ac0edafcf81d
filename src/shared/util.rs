//! Shared Utilities

/// Mask an email address for log output, e.g. `example@mail.com`
/// becomes `exa****@ma**.com`.
///
/// The trailing half (rounded up) of the local part and of the first
/// domain label are replaced with asterisks. Inputs without an `@` are
/// returned unchanged.
pub fn hide_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let masked_local = mask_tail(local);

    let mut labels = domain.split('.');
    let first_label = labels.next().unwrap_or_default();
    let masked_first = mask_tail(first_label);

    let rest: Vec<&str> = labels.collect();
    let masked_domain = if rest.is_empty() {
        masked_first
    } else {
        format!("{}.{}", masked_first, rest.join("."))
    };

    format!("{}@{}", masked_local, masked_domain)
}

/// Replace the trailing half (rounded up, at least one character) of a
/// string with asterisks.
fn mask_tail(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let masked = chars.len().div_ceil(2).max(1);
    let kept = chars.len() - masked;
    let mut result: String = chars[..kept].iter().collect();
    result.extend(std::iter::repeat('*').take(masked));
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_hide_email_masks_local_and_domain() {
        assert_eq!(hide_email("example@mail.com"), "exa****@ma**.com");
    }

    #[test]
    fn test_hide_email_short_local_part() {
        // Single character local part is fully masked.
        assert_eq!(hide_email("a@mail.com"), "*@ma**.com");
    }

    #[test]
    fn test_hide_email_multi_label_domain() {
        assert_eq!(hide_email("user@mail.co.uk"), "us**@ma**.co.uk");
    }

    #[test]
    fn test_hide_email_without_at_sign() {
        assert_eq!(hide_email("not-an-email"), "not-an-email");
    }
}
