const TOKEN_MASK: &str = "************";
const EMAIL_MASK: &str = "****@******";

/// Mask bearer token suitable for use in logs.
pub fn token(token: &str) -> String {
    match token.get(0..4) {
        Some(prefix) if token.len() > 8 => format!("{}{}", prefix, TOKEN_MASK),
        _ => TOKEN_MASK.to_string(),
    }
}

/// Mask email address suitable for use in logs, keeping the first character of
/// the mailbox and the last two of the domain.
pub fn email(address: &str) -> String {
    let (mailbox, domain) = match address.split_once('@') {
        Some(parts) => parts,
        None => return EMAIL_MASK.to_string(),
    };

    let first = mailbox.chars().next();
    let tail: String = {
        let chars: Vec<char> = domain.chars().collect();
        if chars.len() > 2 {
            chars[chars.len() - 2..].iter().collect()
        } else {
            String::new()
        }
    };

    match first {
        Some(first) if !tail.is_empty() => format!("{}{}{}", first, EMAIL_MASK, tail),
        _ => EMAIL_MASK.to_string(),
    }
}
