/// Masks a license key for display: `ABCD1234WXYZ5678` becomes
/// `ABCD-****-****-5678`.
///
/// Keys shorter than eight characters are fully masked.
pub fn mask_license_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "****-****-****-****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}-****-****-{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_middle() {
        assert_eq!(mask_license_key("ABCD1234WXYZ5678"), "ABCD-****-****-5678");
    }

    #[test]
    fn short_keys_fully_masked() {
        assert_eq!(mask_license_key(""), "****-****-****-****");
        assert_eq!(mask_license_key("ABCDEFG"), "****-****-****-****");
    }

    #[test]
    fn eight_chars_keeps_both_ends() {
        assert_eq!(mask_license_key("ABCDWXYZ"), "ABCD-****-****-WXYZ");
    }

    #[test]
    fn multibyte_safe() {
        assert_eq!(mask_license_key("ÄÖÜß1234éèêë"), "ÄÖÜß-****-****-éèêë");
    }
}
