pub const CLOSE_CODE_ELIMINATED: u16 = 4000;
pub const CLOSE_CODE_REJECTED: u16 = 1000;

pub fn truncate_name(value: &str, max_len: usize) -> String {
    match value.char_indices().nth(max_len) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_name_keeps_leading_characters() {
        assert_eq!(truncate_name("abcdefghij", 4), "abcd");
        assert_eq!(truncate_name("abc", 4), "abc");
        assert_eq!(truncate_name("", 4), "");
        assert_eq!(truncate_name("  x  ", 25), "  x  ");
    }

    #[test]
    fn truncate_name_counts_characters_not_bytes() {
        let truncated = truncate_name("ねこねこねこ", 4);
        assert_eq!(truncated, "ねこねこ");
        assert_eq!(truncated.chars().count(), 4);
    }

    #[test]
    fn truncate_to_exact_max_length() {
        let long = "x".repeat(40);
        assert_eq!(truncate_name(&long, 25).chars().count(), 25);
    }
}
