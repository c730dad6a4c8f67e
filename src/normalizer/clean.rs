/// Tidies raw text tokens: newlines and tabs are removed outright, the rest
/// is trimmed and inner whitespace runs collapse to one space. Tokens left
/// empty are dropped, order is kept.
pub fn clean(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|token| clean_token(&token))
        .filter(|token| !token.is_empty())
        .collect()
}

fn clean_token(token: &str) -> String {
    let stripped: String = token.chars().filter(|c| !matches!(c, '\n' | '\t')).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn strips_whitespace_and_drops_empty_tokens() {
        let raw = tokens(&["\n\t  ", "  £500 pcm ", "\n", "Double\n\t", "Garden /\u{a0}  terrace"]);
        assert_eq!(clean(raw), tokens(&["£500 pcm", "Double", "Garden / terrace"]));
    }

    #[test]
    fn newlines_are_removed_not_replaced() {
        assert_eq!(clean(tokens(&["Ad ref#\n12345"])), tokens(&["Ad ref#12345"]));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = vec![
            tokens(&[]),
            tokens(&["", " ", "\t"]),
            tokens(&["  a  b ", "c\n d", "\r\ne\u{a0}\u{a0}f  "]),
            tokens(&["(Room 1)", "£400", "Bills included?", " Yes "]),
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(once.clone()), once);
        }
    }
}
