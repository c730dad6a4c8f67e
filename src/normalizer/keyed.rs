use crate::model::KeyedFields;

/// Value following the first occurrence of `key`, if both exist.
pub fn value_after<'a>(tokens: &'a [String], key: &str) -> Option<&'a str> {
    let index = tokens.iter().position(|token| token == key)?;
    tokens.get(index + 1).map(String::as_str)
}

/// Turns an alternating `[key, value, key, value, ...]` list into a mapping
/// holding exactly `expected_keys`. Keys that are absent, or sit last with no
/// value after them, map to `None`. Tokens outside the expected keys are
/// dropped.
pub fn to_mapping<S: AsRef<str>>(tokens: &[String], expected_keys: &[S]) -> KeyedFields {
    if tokens.is_empty() {
        return expected_keys
            .iter()
            .map(|key| (key.as_ref().to_string(), None))
            .collect();
    }

    expected_keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            (key.to_string(), value_after(tokens, key).map(str::to_string))
        })
        .collect()
}
