//! Stable local identifiers for discovered instances.
//!
//! Remote names are free-form ("Quantum Volume", "2-design", "QFT"). Each
//! cached instance is also reachable under an identifier derived from its
//! name so it can be addressed like a field: ASCII alphanumerics and
//! underscores only, `snake_case`, never starting with a digit and never a
//! reserved word.

/// Words that cannot be used as a bare identifier.
const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

/// Convert a remote name into an identifier.
///
/// The transform is deterministic but not injective: `"QFT"` and `"qft"`
/// both map to `qft`. Uniqueness is the registry's job, see
/// [`ServiceRegistry::unique_identifier`](crate::ServiceRegistry::unique_identifier).
pub fn to_identifier(name: &str) -> String {
    let chars: Vec<char> = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut ident = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let after_word = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym = prev.is_ascii_uppercase() && next_is_lower;
            if after_word || ends_acronym {
                ident.push('_');
            }
        }
        ident.push(c.to_ascii_lowercase());
    }

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    while RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    }

    ident
}

/// Whether `ident` is already in the shape produced by [`to_identifier`].
pub fn is_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !RESERVED.contains(&ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_camel_case_names() {
        assert_eq!(to_identifier("QFT"), "qft");
        assert_eq!(to_identifier("QuantumVolume"), "quantum_volume");
        assert_eq!(to_identifier("FourierChecking"), "fourier_checking");
        assert_eq!(to_identifier("HTTPServer"), "http_server");
        assert_eq!(to_identifier("Grover2Search"), "grover2_search");
    }

    #[test]
    fn test_invalid_characters_replaced() {
        assert_eq!(to_identifier("my-circuit 2"), "my_circuit_2");
        assert_eq!(to_identifier("a.b"), "a_b");
        assert_eq!(to_identifier("é"), "_");
    }

    #[test]
    fn test_leading_digit_escaped() {
        assert_eq!(to_identifier("2design"), "_2design");
        assert_eq!(to_identifier(""), "_");
    }

    #[test]
    fn test_reserved_words() {
        assert_eq!(to_identifier("type"), "type_");
        assert_eq!(to_identifier("Match"), "match_");
    }

    proptest! {
        #[test]
        fn prop_output_is_identifier(name in "\\PC{0,24}") {
            let ident = to_identifier(&name);
            prop_assert!(is_identifier(&ident), "{:?} -> {:?}", name, ident);
        }

        #[test]
        fn prop_deterministic(name in "[A-Za-z0-9 _-]{0,24}") {
            prop_assert_eq!(to_identifier(&name), to_identifier(&name));
        }
    }
}
