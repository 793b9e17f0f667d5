use std::sync::OnceLock;

use regex::Regex;

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digit-run pattern is valid"))
}

/// Turn an authority identifier into a wildcard that matches it the way
/// catalogue records tend to store it.
///
/// Records often separate the alphabetic prefix from the number with one
/// or more spaces, e.g. `" n  97800474"`. Leading spaces are dropped by the
/// indexer, so a star between prefix and number is enough. Only the first
/// digit run is kept; anything after it is discarded.
///
/// An identifier without digits comes back unchanged and so only matches
/// exactly.
///
/// ```
/// use labelcheck_recon::matcher::id_to_wildcard;
/// assert_eq!(id_to_wildcard("n12345"), "n*12345");
/// assert_eq!(id_to_wildcard("no54321"), "no*54321");
/// ```
pub fn id_to_wildcard(identifier: &str) -> String {
    match digit_run().find(identifier) {
        Some(m) => format!("{}*{}", &identifier[..m.start()], m.as_str()),
        None => {
            tracing::warn!(identifier, "identifier has no digits, searching for it verbatim");
            identifier.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefix_and_number() {
        assert_eq!(id_to_wildcard("n12345"), "n*12345");
        assert_eq!(id_to_wildcard("no54321"), "no*54321");
        assert_eq!(id_to_wildcard("sh85076502"), "sh*85076502");
    }

    #[test]
    fn only_first_digit_run_is_kept() {
        assert_eq!(id_to_wildcard("n123x45"), "n*123");
        assert_eq!(id_to_wildcard("nr2001-12"), "nr*2001");
    }

    #[test]
    fn leading_digits_give_empty_prefix() {
        assert_eq!(id_to_wildcard("2001012345"), "*2001012345");
    }

    #[test]
    fn no_digits_is_unchanged() {
        assert_eq!(id_to_wildcard("abc"), "abc");
        assert_eq!(id_to_wildcard(""), "");
    }

    proptest! {
        #[test]
        fn star_as_spaces_reproduces_identifier(
            prefix in "[a-z]{0,3}",
            digits in "[0-9]{1,10}",
            spaces in 0usize..4,
        ) {
            let identifier = format!("{prefix}{digits}");
            let pattern = id_to_wildcard(&identifier);
            prop_assert_eq!(pattern.matches('*').count(), 1);
            prop_assert_eq!(pattern.replace('*', ""), identifier);
            let gap = " ".repeat(spaces);
            prop_assert_eq!(pattern.replacen('*', &gap, 1), format!("{prefix}{gap}{digits}"));
        }

        #[test]
        fn digitless_identifiers_pass_through(identifier in "[a-z -]{0,12}") {
            prop_assert_eq!(id_to_wildcard(&identifier), identifier);
        }
    }
}
