//! Caption clean-up applied before tokenization.
//!
//! The two sides are treated differently: references are lower-cased and lose
//! `. ! , ; ?`, predictions only lose non-ASCII characters. Scores depend on this
//! asymmetry, so it is kept as is.

const REFERENCE_PUNCTUATION: [char; 5] = ['.', '!', ',', ';', '?'];

/// Replaces every character at or above code point 128 with a single space.
pub fn remove_nonascii(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect()
}

pub fn normalize_prediction(text: &str) -> String {
    remove_nonascii(text)
}

pub fn normalize_reference(text: &str) -> String {
    // lower-case first: a non-ASCII character may lower-case into several code points,
    // and each of those becomes its own space
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if !c.is_ascii() || REFERENCE_PUNCTUATION.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_are_normalized_differently() {
        assert_eq!(normalize_reference("Hello, World!"), "hello  world ");
        assert_eq!(normalize_prediction("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_nonascii_becomes_one_space_per_char() {
        assert_eq!(remove_nonascii("café au lait"), "caf  au lait");
        assert_eq!(remove_nonascii("日本"), "  ");
        assert_eq!(normalize_prediction("naïve?"), "na ve?");
    }

    #[test]
    fn test_reference_keeps_other_punctuation() {
        assert_eq!(
            normalize_reference("He's at the door: (maybe)?"),
            "he's at the door: (maybe) "
        );
    }

    #[test]
    fn test_reference_strips_nonascii_after_lowercasing() {
        assert_eq!(normalize_reference("ÉCOLE."), " cole ");
    }
}
