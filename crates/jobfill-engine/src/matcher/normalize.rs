//! Label and key normalization.

/// Characters that separate words rather than belong to them.
const SEPARATORS: &[char] = &['_', '-', '.', '/', '|', ':', ',', '&', '+'];

/// Lowercase, turn separators into spaces, drop other punctuation and
/// collapse whitespace. `"E-mail Address *"` becomes `"e mail address"`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() || SEPARATORS.contains(&c) {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a code identifier (`firstName`, `years_experience`,
/// `skill2`): split camel case and letter/digit boundaries first.
///
/// Only for identifiers. Human text keeps brand casing such as "LinkedIn"
/// intact and goes through [`normalize`].
pub fn normalize_identifier(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut split = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next_lower)
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic());
            if boundary {
                split.push(' ');
            }
        }
        split.push(c);
    }
    normalize(&split)
}

/// Tokens that carry no field meaning ("Please enter your ...").
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "your", "you", "my", "our", "of", "for", "to", "in", "please", "enter",
    "what", "is", "are", "do", "optional", "required",
];

/// Tokens used for fuzzy comparison: stopwords and numbering ("Skill 2")
/// removed.
pub fn match_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !STOPWORDS.contains(t))
        .collect()
}
