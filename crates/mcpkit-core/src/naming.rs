//! Naming convention helpers.
//!
//! Capability names are usually snake_case on the wire (`get_weather`)
//! while implementing members follow TypeScript conventions
//! (`getWeather`). These functions bridge the two so a declared name can be
//! matched against differently-cased members.
//!
//! A name that already uses the target separator is returned unchanged by
//! that conversion, so `to_snake_case("get_Weather")` stays `get_Weather`
//! instead of becoming `get__weather`.

/// Split an identifier into lowercase words.
///
/// Separators (`_`, `-`, whitespace) always split. A case change splits
/// before an uppercase letter that follows a lowercase letter or digit, and
/// before the last uppercase letter of an acronym that is followed by a
/// lowercase letter (`HTTPServer` → `http`, `server`).
fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a name to `snake_case`.
///
/// Names that already contain an underscore are returned unchanged.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    if name.contains('_') {
        return name.to_string();
    }
    words(name).join("_")
}

/// Convert a name to `kebab-case`.
///
/// Names that already contain a hyphen are returned unchanged.
#[must_use]
pub fn to_kebab_case(name: &str) -> String {
    if name.contains('-') {
        return name.to_string();
    }
    words(name).join("-")
}

/// Convert a name to `camelCase`.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    if !name.contains(['_', '-']) && !name.chars().any(char::is_whitespace) {
        // Already a single camel/Pascal token: only the first letter changes.
        let mut chars = name.chars();
        return match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
    }

    let mut out = String::with_capacity(name.len());
    for (i, word) in words(name).iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Convert a name to `PascalCase`.
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    capitalize(&to_camel_case(name))
}

/// All naming variants of `name`, deduplicated, original first.
///
/// Order: original, snake, camel, Pascal, kebab.
#[must_use]
pub fn variants_of(name: &str) -> Vec<String> {
    let candidates = [
        name.to_string(),
        to_snake_case(name),
        to_camel_case(name),
        to_pascal_case(name),
        to_kebab_case(name),
    ];

    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}
