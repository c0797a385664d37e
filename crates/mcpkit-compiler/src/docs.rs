//! JSDoc parsing.

use indexmap::IndexMap;

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Text before the first tag, with paragraphs kept.
    pub description: Option<String>,
    /// `@param` descriptions by parameter name.
    pub params: IndexMap<String, String>,
}

impl DocComment {
    /// Parse cleaned JSDoc text (comment markers already removed).
    ///
    /// A tag starts at the beginning of a line or after whitespace, so a
    /// one-line comment such as `Fetches weather. @param city City name`
    /// splits into a description and a parameter. Accepts `@param name desc`, `@param {Type} name desc`,
    /// `@param name - desc` and `@param [name] desc`. A dotted name such as
    /// `params.city` is stored under its last segment.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut description = Vec::new();
        let mut params = IndexMap::new();
        let mut current: Option<(String, Vec<String>)> = None;
        let mut in_tags = false;

        for segment in text.lines().flat_map(split_tags) {
            let trimmed = segment.trim();
            if let Some(tag) = trimmed.strip_prefix('@') {
                in_tags = true;
                if let Some((name, desc)) = current.take() {
                    params.insert(name, desc.join(" "));
                }
                current = parse_param(tag);
                continue;
            }
            if in_tags {
                if let Some((_, desc)) = current.as_mut() {
                    if !trimmed.is_empty() {
                        desc.push(trimmed.to_string());
                    }
                }
            } else {
                description.push(trimmed);
            }
        }
        if let Some((name, desc)) = current {
            params.insert(name, desc.join(" "));
        }
        params.retain(|_, desc: &mut String| !desc.is_empty());

        let description = description.join("\n").trim().to_string();
        Self {
            description: (!description.is_empty()).then_some(description),
            params,
        }
    }

    /// The description of parameter `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Split a line before every `@tag` that follows whitespace. Inline tags
/// such as `{@link X}` and addresses such as `a@b.c` stay intact.
fn split_tags(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut previous: Option<char> = None;
    for (index, c) in line.char_indices() {
        let starts_tag = c == '@'
            && previous.is_some_and(char::is_whitespace)
            && line[index + 1..]
                .chars()
                .next()
                .is_some_and(|next| next.is_ascii_alphabetic());
        if starts_tag {
            segments.push(&line[start..index]);
            start = index;
        }
        previous = Some(c);
    }
    segments.push(&line[start..]);
    segments
}

fn parse_param(tag: &str) -> Option<(String, Vec<String>)> {
    let rest = tag
        .strip_prefix("param")
        .or_else(|| tag.strip_prefix("arg"))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut rest = rest.trim_start();

    if rest.starts_with('{') {
        let end = rest.find('}')?;
        rest = rest[end + 1..].trim_start();
    }

    let (name, desc) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let name = name
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split('=')
        .next()
        .unwrap_or_default();
    let name = name.rsplit('.').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    let desc = desc.trim_start();
    let desc = desc.strip_prefix('-').unwrap_or(desc).trim();
    let lines = if desc.is_empty() {
        Vec::new()
    } else {
        vec![desc.to_string()]
    };
    Some((name.to_string(), lines))
}
