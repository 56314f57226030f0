/// The `name="value"` pairs of one opening tag, borrowed from the
/// transcript, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Attributes<'a> {
    /// Value of the first attribute called `name`.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':')
}

/// Extract every `name="value"` pair from a tag's attribute region (the
/// text between the tag name and its closing `>`).
///
/// Stray characters between pairs are skipped. An unterminated quote ends
/// parsing: that attribute and anything after it yield nothing.
pub fn parse_attributes(region: &str) -> Attributes<'_> {
    let mut pairs = Vec::new();
    let mut rest = region;

    loop {
        rest = rest.trim_start();
        let name_len = rest
            .char_indices()
            .find(|&(_, c)| !is_name_char(c))
            .map_or(rest.len(), |(i, _)| i);

        if name_len == 0 {
            // Not the start of a name: skip one char and try again.
            let mut chars = rest.chars();
            if chars.next().is_none() {
                break;
            }
            rest = chars.as_str();
            continue;
        }

        let name = &rest[..name_len];
        let after_name = rest[name_len..].trim_start();
        let Some(after_eq) = after_name.strip_prefix('=') else {
            // Bare word (e.g. a boolean attribute); not a pair.
            rest = after_name;
            continue;
        };
        let Some(quoted) = after_eq.trim_start().strip_prefix('"') else {
            rest = after_eq;
            continue;
        };
        let Some(close) = quoted.find('"') else {
            break;
        };

        pairs.push((name, &quoted[..close]));
        rest = &quoted[close + 1..];
    }

    Attributes { pairs }
}
