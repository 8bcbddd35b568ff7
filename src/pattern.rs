//! Route template compiler.
//!
//! `/users/:id/:slug` becomes `^/users/(?P<id>[^/]+)/(?P<slug>[^/]+)$`.
//! Everything outside a `:name` placeholder is matched literally. One
//! trailing slash is stripped from the template here and from the incoming
//! path in [`Pattern::captures`], so `/users/42` and `/users/42/` are the
//! same request.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled route template.
#[derive(Clone, Debug)]
pub struct Pattern {
    raw: String,
    regex: Regex,
    names: Vec<String>,
}

impl Pattern {
    /// Compiles `template`.
    ///
    /// A placeholder is `:` directly after a `/`, followed by word characters;
    /// anything after the name in the same segment is literal. Fails with
    /// [`Error::InvalidRouteTemplate`] when the template is blank or repeats
    /// a placeholder name.
    pub fn compile(template: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRouteTemplate {
            template: template.to_owned(),
            reason,
        };

        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Err(invalid("template is empty".into()));
        }
        let body = strip_trailing_slash(trimmed);

        let mut source = String::from("^");
        let mut names: Vec<String> = Vec::new();
        for (i, segment) in body.split('/').enumerate() {
            if i > 0 {
                source.push('/');
            }
            let name_len = segment
                .strip_prefix(':')
                .map(|rest| rest.bytes().take_while(|b| b.is_ascii_alphanumeric() || *b == b'_').count())
                .unwrap_or(0);
            // Only a placeholder when it follows a slash, i.e. not the very first segment.
            if i == 0 || name_len == 0 {
                source.push_str(&regex::escape(segment));
                continue;
            }
            let name = &segment[1..=name_len];
            if names.iter().any(|n| n == name) {
                return Err(invalid(format!("placeholder `:{name}` appears twice")));
            }
            source.push_str(&format!("(?P<{name}>[^/]+)"));
            source.push_str(&regex::escape(&segment[name_len + 1..]));
            names.push(name.to_owned());
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;
        Ok(Self { raw: body.to_owned(), regex, names })
    }

    /// The template with its trailing slash removed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in the order they appear in the template.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Matches `path` and returns the captured parameters in template order.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(strip_trailing_slash(path))?;
        Some(
            self.names
                .iter()
                .filter_map(|n| caps.name(n).map(|m| (n.clone(), m.as_str().to_owned())))
                .collect(),
        )
    }
}

pub(crate) fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn captures_named_segments_in_order() {
        let p = Pattern::compile("/users/:id/:slug").unwrap();
        assert_eq!(p.names(), ["id", "slug"]);
        assert_eq!(
            p.captures("/users/42/hello-world"),
            Some(pairs(&[("id", "42"), ("slug", "hello-world")]))
        );
    }

    #[test]
    fn anchored_at_both_ends() {
        let p = Pattern::compile("/users/:id").unwrap();
        assert_eq!(p.captures("/users/42/posts"), None);
        assert_eq!(p.captures("/api/users/42"), None);
        assert_eq!(p.captures("/users/"), None);
    }

    #[test]
    fn trailing_slash_is_ignored_on_both_sides() {
        let p = Pattern::compile("/users/:id/").unwrap();
        assert_eq!(p.raw(), "/users/:id");
        assert_eq!(p.captures("/users/42/"), p.captures("/users/42"));
        assert!(p.captures("/users/42").is_some());
    }

    #[test]
    fn root_matches_empty_and_slash() {
        let p = Pattern::compile("/").unwrap();
        assert_eq!(p.captures("/"), Some(vec![]));
        assert_eq!(p.captures(""), Some(vec![]));
        assert_eq!(p.captures("/home"), None);
    }

    #[test]
    fn literal_segments_are_escaped() {
        let p = Pattern::compile("/files/a.b").unwrap();
        assert!(p.captures("/files/a.b").is_some());
        assert!(p.captures("/files/axb").is_none());
    }

    #[test]
    fn placeholder_name_stops_at_first_non_word_character() {
        let p = Pattern::compile("/posts/:id.json").unwrap();
        assert_eq!(p.names(), ["id"]);
        assert_eq!(p.captures("/posts/7.json"), Some(pairs(&[("id", "7")])));
        assert_eq!(p.captures("/posts/7.xml"), None);
    }

    #[test]
    fn bare_colon_is_literal() {
        let p = Pattern::compile("/time/:").unwrap();
        assert!(p.names().is_empty());
        assert!(p.captures("/time/:").is_some());
    }

    #[test]
    fn rejects_blank_templates() {
        for bad in ["", "   "] {
            assert!(matches!(Pattern::compile(bad), Err(Error::InvalidRouteTemplate { .. })));
        }
    }

    #[test]
    fn rejects_duplicate_placeholder_names() {
        let err = Pattern::compile("/org/:id/user/:id").unwrap_err();
        assert!(err.to_string().contains("`:id` appears twice"), "{err}");
    }
}
