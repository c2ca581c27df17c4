//! String-replacement rules, applied to the raw response body before DOM
//! parsing (spec.md §4.E, detail restored from
//! `internal/bookmarks/content_scripts.go` in SPEC_FULL.md §4.E).

use readeck_types::StringReplacement;

/// Applies every replacement in order. An invalid regex is logged and
/// skipped rather than aborting the whole body rewrite — one bad rule in a
/// site config shouldn't take down extraction for every host it covers.
pub fn apply_string_replacements(body: &str, replacements: &[StringReplacement]) -> String {
    let mut current = body.to_string();
    for rule in replacements {
        current = if rule.is_regex {
            match regex::Regex::new(&rule.find) {
                Ok(re) => re.replace_all(&current, rule.replace.as_str()).into_owned(),
                Err(err) => {
                    tracing::warn!(pattern = %rule.find, %err, "skipping invalid site config regex");
                    current
                }
            }
        } else {
            current.replace(&rule.find, &rule.replace)
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_replacement_is_applied() {
        let rules = vec![StringReplacement { find: "foo".into(), replace: "bar".into(), is_regex: false }];
        assert_eq!(apply_string_replacements("foo baz foo", &rules), "bar baz bar");
    }

    #[test]
    fn regex_replacement_is_applied() {
        let rules = vec![StringReplacement { find: r"\d+".into(), replace: "#".into(), is_regex: true }];
        assert_eq!(apply_string_replacements("id-42-99", &rules), "id-#-#");
    }

    #[test]
    fn invalid_regex_is_skipped_without_panicking() {
        let rules = vec![StringReplacement { find: "(".into(), replace: "x".into(), is_regex: true }];
        assert_eq!(apply_string_replacements("unchanged", &rules), "unchanged");
    }

    #[test]
    fn rules_apply_in_order() {
        let rules = vec![
            StringReplacement { find: "a".into(), replace: "b".into(), is_regex: false },
            StringReplacement { find: "b".into(), replace: "c".into(), is_regex: false },
        ];
        assert_eq!(apply_string_replacements("a", &rules), "c");
    }
}
