//! "Did you mean?" hints for mistyped profile names.

use strsim::jaro_winkler;

/// Jaro-Winkler favours shared prefixes, which suits names like `prod-eu`.
const SIMILARITY_THRESHOLD: f64 = 0.8;

const MAX_SUGGESTIONS: usize = 3;

/// Hint for an unknown profile `name` given the stored names, or `None` when
/// nothing is close.
///
/// Profile names are case sensitive, so a name that differs only in case gets
/// its own hint instead of a similarity ranking.
pub fn profile_hint<'a>(
    name: &str,
    stored: impl IntoIterator<Item = &'a String>,
) -> Option<String> {
    let stored: Vec<&str> = stored.into_iter().map(String::as_str).collect();

    if let Some(exact) = stored.iter().find(|s| s.eq_ignore_ascii_case(name)) {
        return Some(format!(
            "Profile names are case sensitive. Did you mean '{}'?",
            exact
        ));
    }

    let wanted = name.to_lowercase();
    let mut ranked: Vec<(f64, &str)> = stored
        .into_iter()
        .filter_map(|candidate| {
            let score = jaro_winkler(&wanted, &candidate.to_lowercase());
            (score >= SIMILARITY_THRESHOLD).then_some((score, candidate))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(MAX_SUGGESTIONS);

    match ranked.as_slice() {
        [] => None,
        [(_, only)] => Some(format!("Did you mean '{}'?", only)),
        several => {
            let quoted: Vec<_> = several.iter().map(|(_, s)| format!("'{}'", s)).collect();
            Some(format!("Did you mean one of: {}?", quoted.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_typo() {
        let stored = names(&["production", "staging", "dev"]);
        assert_eq!(
            profile_hint("prodution", &stored).as_deref(),
            Some("Did you mean 'production'?")
        );
    }

    #[test]
    fn test_case_only_mismatch() {
        let stored = names(&["staging", "Prod"]);
        assert_eq!(
            profile_hint("prod", &stored).as_deref(),
            Some("Profile names are case sensitive. Did you mean 'Prod'?")
        );
    }

    #[test]
    fn test_several_close_names_most_similar_first() {
        let stored = names(&["dev", "prod-us", "prod-eu"]);
        assert_eq!(
            profile_hint("prod-e", &stored).as_deref(),
            Some("Did you mean one of: 'prod-eu', 'prod-us'?")
        );
    }

    #[test]
    fn test_no_match() {
        let stored = names(&["production", "staging"]);
        assert_eq!(profile_hint("xyz", &stored), None);
        assert_eq!(profile_hint("prod", &Vec::new()), None);
    }
}
