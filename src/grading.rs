//! Answer grading.

use std::collections::BTreeMap;

/// User entries keyed by blank index. Missing keys mean the blank is empty.
pub type Answers = BTreeMap<usize, String>;

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Case-insensitive, trimmed comparison of one blank. Empty entries never match.
pub fn is_correct(blank: usize, answers: &Answers, expected: &[String]) -> bool {
    let Some(given) = answers.get(&blank) else {
        return false;
    };
    let Some(wanted) = expected.get(blank) else {
        return false;
    };

    let given = normalize(given);
    !given.is_empty() && given == normalize(wanted)
}

/// Number of correct blanks over `0..expected.len()`.
pub fn score(answers: &Answers, expected: &[String]) -> usize {
    (0..expected.len())
        .filter(|&blank| is_correct(blank, answers, expected))
        .count()
}

/// Every blank filled with its expected text, verbatim.
pub fn reveal_all(expected: &[String]) -> Answers {
    expected.iter().cloned().enumerate().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn answers(pairs: &[(usize, &str)]) -> Answers {
        pairs.iter().map(|(i, v)| (*i, v.to_string())).collect()
    }

    #[test]
    fn test_trimmed_case_insensitive_match() {
        let expected = expected(&["Paris", "5"]);
        let answers = answers(&[(0, " paris "), (1, "5")]);

        assert!(is_correct(0, &answers, &expected));
        assert!(is_correct(1, &answers, &expected));
        assert_eq!(score(&answers, &expected), 2);
    }

    #[test]
    fn test_uppercase_with_trailing_space() {
        let expected = expected(&["Exercise"]);
        assert!(is_correct(0, &answers(&[(0, "EXERCISE  ")]), &expected));
    }

    #[test]
    fn test_empty_or_missing_is_incorrect() {
        let expected = expected(&["Exercise"]);
        assert!(!is_correct(0, &answers(&[(0, "")]), &expected));
        assert!(!is_correct(0, &answers(&[(0, "   ")]), &expected));
        assert!(!is_correct(0, &Answers::new(), &expected));
    }

    #[test]
    fn test_whitespace_only_expected_is_never_satisfied() {
        let expected = expected(&["  "]);
        assert!(!is_correct(0, &answers(&[(0, " ")]), &expected));
    }

    #[test]
    fn test_inner_whitespace_matters() {
        let expected = expected(&["ice cream"]);
        assert!(!is_correct(0, &answers(&[(0, "icecream")]), &expected));
        assert!(is_correct(0, &answers(&[(0, "Ice Cream")]), &expected));
    }

    #[test]
    fn test_out_of_range_blank() {
        let expected = expected(&["a"]);
        assert!(!is_correct(4, &answers(&[(4, "a")]), &expected));
        assert_eq!(score(&answers(&[(4, "a")]), &expected), 0);
    }

    #[test]
    fn test_reveal_all_is_verbatim() {
        let expected = expected(&[" Mixed Case ", "x"]);
        let revealed = reveal_all(&expected);
        assert_eq!(revealed[&0], " Mixed Case ");
        assert_eq!(revealed[&1], "x");
        assert_eq!(score(&revealed, &expected), 2);
    }
}
