use regex::Regex;
use tracing::warn;

/// Extract the first standalone 6-digit run from a message body.
///
/// Returns `None` when no such run exists. Nothing checks that the match
/// is actually labeled as a verification code; when the body holds more
/// than one candidate the first occurrence in document order wins and a
/// warning records how many were skipped.
pub fn extract_code(body: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d{6})\b").ok()?;
    let mut matches = re.find_iter(body);
    let first = matches.next()?;
    let skipped = matches.count();
    if skipped > 0 {
        warn!(
            candidates = skipped + 1,
            code = first.as_str(),
            "message body holds multiple 6-digit runs, using the first"
        );
    }
    Some(first.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_code() {
        assert_eq!(
            extract_code("Your code is 123456, expires in 10 minutes"),
            Some("123456".into())
        );
    }

    #[test]
    fn none_when_no_code() {
        assert_eq!(extract_code("no codes here"), None);
    }

    #[test]
    fn first_of_multiple_wins() {
        assert_eq!(
            extract_code("code 111111 or maybe 222222"),
            Some("111111".into())
        );
    }

    #[test]
    fn longer_digit_runs_do_not_match() {
        assert_eq!(extract_code("order 1234567 confirmed"), None);
        assert_eq!(extract_code("order 1234567, code 654321"), Some("654321".into()));
    }

    #[test]
    fn shorter_digit_runs_do_not_match() {
        assert_eq!(extract_code("pin 12345"), None);
    }

    #[test]
    fn code_at_body_edges() {
        assert_eq!(extract_code("987654"), Some("987654".into()));
        assert_eq!(extract_code("code: 987654"), Some("987654".into()));
    }
}
