//! cURL rendering of recorded requests.

use crate::types::NetworkRequest;

/// Multi-line command; the method flag is omitted for `GET`.
pub fn generate_curl_command(request: &NetworkRequest) -> String {
    let mut parts = vec!["curl".to_owned()];
    if !request.method.eq_ignore_ascii_case("GET") {
        parts[0].push_str(&format!(" -X {}", request.method));
    }
    parts.extend(option_args(request));
    parts.join(" \\\n  ")
}

/// Single-line command that always states the method.
pub fn generate_curl_command_explicit(request: &NetworkRequest) -> String {
    let mut parts = vec!["curl".to_owned(), format!("-X {}", request.method)];
    parts.extend(option_args(request));
    parts.join(" ")
}

fn option_args(request: &NetworkRequest) -> Vec<String> {
    let mut args: Vec<String> = request
        .headers
        .iter()
        .map(|(name, value)| format!("-H {}", shell_quote(&format!("{name}: {value}"))))
        .collect();
    if let Some(body) = &request.body {
        args.push(format!("--data-raw {}", shell_quote(body)));
    }
    args.push(shell_quote(&request.url));
    args
}

/// Single-quote for POSIX shells; embedded quotes become `'\''`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;

    /// Minimal POSIX word splitter: single quotes, backslash escapes and
    /// backslash-newline continuations.
    fn shell_words(command: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        let mut in_word = false;
        let mut chars = command.chars();
        while let Some(c) = chars.next() {
            match c {
                '\'' => {
                    in_word = true;
                    for q in chars.by_ref() {
                        if q == '\'' {
                            break;
                        }
                        current.push(q);
                    }
                }
                '\\' => match chars.next() {
                    Some('\n') | None => {}
                    Some(escaped) => {
                        in_word = true;
                        current.push(escaped);
                    }
                },
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    in_word = true;
                    current.push(c);
                }
            }
        }
        if in_word {
            words.push(current);
        }
        words
    }

    struct Parsed {
        method: String,
        url: String,
        headers: BTreeMap<String, String>,
        body: Option<String>,
    }

    fn parse(command: &str) -> Parsed {
        let words = shell_words(command);
        assert_eq!(words[0], "curl");
        let mut parsed = Parsed {
            method: "GET".to_owned(),
            url: String::new(),
            headers: BTreeMap::new(),
            body: None,
        };
        let mut args = words[1..].iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-X" => parsed.method = args.next().expect("method").clone(),
                "-H" => {
                    let header = args.next().expect("header");
                    let (name, value) = header.split_once(": ").expect("name: value");
                    parsed.headers.insert(name.to_owned(), value.to_owned());
                }
                "--data-raw" => parsed.body = Some(args.next().expect("body").clone()),
                url => parsed.url = url.to_owned(),
            }
        }
        parsed
    }

    fn request(method: &str, body: Option<&str>) -> NetworkRequest {
        NetworkRequest {
            url: "https://api.test/search?q=it's&page=2".to_owned(),
            method: method.to_owned(),
            headers: BTreeMap::from([
                ("Authorization".to_owned(), "Bearer abc".to_owned()),
                ("X-Quote".to_owned(), "O'Brien".to_owned()),
            ]),
            query_params: BTreeMap::new(),
            body: body.map(str::to_owned),
            body_size: body.map_or(0, |b| b.len() as u64),
            request_time: 0,
        }
    }

    #[rstest]
    #[case("GET", None)]
    #[case("POST", Some(r#"{"name":"it's \"quoted\"","n":1}"#))]
    #[case("PUT", Some("line one\nline two $HOME `cmd`"))]
    #[case("DELETE", Some(""))]
    fn test_curl_roundtrip(#[case] method: &str, #[case] body: Option<&str>) {
        let original = request(method, body);
        for command in [
            generate_curl_command(&original),
            generate_curl_command_explicit(&original),
        ] {
            let parsed = parse(&command);
            assert_eq!(parsed.method, original.method, "{command}");
            assert_eq!(parsed.url, original.url, "{command}");
            assert_eq!(parsed.headers, original.headers, "{command}");
            assert_eq!(parsed.body, original.body, "{command}");
        }
    }

    #[rstest]
    fn test_minimal_variant_omits_get() {
        let command = generate_curl_command(&request("GET", None));
        assert!(command.starts_with("curl \\\n  -H 'Authorization: Bearer abc'"));
        assert!(!command.contains("-X"));
        assert!(command.ends_with("'https://api.test/search?q=it'\\''s&page=2'"));
    }

    #[rstest]
    fn test_explicit_variant_is_single_line() {
        let command = generate_curl_command_explicit(&request("GET", None));
        assert!(command.starts_with("curl -X GET -H "));
        assert!(!command.contains('\n'));
    }

    #[rstest]
    fn test_body_quote_escaping() {
        let mut req = request("POST", Some("it's"));
        req.headers.clear();
        assert_eq!(
            generate_curl_command(&req),
            "curl -X POST \\\n  --data-raw 'it'\\''s' \\\n  'https://api.test/search?q=it'\\''s&page=2'"
        );
    }
}
