use docserve::http::parser::{
    decode_target, parse_header_line, parse_request_line, read_request, ParseError,
};
use docserve::http::reader::LineReader;
use docserve::http::request::Method;

async fn parse(raw: &[u8]) -> Result<Option<docserve::http::request::Request>, ParseError> {
    let mut reader = LineReader::new(raw);
    read_request(&mut reader, 10).await
}

#[test]
fn test_request_line_three_tokens() {
    let (method, target, version) = parse_request_line("GET /index.html HTTP/1.1").unwrap();

    assert_eq!(method, Method::GET);
    assert_eq!(target, "/index.html");
    assert_eq!(version, "HTTP/1.1");
}

#[test]
fn test_request_line_percent_encoded_space() {
    let (_, target, _) = parse_request_line("GET /a%20b.html HTTP/1.1").unwrap();
    assert_eq!(target, "/a b.html");
}

#[test]
fn test_request_line_plus_is_space() {
    let (_, target, _) = parse_request_line("GET /a+b.html HTTP/1.1").unwrap();
    assert_eq!(target, "/a b.html");
}

#[test]
fn test_request_line_encoded_plus_stays_plus() {
    let (_, target, _) = parse_request_line("GET /c%2B%2B.txt HTTP/1.1").unwrap();
    assert_eq!(target, "/c++.txt");
}

#[test]
fn test_request_line_query_is_dropped() {
    let (_, target, _) = parse_request_line("GET /search.html?q=rust&x=1 HTTP/1.1").unwrap();
    assert_eq!(target, "/search.html");
}

#[test]
fn test_invalid_utf8_is_replaced() {
    assert_eq!(decode_target("/caf%FF.txt"), "/caf\u{FFFD}.txt");
}

#[test]
fn test_unknown_method_is_kept() {
    let (method, _, _) = parse_request_line("BREW /pot HTTP/1.1").unwrap();
    assert_eq!(method, Method::Extension("BREW".to_string()));
}

#[test]
fn test_version_token_is_verbatim() {
    let (_, _, version) = parse_request_line("GET / HTTP/1.0").unwrap();
    assert_eq!(version, "HTTP/1.0");
}

#[test]
fn test_empty_request_line() {
    assert!(matches!(parse_request_line(""), Err(ParseError::EmptyRequest)));
}

#[test]
fn test_request_line_wrong_token_count() {
    for line in ["GET /", "GET / HTTP/1.1 extra", "GET"] {
        assert!(
            matches!(parse_request_line(line), Err(ParseError::InvalidRequestLine(_))),
            "accepted {line:?}"
        );
    }
}

#[test]
fn test_request_line_double_space_rejected() {
    assert!(matches!(
        parse_request_line("GET  / HTTP/1.1"),
        Err(ParseError::InvalidRequestLine(_))
    ));
}

#[test]
fn test_header_split_on_first_colon() {
    let (key, value) = parse_header_line("Host: example.com:8080").unwrap();
    assert_eq!(key, "Host");
    assert_eq!(value, "example.com:8080");
}

#[test]
fn test_header_without_colon() {
    assert!(matches!(
        parse_header_line("BrokenHeader"),
        Err(ParseError::InvalidHeader(_))
    ));
}

#[tokio::test]
async fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let parsed = parse(req).await.unwrap().unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(parsed.header("User-Agent"), Some("test-client"));
    assert_eq!(parsed.header("Accept"), Some("*/*"));
}

#[tokio::test]
async fn test_parse_header_case_preservation() {
    let req = b"GET / HTTP/1.1\r\nX-Custom-Thing: 1\r\n\r\n";
    let parsed = parse(req).await.unwrap().unwrap();

    assert!(parsed.headers.contains_key("X-Custom-Thing"));
    assert!(!parsed.headers.contains_key("x-custom-thing"));
}

#[tokio::test]
async fn test_parse_duplicate_header_last_wins() {
    let req = b"GET / HTTP/1.1\r\nAccept: text/plain\r\nAccept: text/html\r\n\r\n";
    let parsed = parse(req).await.unwrap().unwrap();

    assert_eq!(parsed.header("Accept"), Some("text/html"));
    assert_eq!(parsed.headers.len(), 1);
}

#[tokio::test]
async fn test_parse_lf_only_terminators() {
    let req = b"HEAD /a.txt HTTP/1.1\nHost: x\n\n";
    let parsed = parse(req).await.unwrap().unwrap();

    assert_eq!(parsed.method, Method::HEAD);
    assert_eq!(parsed.header("Host"), Some("x"));
}

#[tokio::test]
async fn test_parse_headers_end_at_eof() {
    let req = b"GET / HTTP/1.1\r\nHost: x\r\n";
    let parsed = parse(req).await.unwrap().unwrap();

    assert_eq!(parsed.header("Host"), Some("x"));
}

#[tokio::test]
async fn test_parse_no_bytes_is_no_request() {
    assert!(parse(b"").await.unwrap().is_none());
}

#[tokio::test]
async fn test_parse_blank_first_line() {
    let result = parse(b"\r\n").await;
    assert!(matches!(result, Err(ParseError::EmptyRequest)));
}

#[tokio::test]
async fn test_parse_malformed_header() {
    let result = parse(b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n").await;
    assert!(matches!(result, Err(ParseError::InvalidHeader(_))));
}

#[tokio::test]
async fn test_parse_ten_headers_accepted() {
    let mut req = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..10 {
        req.extend_from_slice(format!("H{i}: v\r\n").as_bytes());
    }
    req.extend_from_slice(b"\r\n");

    let parsed = parse(&req).await.unwrap().unwrap();
    assert_eq!(parsed.headers.len(), 10);
}

#[tokio::test]
async fn test_parse_eleven_headers_rejected() {
    let mut req = b"GET / HTTP/1.1\r\n".to_vec();
    for i in 0..11 {
        req.extend_from_slice(format!("H{i}: v\r\n").as_bytes());
    }
    req.extend_from_slice(b"\r\n");

    let result = parse(&req).await;
    assert!(matches!(result, Err(ParseError::TooManyHeaders { limit: 10 })));
}

#[tokio::test]
async fn test_parse_request_line_too_long() {
    let req = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(120));
    let result = parse(req.as_bytes()).await;

    assert!(matches!(result, Err(ParseError::LineTooLong { limit: 100 })));
}
