use super::*;

fn source(base: &str) -> HttpPostSource {
    HttpPostSource::new(base, 30, "postkiosk-test/0.1", 0, 1).unwrap()
}

#[test]
fn profile_endpoint_shape() {
    let s = source("https://facade.example.com");
    assert_eq!(
        s.profile_endpoint("BCCI"),
        "https://facade.example.com/users/BCCI"
    );
}

#[test]
fn base_url_trailing_slash_is_stripped() {
    let s = source("https://facade.example.com/");
    assert_eq!(
        s.profile_endpoint("BCCI"),
        "https://facade.example.com/users/BCCI"
    );
}

#[test]
fn posts_endpoint_without_cursor() {
    let s = source("https://facade.example.com");
    assert_eq!(
        s.posts_endpoint("ICC", 100, None),
        "https://facade.example.com/users/ICC/posts?limit=100"
    );
}

#[test]
fn posts_endpoint_with_cursor() {
    let s = source("https://facade.example.com");
    assert_eq!(
        s.posts_endpoint("ICC", 100, Some("abc123")),
        "https://facade.example.com/users/ICC/posts?limit=100&cursor=abc123"
    );
}
