/// Turns a web address into a reverse-DNS identifier.
///
/// The scheme, a leading `www.` and everything after the host are dropped
/// before the host labels are reversed. Empty labels are kept, so a
/// malformed host stays visibly malformed. When `suffix` is given it is
/// appended as a final label.
///
/// Returns `None` when no host remains.
pub fn dns_to_rdns(url: &str, suffix: Option<&str>) -> Option<String> {
    let host = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return None;
    }

    let mut rdns = host.rsplit('.').collect::<Vec<_>>().join(".");
    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        rdns.push('.');
        rdns.push_str(suffix);
    }
    Some(rdns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_to_rdns() {
        assert_eq!(
            dns_to_rdns("https://example.com", None).as_deref(),
            Some("com.example")
        );
        assert_eq!(
            dns_to_rdns("http://www.example.org/", None).as_deref(),
            Some("org.example")
        );
        assert_eq!(
            dns_to_rdns("example.org/blah/blub", None).as_deref(),
            Some("org.example")
        );
        assert_eq!(
            dns_to_rdns("www.example..org/u//n", None).as_deref(),
            Some("org..example")
        );
    }

    #[test]
    fn test_dns_to_rdns_with_suffix() {
        assert_eq!(
            dns_to_rdns("https://example.com", Some("MyApp")).as_deref(),
            Some("com.example.MyApp")
        );
        assert_eq!(
            dns_to_rdns("https://www.debian.org/", Some("debian")).as_deref(),
            Some("org.debian.debian")
        );
    }

    #[test]
    fn test_dns_to_rdns_empty_host() {
        assert_eq!(dns_to_rdns("", None), None);
        assert_eq!(dns_to_rdns("https:///path", Some("x")), None);
    }
}
