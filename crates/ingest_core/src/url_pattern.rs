use url::Url;

/// Syntactic check for links from the supported video platforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    hosts: Vec<String>,
}

impl UrlPattern {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|host| host.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        Self { hosts }
    }

    /// True for an http(s) URL whose host is an allowed host or one of its subdomains.
    pub fn matches(&self, raw: &str) -> bool {
        let Ok(parsed) = Url::parse(raw.trim()) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.hosts.iter().any(|allowed| {
            host == *allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> UrlPattern {
        UrlPattern::new(["tiktok.com", "youtu.be"])
    }

    #[test]
    fn accepts_subdomains_and_surrounding_whitespace() {
        let pattern = pattern();
        assert!(pattern.matches("https://www.tiktok.com/@chef/video/123"));
        assert!(pattern.matches("  https://vm.TikTok.com/abc  "));
        assert!(pattern.matches("http://youtu.be/xyz"));
    }

    #[test]
    fn rejects_lookalike_hosts_and_other_schemes() {
        let pattern = pattern();
        assert!(!pattern.matches("https://nottiktok.com/video"));
        assert!(!pattern.matches("https://tiktok.com.evil.net/video"));
        assert!(!pattern.matches("ftp://tiktok.com/video"));
        assert!(!pattern.matches("tiktok.com/video"));
        assert!(!pattern.matches(""));
    }
}
