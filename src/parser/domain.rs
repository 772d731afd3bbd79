//! Domain allow-list for candidate video links.

use std::collections::BTreeSet;

use tracing::debug;
use url::Url;

use crate::download::ErrorKind;

/// Hosts accepted out of the box: bare and `www.` forms of the supported platforms.
pub const DEFAULT_ALLOWED_DOMAINS: [&str; 8] = [
    "www.instagram.com",
    "instagram.com",
    "x.com",
    "twitter.com",
    "www.tiktok.com",
    "tiktok.com",
    "www.youtube.com",
    "youtube.com",
];

/// Exact-match set of hosts the service is willing to fetch from.
///
/// Matching is plain string equality on the host as written in the link,
/// including any explicit port. There is no case folding, no `www.` stripping
/// and no subdomain matching: `m.youtube.com` and `YouTube.com` are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomains {
    hosts: BTreeSet<String>,
}

impl Default for AllowedDomains {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS)
    }
}

impl AllowedDomains {
    /// Builds an allow-list from explicit host strings.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of hosts in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns true when no host is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Checks a candidate URL against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidUrl`] when the candidate does not parse and
    /// [`ErrorKind::UnsupportedDomain`] when its host is not in the set.
    pub fn check(&self, candidate: &str) -> Result<(), ErrorKind> {
        if let Err(e) = Url::parse(candidate) {
            debug!(url = candidate, error = %e, "failed to parse URL");
            return Err(ErrorKind::InvalidUrl);
        }

        let host = raw_host(candidate);
        if self.hosts.contains(host) {
            Ok(())
        } else {
            debug!(url = candidate, host, "host not in allow-list");
            Err(ErrorKind::UnsupportedDomain)
        }
    }

    /// Boolean view of [`Self::check`].
    #[must_use]
    pub fn is_supported(&self, candidate: &str) -> bool {
        self.check(candidate).is_ok()
    }
}

/// Returns the authority host as written, without userinfo but with any port.
///
/// The `url` crate lowercases hosts and drops default ports while parsing, so
/// the comparison runs on the original text instead.
fn raw_host(candidate: &str) -> &str {
    let after_scheme = candidate
        .split_once("://")
        .map_or(candidate, |(_, rest)| rest);
    let authority_end = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    let authority = &after_scheme[..authority_end];
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host)
}
