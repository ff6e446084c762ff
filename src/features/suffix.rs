//! Registrable-domain / public-suffix split backed by the Public Suffix List.
//!
//! Only the ICANN section is used: anything after the private-domains
//! marker is discarded before parsing, so `foo.blogspot.com` splits into
//! `blogspot` + `com`.

use crate::error::{DetectorError, Result};
use publicsuffix::{List, Psl};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;

const EMBEDDED_LIST: &str = include_str!("../../data/public_suffix_list.dat");
const PRIVATE_MARKER: &str = "===BEGIN PRIVATE DOMAINS===";

/// Dot variants folded to `.` before splitting labels.
const DOT_VARIANTS: [char; 3] = ['\u{3002}', '\u{ff0e}', '\u{ff61}'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

pub struct SuffixList {
    list: List,
}

impl SuffixList {
    /// ICANN section of the Public Suffix List snapshot bundled with the crate.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_LIST)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DetectorError::SuffixList(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let icann = match text.find(PRIVATE_MARKER) {
            Some(i) => &text[..i],
            None => text,
        };
        let list: List = icann
            .parse()
            .map_err(|e: publicsuffix::Error| DetectorError::SuffixList(e.to_string()))?;
        Ok(Self { list })
    }

    /// Number of trailing labels of `host` covered by a known public suffix.
    fn known_suffix_labels(&self, labels: &[&str]) -> usize {
        let lowered = labels.join(".").to_lowercase();
        match self.list.suffix(lowered.as_bytes()) {
            Some(suffix) if suffix.is_known() => suffix
                .as_bytes()
                .split(|b| *b == b'.')
                .count()
                .min(labels.len()),
            _ => 0,
        }
    }

    /// Split the host of `url` into subdomain, registrable label and public
    /// suffix. Works on anything: scheme-less input, bare words, IPs.
    pub fn split(&self, url: &str) -> DomainParts {
        let host = lenient_host(url);
        let host: String = host
            .chars()
            .map(|c| if DOT_VARIANTS.contains(&c) { '.' } else { c })
            .collect();

        if host.len() >= 4 && host.starts_with('[') && host.ends_with(']') {
            if host[1..host.len() - 1].parse::<Ipv6Addr>().is_ok() {
                return DomainParts {
                    domain: host,
                    ..Default::default()
                };
            }
        }

        let labels: Vec<&str> = host.split('.').collect();
        let suffix_labels = self.known_suffix_labels(&labels);

        if suffix_labels == 0 && labels.len() == 4 && looks_like_ipv4(&host) {
            return DomainParts {
                domain: host.clone(),
                ..Default::default()
            };
        }

        let suffix_index = labels.len() - suffix_labels;
        DomainParts {
            subdomain: if suffix_index >= 2 {
                labels[..suffix_index - 1].join(".")
            } else {
                String::new()
            },
            domain: if suffix_index >= 1 {
                labels[suffix_index - 1].to_string()
            } else {
                String::new()
            },
            suffix: labels[suffix_index..].join("."),
        }
    }
}

fn looks_like_ipv4(host: &str) -> bool {
    host.chars().next().map_or(false, |c| c.is_ascii_digit()) && host.parse::<Ipv4Addr>().is_ok()
}

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Drop a leading `scheme://` or `//`, only when what precedes `//` is a
/// plausible scheme followed by `:`.
fn schemeless(url: &str) -> &str {
    match url.find("//") {
        Some(0) => &url[2..],
        Some(i) if i >= 2 && url[..i].ends_with(':') && url[..i - 1].chars().all(is_scheme_char) => {
            &url[i + 2..]
        }
        _ => url,
    }
}

/// Host portion of a URL: before path/query/fragment, after userinfo,
/// without port or trailing root dots. Bracketed IPv6 hosts keep brackets.
fn lenient_host(url: &str) -> String {
    let rest = schemeless(url);
    let rest = rest.split(|c: char| matches!(c, '/' | '?' | '#')).next().unwrap_or("");
    let after_userinfo = rest.rsplit('@').next().unwrap_or("");

    if after_userinfo.starts_with('[') {
        if let Some(close) = after_userinfo.find(']') {
            return after_userinfo[..=close].to_string();
        }
    }

    let hostname = after_userinfo.split(':').next().unwrap_or("").trim();
    hostname
        .trim_end_matches(|c: char| c == '.' || DOT_VARIANTS.contains(&c))
        .to_string()
}
