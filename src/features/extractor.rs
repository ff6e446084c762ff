//! URL → FeatureBag. Pure: no network, clock, or shared mutable state.

use super::lexicon::{CompiledLexicon, Lexicon};
use super::suffix::SuffixList;
use super::urlparse::{parse_query, split_url};
use super::FeatureBag;
use crate::config::DetectorConfig;
use crate::error::{DetectorError, Result};
use std::net::IpAddr;

fn flag(b: bool) -> u8 {
    b as u8
}

/// Numeric characters that are not digits: letter numbers (Roman numerals,
/// counting rods) and number forms with no single-digit value (fractions,
/// circled/parenthesised 10 and above, CJK numbers).
const NON_DIGIT_NUMERICS: &[(char, char)] = &[
    ('\u{00BC}', '\u{00BE}'),
    ('\u{09F4}', '\u{09F9}'),
    ('\u{0B72}', '\u{0B77}'),
    ('\u{0BF0}', '\u{0BF2}'),
    ('\u{0C78}', '\u{0C7E}'),
    ('\u{0D58}', '\u{0D5E}'),
    ('\u{0D70}', '\u{0D78}'),
    ('\u{0F2A}', '\u{0F33}'),
    ('\u{1372}', '\u{137C}'),
    ('\u{16EE}', '\u{16F0}'),
    ('\u{17F0}', '\u{17F9}'),
    ('\u{2150}', '\u{2182}'),
    ('\u{2185}', '\u{2189}'),
    ('\u{2469}', '\u{2473}'),
    ('\u{247D}', '\u{2487}'),
    ('\u{2491}', '\u{249B}'),
    ('\u{24EB}', '\u{24F4}'),
    ('\u{24FE}', '\u{24FE}'),
    ('\u{277F}', '\u{277F}'),
    ('\u{2789}', '\u{2789}'),
    ('\u{2793}', '\u{2793}'),
    ('\u{2CFD}', '\u{2CFD}'),
    ('\u{3007}', '\u{3007}'),
    ('\u{3021}', '\u{3029}'),
    ('\u{3038}', '\u{303A}'),
    ('\u{3192}', '\u{3195}'),
    ('\u{3220}', '\u{3229}'),
    ('\u{3248}', '\u{324F}'),
    ('\u{3251}', '\u{325F}'),
    ('\u{3280}', '\u{3289}'),
    ('\u{32B1}', '\u{32BF}'),
    ('\u{A6E6}', '\u{A6EF}'),
    ('\u{A830}', '\u{A835}'),
    ('\u{10107}', '\u{10133}'),
    ('\u{10140}', '\u{10178}'),
    ('\u{1018A}', '\u{1018B}'),
    ('\u{102E1}', '\u{102FB}'),
    ('\u{10320}', '\u{10323}'),
    ('\u{10341}', '\u{10341}'),
    ('\u{1034A}', '\u{1034A}'),
    ('\u{103D1}', '\u{103D5}'),
    ('\u{12400}', '\u{1246E}'),
    ('\u{1D360}', '\u{1D378}'),
];

/// Decimal digits in any script plus digit-valued forms (superscripts,
/// circled 1 to 9); the same set `str.isdigit` accepts in training data.
fn is_digit(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    c.is_numeric() && !NON_DIGIT_NUMERICS.iter().any(|(lo, hi)| (*lo..=*hi).contains(&c))
}

pub struct UrlFeatureExtractor {
    lexicon: CompiledLexicon,
    suffixes: SuffixList,
}

impl UrlFeatureExtractor {
    pub fn new(lexicon: &Lexicon, suffixes: SuffixList) -> Result<Self> {
        Ok(Self {
            lexicon: lexicon.compile()?,
            suffixes,
        })
    }

    /// Default lexicon and the embedded suffix list.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&Lexicon::default(), SuffixList::embedded()?)
    }

    pub fn from_config(config: &DetectorConfig) -> Result<Self> {
        let suffixes = match &config.suffix_list_path {
            Some(path) => SuffixList::from_file(path)?,
            None => SuffixList::embedded()?,
        };
        match &config.lexicon_path {
            Some(path) => Self::new(&Lexicon::from_file(path)?, suffixes),
            None => Self::new(&config.lexicon, suffixes),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.lexicon.source()
    }

    pub fn extract_features(&self, url: &str) -> Result<FeatureBag> {
        let lowered = url.to_lowercase();
        let parts = split_url(&lowered).map_err(|reason| DetectorError::extraction(url, reason))?;
        // Shortener matching looks at the host exactly as written.
        let raw_netloc = split_url(url)
            .map_err(|reason| DetectorError::extraction(url, reason))?
            .netloc;

        let netloc = parts.netloc.as_str();
        let path_length = parts.path.chars().count();
        let dots = netloc.matches('.').count();
        let query = parse_query(&parts.query);
        let undotted: String = netloc.chars().filter(|c| *c != '.').collect();
        let host = netloc.split(':').next().unwrap_or("");
        let domain = self.suffixes.split(url);

        Ok(FeatureBag {
            url_length: url.chars().count(),
            domain_length: netloc.chars().count(),
            path_length,
            fragment_length: parts.fragment.chars().count(),

            is_https: flag(parts.scheme == "https"),
            is_ip_address: flag(host.parse::<IpAddr>().is_ok()),
            has_suspicious_tld: flag(self.lexicon.has_suspicious_tld(netloc)),
            has_subdomain: flag(dots > 1),
            domain_has_numbers: flag(netloc.chars().any(is_digit)),
            uses_ip_in_url: flag(!undotted.is_empty() && undotted.chars().all(is_digit)),
            long_path: flag(self.lexicon.is_long_path(path_length)),
            has_hyphens_in_domain: flag(netloc.contains('-')),
            has_at_symbol: flag(url.contains('@')),
            has_misspelled_domain: flag(self.lexicon.is_misspelled(netloc)),
            is_shortened_url: flag(self.lexicon.is_shortener(&raw_netloc)),

            special_char_count: self.lexicon.count_special_chars(url),
            suspicious_keyword_count: self.lexicon.count_keywords(url),
            directory_depth: parts.path.matches('/').count(),
            query_param_count: query.len(),
            // Number of non-blank values, summed over keys.
            query_param_length: query.values().map(Vec::len).sum(),
            subdomain_count: dots as i64 - 1,

            domain_name: domain.domain,
            tld: domain.suffix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(url: &str) -> FeatureBag {
        UrlFeatureExtractor::with_defaults().unwrap().extract_features(url).unwrap()
    }

    #[test]
    fn structural_lengths() {
        let f = extract("https://www.example.com/a/b/c.html?q=abc&r=1#top");
        assert_eq!(f.url_length, 48);
        assert_eq!(f.domain_length, 15);
        assert_eq!(f.path_length, 11);
        assert_eq!(f.fragment_length, 3);
        assert_eq!(f.directory_depth, 3);
        assert_eq!(f.query_param_count, 2);
        assert_eq!(f.query_param_length, 2);
        assert_eq!(f.has_subdomain, 1);
        assert_eq!(f.subdomain_count, 1);
    }

    #[test]
    fn repeated_query_keys() {
        let f = extract("http://example.com/?id=12&id=345&empty=&flag");
        assert_eq!(f.query_param_count, 1);
        assert_eq!(f.query_param_length, 2);
    }

    #[test]
    fn query_param_length_counts_values_not_characters() {
        let f = extract("http://example.com/?id=12&id=345&q=abcdef");
        assert_eq!(f.query_param_count, 2);
        assert_eq!(f.query_param_length, 3);
    }

    #[test]
    fn keywords_and_specials_use_original_case() {
        let f = extract("http://example.com/LOGIN?verify=1");
        assert_eq!(f.suspicious_keyword_count, 1);
        assert_eq!(f.special_char_count, 4);
    }

    #[test]
    fn shortener_requires_exact_host_case() {
        assert_eq!(extract("http://bit.ly/x").is_shortened_url, 1);
        assert_eq!(extract("http://BIT.LY/x").is_shortened_url, 0);
        assert_eq!(extract("http://bit.ly:80/x").is_shortened_url, 0);
    }

    #[test]
    fn ip_heuristics_differ() {
        let f = extract("http://192.168.0.1:8080/");
        assert_eq!(f.is_ip_address, 1);
        assert_eq!(f.uses_ip_in_url, 0);
        let f = extract("http://1234/");
        assert_eq!(f.is_ip_address, 0);
        assert_eq!(f.uses_ip_in_url, 1);
        assert_eq!(f.domain_has_numbers, 1);
    }

    #[test]
    fn digit_class_excludes_fractions_and_numerals() {
        for c in ['7', '\u{0663}', '\u{00B2}', '\u{2460}', '\u{FF15}'] {
            assert!(is_digit(c), "{c:?}");
        }
        for c in ['\u{00BD}', '\u{216B}', '\u{2469}', '\u{3007}', 'a', '.'] {
            assert!(!is_digit(c), "{c:?}");
        }
        assert_eq!(extract("http://half\u{00BD}.com/").domain_has_numbers, 0);
        assert_eq!(extract("http://\u{216B}/").uses_ip_in_url, 0);
        assert_eq!(extract("http://\u{0661}\u{0662}.\u{0663}/").uses_ip_in_url, 1);
    }

    #[test]
    fn bracketed_ipv6_is_not_an_ip_literal() {
        let f = extract("http://[::1]:80/");
        assert_eq!(f.is_ip_address, 0);
    }

    #[test]
    fn long_path_threshold() {
        let path = "a".repeat(50);
        assert_eq!(extract(&format!("http://h.com/{path}")).long_path, 1);
        assert_eq!(extract(&format!("http://h.com/{}", &path[..49])).long_path, 0);
    }

    #[test]
    fn params_excluded_from_path() {
        let f = extract("http://example.com/a/b;jsessionid=XYZ");
        assert_eq!(f.path_length, 4);
    }

    #[test]
    fn unbalanced_bracket_is_extraction_error() {
        let ex = UrlFeatureExtractor::with_defaults().unwrap();
        let err = ex.extract_features("http://[fe80::1/login").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Extraction);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let f = extract("");
        assert_eq!(f.url_length, 0);
        assert_eq!(f.domain_length, 0);
        assert_eq!(f.subdomain_count, -1);
        assert_eq!(f.domain_name, "");
        assert_eq!(f.tld, "");
    }
}
