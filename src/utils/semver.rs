use lazy_static::lazy_static;
use regex::Regex;
use semver::Version;

lazy_static! {
    static ref TRIPLE_RE: Regex = Regex::new(r"(\d+\.\d+\.\d+)").unwrap();
}

pub struct SemverUtils {}

impl SemverUtils {
    pub fn is_valid_version(input: &str) -> bool {
        Version::parse(input.trim_start_matches('v')).is_ok()
    }

    /// Finds the first `X.Y.Z` in `name`, e.g. `.../tags/v1.0.0.tar.gz`.
    pub fn extract_version(name: &str) -> Option<Version> {
        let caps = TRIPLE_RE.captures(name)?;
        Version::parse(&caps[1]).ok()
    }
}
