use crate::error::{self, Result};
use regex::Regex;
use snafu::OptionExt;

const FROM_LINE_REGEX: &str = r"(?i)FROM\s+([^\s]+)(?:\s+as\s+\w+)?";

lazy_static::lazy_static! {
    static ref FROM_LINE: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(FROM_LINE_REGEX).unwrap()
    };
}

/// Returns the image named by the first `FROM` instruction of a Dockerfile, without any stage
/// alias.
pub fn extract_container_image(dockerfile: &str) -> Result<String> {
    FROM_LINE
        .captures(dockerfile)
        .and_then(|captures| captures.get(1))
        .map(|image| image.as_str().to_string())
        .context(error::NoBaseImageSnafu)
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stage_alias_is_dropped() {
        let dockerfile = "FROM golang:1.21 as builder\nRUN make\nFROM fedora:39\n";
        assert_eq!(extract_container_image(dockerfile).unwrap(), "golang:1.21");
    }

    #[test]
    fn keyword_case_is_ignored() {
        let dockerfile =
            "# syntax=docker/dockerfile:1\nfrom quay.io/centos/centos:stream9 AS base\n";
        assert_eq!(
            extract_container_image(dockerfile).unwrap(),
            "quay.io/centos/centos:stream9"
        );
    }

    #[test]
    fn no_from_line() {
        let error = extract_container_image("RUN echo hello\n").unwrap_err();
        assert!(matches!(error, crate::Error::NoBaseImage));
    }
}
