use serde::{Deserialize, Serialize};
use std::fmt;

/// One container image embedded in (build) or loaded from (install) a package.
///
/// `path` is always relative to the owning package's working directory;
/// absolute resolution happens by joining with that directory.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ImageRef {
    pub repo: String,
    pub tag: String,
    pub path: String,
}

impl ImageRef {
    /// The runtime-facing image name, `repo:tag`.
    pub fn full_name(&self) -> String {
        format!("{}:{}", self.repo, self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_repo_and_tag() {
        let img = ImageRef {
            repo: "demo".to_owned(),
            tag: "v1".to_owned(),
            path: "images/demo.tar".to_owned(),
        };
        assert_eq!(img.full_name(), "demo:v1");
        assert_eq!(img.to_string(), "demo:v1");
    }
}
