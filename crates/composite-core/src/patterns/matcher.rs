//! Glob matching of declared check paths against changed files

use crate::error::{Error, Result};
use crate::types::{ChangedFile, Check};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Precompiled path globs of one check
///
/// `*` and `?` stop at `/`; `**` spans directories.
pub struct CheckMatcher {
    set: GlobSet,
}

impl CheckMatcher {
    /// Compile every pattern of `check`
    pub fn new(check: &Check) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &check.paths {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| Error::Pattern {
                    job: check.job.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|source| Error::Pattern {
            job: check.job.clone(),
            pattern: check.paths.join(", "),
            source,
        })?;

        Ok(Self { set })
    }

    /// Match a single path - zero allocation
    #[inline]
    pub fn matches_path(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// True on the first changed file with a matching current or previous path
    pub fn matches(&self, files: &[ChangedFile]) -> bool {
        files
            .iter()
            .any(|file| file.paths().any(|path| self.matches_path(path)))
    }
}
