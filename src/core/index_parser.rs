//! Parsing of numbered selections typed at a prompt.
//!
//! Used by the multi-select prompt of `remove`: the user sees a numbered
//! list and answers with something like `1 3-5,8`.
//!
//! # Supported Formats
//! - **Single indices**: `1`, `3`, `5`
//! - **Space or comma separated**: `1 3 5`, `1,3,5`
//! - **Ranges**: `3-6` (expands to 3,4,5,6)
//! - **Mixed combinations**: `1 3-5,8`
//!
//! Input is 1-based; [`IndexParser::selection`] hands back 0-based
//! positions ready to index the listed items.

use crate::core::error::{GitLauncherError, Result};
use std::collections::BTreeSet;

pub struct IndexParser;

impl IndexParser {
    /// Parse into sorted, deduplicated 1-based indices. A range ending past
    /// `max_index` is rejected before it is expanded.
    pub fn parse(input: &str, max_index: usize) -> Result<Vec<usize>> {
        let mut indices = BTreeSet::new();

        for part in input.split([' ', ',']).map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    if end.contains('-') {
                        return Err(GitLauncherError::invalid_range_format(part));
                    }
                    let (start, end) = (Self::range_bound(start)?, Self::range_bound(end)?);
                    if start > end {
                        return Err(GitLauncherError::invalid_range_order(start, end));
                    }
                    if end > max_index {
                        return Err(GitLauncherError::index_out_of_range(end, max_index));
                    }
                    indices.extend(start..=end);
                }
                None => {
                    let index = part
                        .parse()
                        .map_err(|_| GitLauncherError::invalid_number(part))?;
                    indices.insert(index);
                }
            }
        }

        Ok(indices.into_iter().collect())
    }

    fn range_bound(text: &str) -> Result<usize> {
        text.parse()
            .map_err(|_| GitLauncherError::invalid_range_number(text))
    }

    pub fn validate(indices: &[usize], max_index: usize) -> Result<()> {
        for &index in indices {
            if index == 0 {
                return Err(GitLauncherError::ZeroIndex);
            }
            if index > max_index {
                return Err(GitLauncherError::index_out_of_range(index, max_index));
            }
        }
        Ok(())
    }

    /// Parse and validate against a list of `len` items, returning 0-based positions.
    pub fn selection(input: &str, len: usize) -> Result<Vec<usize>> {
        let indices = Self::parse(input, len)?;
        Self::validate(&indices, len)?;
        Ok(indices.into_iter().map(|i| i - 1).collect())
    }
}
