//! Selection of the dependency archives that belong in the BAR build workspace.

use std::collections::BTreeSet;

use tracing::debug;

use crate::contract::{DependencyArchive, Scope};

/// Archive types unpacked into the workspace when nothing else is configured.
pub const DEFAULT_ARCHIVE_TYPES: &str = "zip";

/// Which declared dependencies get unpacked: by archive type and by scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyFilter {
    pub include_types: BTreeSet<String>,
    pub include_scope: Scope,
}

impl Default for DependencyFilter {
    fn default() -> Self {
        Self::from_type_list(DEFAULT_ARCHIVE_TYPES, Scope::Compile)
    }
}

impl DependencyFilter {
    pub fn new<I, S>(types: I, scope: Scope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include_types: types.into_iter().map(Into::into).collect(),
            include_scope: scope,
        }
    }

    /// Builds a filter from a comma separated list such as `"zip, bar"`.
    /// Blank entries are dropped.
    pub fn from_type_list(types: &str, scope: Scope) -> Self {
        Self::new(tokenize(types), scope)
    }

    /// Like [`DependencyFilter::from_type_list`], for types already given as a
    /// list. Each entry is tokenized the same way.
    pub fn from_type_entries<I, S>(entries: I, scope: Scope) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(type_tokens(entries), scope)
    }

    /// Scope matching is exact, unlike Maven's scope hierarchy: a `compile`
    /// filter does not admit `provided` or `system` dependencies.
    pub fn matches(&self, dependency: &DependencyArchive) -> bool {
        self.include_types.contains(&dependency.archive_type)
            && dependency.scope == self.include_scope
    }

    pub fn select(&self, dependencies: &[DependencyArchive]) -> Vec<DependencyArchive> {
        dependencies
            .iter()
            .filter(|dep| {
                let keep = self.matches(dep);
                if !keep {
                    debug!(
                        coordinate = %dep.coordinate(),
                        scope = %dep.scope,
                        "Dependency excluded by type/scope filter"
                    );
                }
                keep
            })
            .cloned()
            .collect()
    }
}

/// The archive types the preparer unpacks by default.
pub fn unpack_dependency_types() -> BTreeSet<String> {
    DependencyFilter::default().include_types
}

/// Trimmed, non-blank archive types from a list of entries, in order.
/// An entry may itself be a comma separated list.
pub fn type_tokens<I, S>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .flat_map(|entry| tokenize(entry.as_ref()).collect::<Vec<_>>())
        .collect()
}

fn tokenize(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
