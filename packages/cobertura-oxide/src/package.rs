use indexmap::IndexMap;

use crate::CoverageRegistry;

/// Package a file belongs to: its path with the final segment removed.
/// Files without a directory separator belong to the root package `""`.
pub fn package_name(file_path: &str) -> &str {
    file_path
        .rsplit_once('/')
        .map_or("", |(directory, _)| directory)
}

/// Groups the registry's files by package, keeping the order in which
/// packages and files are first seen while iterating the registry.
pub fn group_by_package(registry: &CoverageRegistry) -> IndexMap<&str, Vec<&str>> {
    let mut packages: IndexMap<&str, Vec<&str>> = IndexMap::new();

    for (file_path, _) in registry.iter() {
        packages
            .entry(package_name(file_path))
            .or_default()
            .push(file_path.as_str());
    }

    packages
}
