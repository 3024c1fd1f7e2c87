//! Artifact pattern registry: exact basename → description table with category grouping.

#![allow(missing_docs)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Version-control metadata directories. Never matched, never descended.
pub const ALWAYS_SKIP: &[&str] = &[".git", ".hg", ".svn", ".bzr", ".jj"];

/// Whether a directory basename belongs to the always-skip set.
#[must_use]
pub fn is_always_skipped(name: &str) -> bool {
    ALWAYS_SKIP.contains(&name)
}

#[derive(Debug, Clone, Copy)]
struct BuiltinPattern {
    basename: &'static str,
    description: &'static str,
    categories: &'static [&'static str],
}

/// User-provided pattern extension, loaded from `[[patterns]]` in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub basename: String,
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PatternEntry {
    basename: String,
    description: String,
}

/// Registry of built-in and custom artifact patterns.
///
/// Built once before a scan and treated as immutable afterwards.
#[derive(Debug, Clone)]
pub struct ArtifactPatternRegistry {
    entries: Vec<PatternEntry>,
    by_basename: HashMap<String, usize>,
    categories: BTreeMap<String, BTreeSet<String>>,
}

impl Default for ArtifactPatternRegistry {
    fn default() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(BUILTIN_PATTERNS.len()),
            by_basename: HashMap::with_capacity(BUILTIN_PATTERNS.len()),
            categories: BTreeMap::new(),
        };
        for pattern in BUILTIN_PATTERNS {
            registry.insert(
                pattern.basename,
                pattern.description,
                pattern.categories.iter().copied(),
            );
        }
        registry
    }
}

impl ArtifactPatternRegistry {
    /// Append custom patterns. A custom entry reusing a built-in basename
    /// replaces its description and joins the listed categories.
    #[must_use]
    pub fn with_custom(mut self, custom: Vec<CustomPattern>) -> Self {
        for pattern in custom {
            if pattern.basename.is_empty() || is_always_skipped(&pattern.basename) {
                continue;
            }
            self.insert(
                &pattern.basename,
                &pattern.description,
                pattern.categories.iter().map(String::as_str),
            );
        }
        self
    }

    fn insert<'a>(
        &mut self,
        basename: &str,
        description: &str,
        categories: impl Iterator<Item = &'a str>,
    ) {
        if let Some(&idx) = self.by_basename.get(basename) {
            description.clone_into(&mut self.entries[idx].description);
        } else {
            self.by_basename
                .insert(basename.to_string(), self.entries.len());
            self.entries.push(PatternEntry {
                basename: basename.to_string(),
                description: description.to_string(),
            });
        }
        for category in categories {
            self.categories
                .entry(category.to_string())
                .or_default()
                .insert(basename.to_string());
        }
    }

    /// Description for an exact directory basename, if it is a known artifact.
    #[must_use]
    pub fn lookup(&self, basename: &str) -> Option<&str> {
        self.by_basename
            .get(basename)
            .map(|&idx| self.entries[idx].description.as_str())
    }

    /// Whether the basename is a registry key.
    #[must_use]
    pub fn contains(&self, basename: &str) -> bool {
        self.by_basename.contains_key(basename)
    }

    /// Category name → basenames grouped under it.
    #[must_use]
    pub fn categories(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.categories
    }

    /// Basenames of one category.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(name)
    }

    /// Category names in sorted order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Every registered basename, in registration order.
    pub fn basenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.basename.as_str())
    }

    /// Categories a basename is attached to.
    #[must_use]
    pub fn categories_of(&self, basename: &str) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, members)| members.contains(basename))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const BUILTIN_PATTERNS: &[BuiltinPattern] = &[
    BuiltinPattern {
        basename: "node_modules",
        description: "Node.js dependencies",
        categories: &["node"],
    },
    BuiltinPattern {
        basename: "bower_components",
        description: "Bower dependencies (legacy)",
        categories: &["node"],
    },
    BuiltinPattern {
        basename: ".next",
        description: "Next.js build output",
        categories: &["node", "build"],
    },
    BuiltinPattern {
        basename: ".nuxt",
        description: "Nuxt build output",
        categories: &["node", "build"],
    },
    BuiltinPattern {
        basename: ".svelte-kit",
        description: "SvelteKit build output",
        categories: &["node", "build"],
    },
    BuiltinPattern {
        basename: ".turbo",
        description: "Turborepo cache",
        categories: &["node", "build"],
    },
    BuiltinPattern {
        basename: ".parcel-cache",
        description: "Parcel bundler cache",
        categories: &["node", "build"],
    },
    BuiltinPattern {
        basename: "__pycache__",
        description: "Python bytecode cache",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".pytest_cache",
        description: "pytest cache",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".mypy_cache",
        description: "mypy type-check cache",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".ruff_cache",
        description: "Ruff linter cache",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".tox",
        description: "tox environments",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".venv",
        description: "Python virtual environment",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: "venv",
        description: "Python virtual environment",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: ".eggs",
        description: "Python eggs cache",
        categories: &["python"],
    },
    BuiltinPattern {
        basename: "target",
        description: "Rust/Maven build output",
        categories: &["rust", "java"],
    },
    BuiltinPattern {
        basename: ".gradle",
        description: "Gradle cache",
        categories: &["java"],
    },
    BuiltinPattern {
        basename: "dist",
        description: "Distribution build output",
        categories: &["build"],
    },
    BuiltinPattern {
        basename: "build",
        description: "Build output",
        categories: &["build"],
    },
    BuiltinPattern {
        basename: "out",
        description: "Build output",
        categories: &["build"],
    },
    BuiltinPattern {
        basename: ".cache",
        description: "Generic tool cache",
        categories: &["build"],
    },
    BuiltinPattern {
        basename: "_build",
        description: "Elixir/Mix build output",
        categories: &["elixir"],
    },
    BuiltinPattern {
        basename: "deps",
        description: "Elixir/Mix dependencies",
        categories: &["elixir"],
    },
    BuiltinPattern {
        basename: ".dart_tool",
        description: "Dart tool cache",
        categories: &["dart"],
    },
    BuiltinPattern {
        basename: "Pods",
        description: "CocoaPods dependencies",
        categories: &["ios"],
    },
    BuiltinPattern {
        basename: "DerivedData",
        description: "Xcode derived data",
        categories: &["ios"],
    },
    BuiltinPattern {
        basename: ".stack-work",
        description: "Haskell Stack build output",
        categories: &["haskell"],
    },
    BuiltinPattern {
        basename: ".terraform",
        description: "Terraform providers and modules",
        categories: &["terraform"],
    },
    BuiltinPattern {
        basename: "obj",
        description: ".NET intermediate build output",
        categories: &["dotnet"],
    },
];
