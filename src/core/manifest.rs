// IconForge - core/manifest.rs
//
// Ordered tree of everything a generation run wrote, mirroring the output
// directory. Insertion order is preserved at every level so the rendering is
// stable across runs.

use crate::core::model::GeneratedAsset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// One node of the manifest tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ManifestNode {
    Directory {
        name: String,
        children: Vec<ManifestNode>,
    },
    File {
        name: String,
        asset: GeneratedAsset,
    },
}

impl ManifestNode {
    pub fn name(&self) -> &str {
        match self {
            ManifestNode::Directory { name, .. } | ManifestNode::File { name, .. } => name,
        }
    }
}

/// Manifest for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Output root every asset path is relative to.
    pub root: PathBuf,

    pub generated_at: DateTime<Utc>,

    /// Top-level entries (the platform directories).
    pub entries: Vec<ManifestNode>,
}

impl Manifest {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            generated_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Insert an asset at its relative path, creating directory nodes as
    /// needed. Re-inserting the same path replaces the previous leaf in place.
    pub fn insert(&mut self, asset: GeneratedAsset) {
        let parts: Vec<String> = asset
            .path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            tracing::warn!(path = %asset.path.display(), "Ignoring manifest entry with empty path");
            return;
        };

        let mut level = &mut self.entries;
        for dir in dirs {
            let pos = match level
                .iter()
                .position(|n| matches!(n, ManifestNode::Directory { name, .. } if name == dir))
            {
                Some(pos) => pos,
                None => {
                    level.push(ManifestNode::Directory {
                        name: dir.clone(),
                        children: Vec::new(),
                    });
                    level.len() - 1
                }
            };
            level = match &mut level[pos] {
                ManifestNode::Directory { children, .. } => children,
                ManifestNode::File { .. } => unreachable!("position matched a directory"),
            };
        }

        let leaf = ManifestNode::File {
            name: file_name.clone(),
            asset,
        };
        match level
            .iter()
            .position(|n| matches!(n, ManifestNode::File { name, .. } if name == file_name))
        {
            Some(pos) => level[pos] = leaf,
            None => level.push(leaf),
        }
    }

    /// Every asset, depth-first in insertion order.
    pub fn files(&self) -> Vec<&GeneratedAsset> {
        fn walk<'a>(nodes: &'a [ManifestNode], out: &mut Vec<&'a GeneratedAsset>) {
            for node in nodes {
                match node {
                    ManifestNode::Directory { children, .. } => walk(children, out),
                    ManifestNode::File { asset, .. } => out.push(asset),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.entries, &mut out);
        out
    }

    pub fn file_count(&self) -> usize {
        self.files().len()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files().iter().map(|a| a.bytes).sum()
    }

    /// The asset recorded at `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&GeneratedAsset> {
        self.files().into_iter().find(|a| a.path == path)
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Text tree in the style of `tree(1)`.
    pub fn render_tree(&self) -> String {
        let mut out = format!("{}\n", self.root.display());
        render_level(&self.entries, "", &mut out);
        out
    }
}

fn render_level(nodes: &[ManifestNode], prefix: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        match node {
            ManifestNode::Directory { name, children } => {
                out.push_str(&format!("{prefix}{branch}{name}/\n"));
                render_level(children, &format!("{prefix}{indent}"), out);
            }
            ManifestNode::File { name, asset } => {
                let size = if asset.width > 0 && asset.height > 0 {
                    format!("{}x{}, ", asset.width, asset.height)
                } else {
                    String::new()
                };
                out.push_str(&format!(
                    "{prefix}{branch}{name} ({size}{} bytes)\n",
                    asset.bytes
                ));
            }
        }
    }
}
