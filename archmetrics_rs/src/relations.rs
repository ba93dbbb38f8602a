//! Class hierarchy across the workspace: which type extends or implements
//! which.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::declarations::{TypeDecl, type_declarations};
use crate::fs_utils::{gather_files, read_source};
use crate::lexical::strip_comments_and_strings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Extends,
    Implements,
}

impl RelationKind {
    fn arrow(&self) -> &'static str {
        match self {
            RelationKind::Extends => "->",
            RelationKind::Implements => "-|>",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
}

/// A declared type and the file it lives in.
#[derive(Clone, Debug, Serialize)]
pub struct DeclaredType {
    pub file: PathBuf,
    #[serde(flatten)]
    pub decl: TypeDecl,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Hierarchy {
    pub types: Vec<DeclaredType>,
    pub relations: Vec<Relation>,
}

impl Hierarchy {
    pub fn add_source(&mut self, file: &Path, source: &str) {
        for decl in type_declarations(&strip_comments_and_strings(source)) {
            for parent in &decl.extends {
                self.relations.push(Relation {
                    from: decl.name.clone(),
                    to: parent.clone(),
                    kind: RelationKind::Extends,
                });
            }
            for iface in &decl.implements {
                self.relations.push(Relation {
                    from: decl.name.clone(),
                    to: iface.clone(),
                    kind: RelationKind::Implements,
                });
            }
            self.types.push(DeclaredType {
                file: file.to_path_buf(),
                decl,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.relations.is_empty()
    }

    /// One line per type, one per relation, then a summary line.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "// No classes or relationships found.\n\
                    // Make sure there are valid Java files in the project.\n"
                .to_string();
        }
        let mut out = String::new();
        for ty in &self.types {
            let _ = writeln!(out, "{} {}", ty.decl.kind.as_str(), ty.decl.name);
        }
        for rel in &self.relations {
            let _ = writeln!(out, "{} {} {}", rel.from, rel.kind.arrow(), rel.to);
        }
        let _ = writeln!(
            out,
            "// {} types, {} relations",
            self.types.len(),
            self.relations.len()
        );
        out
    }
}

/// Walk `root` and collect every declaration. Unreadable files are skipped.
pub fn collect_hierarchy(root: &Path, extension: &str, excluded_dirs: &[String]) -> Hierarchy {
    let mut hierarchy = Hierarchy::default();
    for file in gather_files(root, extension, excluded_dirs) {
        match read_source(&file) {
            Ok(source) => {
                let shown = file.strip_prefix(root).unwrap_or(&file);
                hierarchy.add_source(shown, &source);
            }
            Err(e) => warn!("{e}"),
        }
    }
    hierarchy
}
