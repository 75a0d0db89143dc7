//! Bundling
//!
//! The optional bundle mode hands the generated file set to an external
//! compile-and-link capability as a virtual in-memory module graph: an
//! entry module that re-exports the public modules, plus one named module
//! per generated file. Module names are the generated paths with the
//! source extension rewritten to `.js`; contents are passed through as
//! generated, so any per-module compilation is the linker's concern.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::LinkError;
use crate::generators::File;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualModuleGraph {
    /// Name the linker resolves first (`entry`).
    pub entry_name: String,
    /// Synthesized entry source: one re-export line per public module.
    pub entry_source: String,
    /// Module name (`./Foo_template.js`) → module source.
    pub modules: IndexMap<String, String>,
}

impl VirtualModuleGraph {
    /// Build a graph from a generator's file set. Every file becomes a
    /// named module; files selected by `is_entry_export` are additionally
    /// re-exported from the entry, which makes their exports addressable
    /// through the bundle. The template and the event handlers both have
    /// to be selected or their locators would dangle.
    pub fn from_files<F>(files: &[File], is_entry_export: F) -> Self
    where
        F: Fn(&File) -> bool,
    {
        let entry_source = files
            .iter()
            .filter(|file| is_entry_export(file))
            .map(|file| format!("export * from './{}';", module_path(&file.path)))
            .collect::<Vec<_>>()
            .join("\n");
        let modules = files
            .iter()
            .map(|file| (format!("./{}", module_path(&file.path)), file.contents.clone()))
            .collect();
        VirtualModuleGraph {
            entry_name: "entry".to_string(),
            entry_source,
            modules,
        }
    }
}

/// `Foo_template.tsx` → `Foo_template.js`; unknown extensions pass through
/// with `.js` appended.
fn module_path(path: &str) -> String {
    let stem = path
        .strip_suffix(".tsx")
        .or_else(|| path.strip_suffix(".ts"))
        .unwrap_or(path);
    format!("{}.js", stem)
}

/// External compile-and-link capability: resolve the graph from its entry
/// and produce single-file module text. `externals` are import paths left
/// unresolved (the runtime library).
#[async_trait]
pub trait ModuleLinker: Send + Sync {
    async fn link(
        &self,
        graph: &VirtualModuleGraph,
        externals: &[String],
    ) -> Result<String, LinkError>;
}
