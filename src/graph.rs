//! Loads modules and their dependencies into execution order.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::errors::{FormatError, Result};
use crate::module::ModuleRecord;
use crate::resolver::{is_relative, module_name_from_path, resolve_module_name, ModuleLookup};

/// Supplies module source text by path relative to the source root.
pub trait SourceProvider {
    /// `Ok(None)` when no module lives at `relative_path`.
    fn read(&self, relative_path: &str) -> io::Result<Option<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    sources: HashMap<String, String>,
}

impl MemorySources {
    pub fn new(sources: HashMap<String, String>) -> Self {
        Self { sources }
    }

    pub fn insert(&mut self, relative_path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(relative_path.into(), source.into());
    }

    /// Every path held, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.sources.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl SourceProvider for MemorySources {
    fn read(&self, relative_path: &str) -> io::Result<Option<String>> {
        Ok(self.sources.get(relative_path).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct FileSystemSources {
    root: PathBuf,
}

impl FileSystemSources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceProvider for FileSystemSources {
    fn read(&self, relative_path: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.root.join(relative_path)) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Every module reachable from the entries, dependencies first.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleRecord>,
    index: HashMap<String, usize>,
    /// Identifiers in use; distinct names may sanitize to the same one.
    ids: HashSet<String>,
}

impl ModuleGraph {
    /// Loads `entries` (relative paths, `.js` optional) depth-first.
    ///
    /// A module is listed after everything it imports or re-exports from. In a
    /// cycle, the module reached first is listed last.
    pub fn load(provider: &dyn SourceProvider, entries: &[String]) -> Result<Self> {
        let mut loader = Loader {
            provider,
            graph: ModuleGraph::default(),
            in_progress: HashSet::new(),
        };
        for entry in entries {
            let name = module_name_from_path(entry);
            loader.visit(&name, None, false)?;
        }
        Ok(loader.graph)
    }

    /// Adds a record built elsewhere. An existing record of the same name is replaced.
    ///
    /// A record whose identifier is already taken by another module gets a
    /// numbered one instead (`a$b$$` then `a$b$2$$`).
    pub fn insert(&mut self, mut record: ModuleRecord) {
        if let Some(&i) = self.index.get(&record.name) {
            self.ids.remove(&self.modules[i].id);
        }
        record.id = self.unique_id(&record.id);
        self.ids.insert(record.id.clone());

        match self.index.get(&record.name) {
            Some(&i) => self.modules[i] = record,
            None => {
                self.index.insert(record.name.clone(), self.modules.len());
                self.modules.push(record);
            }
        }
    }

    fn unique_id(&self, id: &str) -> String {
        if !self.ids.contains(id) {
            return id.to_string();
        }
        let stem = id.strip_suffix("$$").unwrap_or(id);
        let mut n = 2;
        loop {
            let candidate = format!("{stem}${n}$$");
            if !self.ids.contains(&candidate) {
                tracing::trace!(id, renamed = %candidate, "module identifier collision");
                return candidate;
            }
            n += 1;
        }
    }

    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    pub fn get(&self, name: &str) -> Option<&ModuleRecord> {
        self.index.get(name).map(|&i| &self.modules[i])
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLookup for ModuleGraph {
    fn lookup(&self, importer: &ModuleRecord, source_path: &str) -> Option<&ModuleRecord> {
        self.get(&resolve_module_name(&importer.name, source_path))
    }
}

struct Loader<'p> {
    provider: &'p dyn SourceProvider,
    graph: ModuleGraph,
    in_progress: HashSet<String>,
}

impl Loader<'_> {
    fn visit(&mut self, name: &str, importer: Option<&str>, bare: bool) -> Result<()> {
        if self.graph.index.contains_key(name) || self.in_progress.contains(name) {
            return Ok(());
        }

        let relative_path = format!("{name}.js");
        let Some(source) = self.provider.read(&relative_path)? else {
            if bare {
                tracing::trace!(module = name, "external module");
                self.graph.insert(ModuleRecord::external(name));
                return Ok(());
            }
            return Err(FormatError::ModuleNotFound {
                module: importer.unwrap_or(name).to_string(),
                name: name.to_string(),
            });
        };

        let record = parse_record(name, &relative_path, &source)?;

        self.in_progress.insert(name.to_string());
        let dependencies: Vec<(String, bool)> = record
            .imports
            .declarations
            .iter()
            .chain(record.exports.declarations.iter())
            .filter_map(|d| {
                let path = d.source_path.as_deref()?;
                Some((d.source.clone()?, !is_relative(path)))
            })
            .collect();
        for (dependency, bare) in dependencies {
            self.visit(&dependency, Some(name), bare)?;
        }
        self.in_progress.remove(name);

        self.graph.insert(record);
        Ok(())
    }
}

fn parse_record(name: &str, relative_path: &str, source: &str) -> Result<ModuleRecord> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(error) = ret.errors.first() {
        return Err(FormatError::Parse {
            module: name.to_string(),
            message: error.to_string(),
        });
    }
    ModuleRecord::from_program(name, relative_path, source, &ret.program, |path| {
        resolve_module_name(name, path)
    })
}
