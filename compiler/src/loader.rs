use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use skiff_thrift_schema::Module;

use crate::error::ThriftError;
use crate::parser::Parser;
use crate::tokenizer::tokenize;

pub const FILE_SUFFIX: &str = ".thrift";
pub const MODULE_SUFFIX: &str = "_thrift";

/// Parse context: the include resolution base, a cache of completed modules
/// keyed by canonical path, and the set of files currently being parsed,
/// which is what turns a circular include chain into an error instead of
/// unbounded recursion. Loaders are independent values; nothing is shared
/// process-wide.
pub struct Loader {
    pub(crate) include_dir: PathBuf,
    cache: HashMap<PathBuf, Rc<Module>>,
    in_progress: HashSet<PathBuf>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// A loader resolving includes against the current directory.
    pub fn new() -> Self {
        Self::with_include_dir(".")
    }

    pub fn with_include_dir(dir: impl Into<PathBuf>) -> Self {
        Loader {
            include_dir: dir.into(),
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Parse `path` into a module named after its file stem. A file already
    /// loaded through this loader is returned from cache without reparsing.
    pub fn load(&mut self, path: &Path) -> Result<Rc<Module>, ThriftError> {
        self.load_named(path, None)
    }

    /// Parse `path` into a module with an explicit name, which must carry
    /// the `_thrift` suffix.
    pub fn load_named(
        &mut self,
        path: &Path,
        module_name: Option<&str>,
    ) -> Result<Rc<Module>, ThriftError> {
        let name = module_name_for(path, module_name)?;
        let canonical = path.canonicalize()?;
        if let Some(module) = self.cache.get(&canonical) {
            return Ok(Rc::clone(module));
        }
        if !self.in_progress.insert(canonical.clone()) {
            return Err(ThriftError::CircularInclude {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), module = %name, "parsing thrift file");
        let result = self.parse_path(path, name);
        self.in_progress.remove(&canonical);

        let module = Rc::new(result?);
        self.cache.insert(canonical, Rc::clone(&module));
        Ok(module)
    }

    /// Parse in-memory source as a module named `module_name`. Includes are
    /// resolved against this loader's include directory; no suffix rules
    /// apply to the name.
    pub fn load_source(&mut self, text: &str, module_name: &str) -> Result<Module, ThriftError> {
        let tokens = tokenize(text)?;
        Parser::new(&tokens, Module::new(module_name), self).parse_document()
    }

    fn parse_path(&mut self, path: &Path, name: String) -> Result<Module, ThriftError> {
        let text = fs::read_to_string(path)?;
        let tokens = tokenize(&text)?;
        Parser::new(&tokens, Module::new(name), self).parse_document()
    }
}

fn module_name_for(path: &Path, module_name: Option<&str>) -> Result<String, ThriftError> {
    let path_str = path.to_string_lossy();
    if !path_str.ends_with(FILE_SUFFIX) {
        return Err(ThriftError::ModulePath(format!(
            "path {:?} should end with {:?}",
            path_str, FILE_SUFFIX
        )));
    }
    match module_name {
        Some(name) if name.ends_with(MODULE_SUFFIX) => Ok(name.to_owned()),
        Some(name) => Err(ThriftError::ModulePath(format!(
            "module name {:?} should end with {:?}",
            name, MODULE_SUFFIX
        ))),
        None => {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .ok_or_else(|| {
                    ThriftError::ModulePath(format!("path {:?} has no usable file stem", path_str))
                })?;
            Ok(stem.to_owned())
        }
    }
}
