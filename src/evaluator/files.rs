//! Loading and evaluating files: projects, includes, features, spec files
//! and command-line snippets

use super::{Evaluator, VisitReturn};
use crate::ast::ProFile;
use crate::cache::{FileInfo, FileInfoCacheKey, FixStringCacheKey};
use crate::config::LoadFlags;
use crate::diagnostics::DiagnosticCode;
use crate::error::EvalResult;
use crate::model::{ProKey, ProStringList};
use crate::parser::{parse_project, parse_statements, ParseError};
use crate::paths::{absolute_path, dir_part, fix_string, FixFlags};
use rustc_hash::FxHashSet;
use std::io::Read;
use std::sync::Arc;

/// File name reported for a project read from standard input
pub const STDIN_NAME: &str = "(stdin)";
/// Root-scope variable listing every file evaluated
pub const INCLUDED_FILES: &str = ".QMAKE_INTERNAL_INCLUDED_FILES";
/// Root-scope variable listing every feature file loaded
pub const INCLUDED_FEATURES: &str = ".QMAKE_INTERNAL_INCLUDED_FEATURES";

/// Why a file is being evaluated; decides how parse errors are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalFileType {
    /// The project passed to `read()`
    Project,
    /// `qmake.conf` and command-line assignments
    Prefile,
    /// `include()`
    Include,
    /// `load()` and CONFIG features
    Feature,
    /// `eval()`
    Eval,
}

impl EvalFileType {
    /// Result of a file of this type failing to parse
    fn parse_failure(self) -> VisitReturn {
        match self {
            EvalFileType::Project | EvalFileType::Prefile => VisitReturn::Error,
            EvalFileType::Include | EvalFileType::Feature | EvalFileType::Eval => VisitReturn::False,
        }
    }
}

enum LoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl Evaluator {
    /// Normalise a string through the fix-string cache
    pub(crate) fn fix_path(&self, path: &str, flags: FixFlags) -> String {
        let key = FixStringCacheKey::new(path, flags, self.current_dir());
        self.caches
            .lock()
            .fix_string_with(key, |k| fix_string(k.string(), k.flags()))
    }

    /// Query the file system through the file-info cache
    pub(crate) fn file_info(&self, path: &str) -> FileInfo {
        let key = FileInfoCacheKey::new(path, self.current_dir());
        self.caches.lock().file_info_with(key, |k| {
            FileInfo::probe(&absolute_path(k.file(), k.pwd()))
        })
    }

    /// Make `path` absolute against the current directory and clean it
    pub(crate) fn resolve_path(&self, path: &str) -> String {
        absolute_path(path, self.current_dir())
    }

    fn load_file(&mut self, path: &str) -> Result<Arc<ProFile>, LoadError> {
        if path == "-" {
            let source = match self.stdin_source.take() {
                Some(source) => source,
                None => {
                    let mut source = String::new();
                    std::io::stdin()
                        .read_to_string(&mut source)
                        .map_err(LoadError::Io)?;
                    source
                }
            };
            return parse_project(&source, STDIN_NAME).map(Arc::new).map_err(LoadError::Parse);
        }

        if let Some(cached) = self.caches.lock().parsed_file(path) {
            log::trace!("parsed-file cache hit for {path}");
            return Ok(cached);
        }
        let source = std::fs::read_to_string(path).map_err(LoadError::Io)?;
        let file = Arc::new(parse_project(&source, path).map_err(LoadError::Parse)?);
        self.caches.lock().insert_parsed_file(path, file.clone());
        Ok(file)
    }

    /// Parse and visit the file at the absolute `path` in the current scope
    pub(crate) fn evaluate_file(
        &mut self,
        path: &str,
        kind: EvalFileType,
        flags: LoadFlags,
    ) -> EvalResult<VisitReturn> {
        log::debug!("evaluating {kind:?} file {path}");
        let file = match self.load_file(path) {
            Ok(file) => file,
            Err(LoadError::Io(err)) => {
                if !flags.contains(LoadFlags::SILENT) {
                    self.report(DiagnosticCode::FileAccess, format!("Cannot read {path}: {err}"));
                }
                return Ok(VisitReturn::False);
            }
            Err(LoadError::Parse(err)) => {
                let result = kind.parse_failure();
                if result == VisitReturn::Error {
                    self.record_error(err.to_string(), err.to_diagnostic().location);
                }
                self.sink.report(err.to_diagnostic());
                return Ok(result);
            }
        };

        if !flags.contains(LoadFlags::HIDDEN) {
            self.record_root(INCLUDED_FILES, &*file.file);
        }
        let dir = if path == "-" { self.config.pwd.clone() } else { dir_part(path) };
        let saved = self.current.clone();
        self.push_file(file.file.clone(), dir);
        let result = self.visit_block(&file.statements);
        self.pop_file(saved);
        result
    }

    /// Parse `source` as statements at the current location and visit them
    /// in the current scope
    pub(crate) fn evaluate_snippet(&mut self, source: &str, kind: EvalFileType) -> EvalResult<VisitReturn> {
        let file: Arc<str> = Arc::from(self.current_file());
        let block = match parse_statements(source, file, self.current_line()) {
            Ok(block) => block,
            Err(err) => {
                let result = kind.parse_failure();
                if result == VisitReturn::Error {
                    self.record_error(err.to_string(), err.to_diagnostic().location);
                }
                self.sink.report(err.to_diagnostic());
                return Ok(result);
            }
        };
        self.visit_block(&block)
    }

    /// Evaluate command-line assignments such as `--set` and `--after`
    fn evaluate_command_line(&mut self, assignments: &[String]) -> EvalResult<VisitReturn> {
        if assignments.is_empty() {
            return Ok(VisitReturn::True);
        }
        let saved = self.current.clone();
        self.push_file(Arc::from("(command line)"), self.config.pwd.clone());
        let mut result = Ok(VisitReturn::True);
        for (i, assignment) in assignments.iter().enumerate() {
            self.set_line(i as u32 + 1);
            match self.evaluate_snippet(assignment, EvalFileType::Prefile) {
                Ok(VisitReturn::Error) => {
                    result = Ok(VisitReturn::Error);
                    break;
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
                Ok(_) => {}
            }
        }
        self.pop_file(saved);
        result
    }

    /// `include(file, into, silent)`
    pub(crate) fn include_file(&mut self, file: &str, into: &str, silent: bool) -> EvalResult<VisitReturn> {
        let path = self.resolve_path(file);
        if !self.file_info(&path).is_file {
            if !silent {
                self.report(DiagnosticCode::FileAccess, format!("Cannot find file: {file}."));
            }
            return Ok(VisitReturn::False);
        }

        let flags = if silent { LoadFlags::SILENT } else { LoadFlags::PRO_ONLY };
        if into.is_empty() {
            return self.evaluate_file(&path, EvalFileType::Include, flags);
        }

        // Evaluate into a scratch scope and copy the results under `into.`
        let saved = std::mem::take(&mut self.stack);
        let result = self.evaluate_file(&path, EvalFileType::Include, flags);
        let scratch = std::mem::replace(&mut self.stack, saved);
        for (key, values) in scratch.first() {
            if !key.is_internal() {
                self.stack.set(ProKey::from(format!("{into}.{key}")), values.clone());
            }
        }
        if let Some(included) = scratch.first().get(INCLUDED_FILES) {
            for path in included {
                self.record_root(INCLUDED_FILES, path.clone());
            }
        }
        result
    }

    /// Locate `<name>.prf` in the feature roots
    pub(crate) fn find_feature(&self, name: &str) -> Option<String> {
        let file_name = if name.ends_with(".prf") {
            name.to_string()
        } else {
            format!("{name}.prf")
        };
        self.config
            .feature_roots
            .iter()
            .map(|root| format!("{}/{file_name}", absolute_path(root, &self.config.pwd)))
            .find(|candidate| self.file_info(candidate).is_file)
    }

    /// `load(feature, ignore_errors)`; a feature is evaluated at most once
    pub(crate) fn load_feature(&mut self, name: &str, ignore_errors: bool) -> EvalResult<VisitReturn> {
        let Some(path) = self.find_feature(name) else {
            if !ignore_errors {
                self.report(DiagnosticCode::FileAccess, format!("Cannot find feature {name}"));
            }
            return Ok(VisitReturn::False);
        };
        if self
            .stack
            .first()
            .get(INCLUDED_FEATURES)
            .is_some_and(|loaded| loaded.contains_str(&path))
        {
            log::trace!("feature {name} already loaded");
            return Ok(VisitReturn::True);
        }
        self.record_root(INCLUDED_FEATURES, path.as_str());

        let flags = if ignore_errors { LoadFlags::SILENT } else { LoadFlags::PRO_ONLY };
        self.evaluate_file(&path, EvalFileType::Feature, flags)
    }

    /// Full read sequence for a project: pre-assignments, spec, project,
    /// post-assignments and CONFIG features
    pub fn evaluate_project(&mut self, path: &str, flags: LoadFlags) -> EvalResult<VisitReturn> {
        let (pro_file, pro_dir) = if path == "-" {
            (STDIN_NAME.to_string(), self.config.pwd.clone())
        } else {
            (path.to_string(), dir_part(path))
        };
        {
            let root = self.stack.first_mut();
            root.insert(ProKey::from("_PRO_FILE_"), ProStringList::single(pro_file));
            root.insert(ProKey::from("_PRO_FILE_PWD_"), ProStringList::single(pro_dir));
            root.insert(
                ProKey::from("OUT_PWD"),
                ProStringList::single(self.config.pwd.as_str()),
            );
        }
        let mut configs: Vec<String> = self.config.extra_configs.clone();
        if self.config.host_build {
            configs.push("host_build".to_string());
        }
        for value in configs {
            self.stack.values_mut(&ProKey::from("CONFIG")).push_unique(value.into());
        }

        let extra_vars = self.config.extra_vars.clone();
        if self.evaluate_command_line(&extra_vars)? == VisitReturn::Error {
            return Ok(VisitReturn::Error);
        }

        if flags.contains(LoadFlags::PRE_FILES) {
            if let Some(spec_dir) = self.config.spec_dir.clone() {
                let spec = absolute_path(&spec_dir, &self.config.pwd);
                self.stack
                    .first_mut()
                    .insert(ProKey::from("QMAKESPEC"), ProStringList::single(spec.as_str()));
                let conf = format!("{spec}/qmake.conf");
                if !self.file_info(&conf).is_file {
                    return Ok(self.fail(
                        DiagnosticCode::FileAccess,
                        format!("Could not find qmake spec configuration {conf}."),
                    ));
                }
                match self.evaluate_file(&conf, EvalFileType::Prefile, flags)? {
                    VisitReturn::True => {}
                    other => return Ok(other),
                }
            }
            if self.load_feature("default_pre", true)? == VisitReturn::Error {
                return Ok(VisitReturn::Error);
            }
        }

        if path != "-" && !self.file_info(path).is_file {
            if !flags.contains(LoadFlags::SILENT) {
                self.report(DiagnosticCode::FileAccess, format!("Cannot read {path}: no such file"));
            }
            return Ok(VisitReturn::False);
        }
        match self.evaluate_file(path, EvalFileType::Project, flags)? {
            VisitReturn::True => {}
            other => return Ok(other),
        }

        if flags.contains(LoadFlags::POST_FILES) {
            let post_vars = self.config.post_vars.clone();
            if self.evaluate_command_line(&post_vars)? == VisitReturn::Error {
                return Ok(VisitReturn::Error);
            }
            if self.load_feature("default_post", true)? == VisitReturn::Error {
                return Ok(VisitReturn::Error);
            }
            if self.load_config_features()? == VisitReturn::Error {
                return Ok(VisitReturn::Error);
            }
        }
        Ok(VisitReturn::True)
    }

    /// Load `<entry>.prf` for CONFIG entries, last entry first, until a pass
    /// over CONFIG finds nothing new
    fn load_config_features(&mut self) -> EvalResult<VisitReturn> {
        let mut attempted: FxHashSet<String> = FxHashSet::default();
        loop {
            let config = self.values("CONFIG");
            let next = config.iter().rev().find(|entry| {
                !attempted.contains(entry.as_str()) && self.find_feature(entry).is_some()
            });
            let Some(entry) = next.cloned() else {
                return Ok(VisitReturn::True);
            };
            attempted.insert(entry.to_string());
            if self.load_feature(&entry, false)? == VisitReturn::Error {
                return Ok(VisitReturn::Error);
            }
        }
    }
}
