//! Shared fixtures for the integration tests
//!
//! A [`Fixture`] owns a temporary directory that project files are written
//! into, and builds [`Project`]s rooted there reporting to a shared
//! [`CollectingSink`].

#![allow(dead_code)]

use proeval::{CollectingSink, EvaluatorConfig, MessageKind, Project};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct Fixture {
    dir: TempDir,
    pub sink: Arc<CollectingSink>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
            sink: Arc::new(CollectingSink::new()),
        }
    }

    /// Directory project files live in, as a string
    pub fn root(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> String {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, contents).expect("failed to write file");
        path.to_string_lossy().into_owned()
    }

    pub fn config(&self) -> EvaluatorConfig {
        EvaluatorConfig::with_pwd(self.root())
    }

    pub fn project(&self) -> Project {
        self.project_with(self.config())
    }

    pub fn project_with(&self, config: EvaluatorConfig) -> Project {
        Project::with_sink(config, self.sink.clone())
    }

    /// Texts of the `message()` calls seen so far
    pub fn messages(&self) -> Vec<String> {
        self.sink
            .messages()
            .into_iter()
            .filter(|(kind, _)| *kind == MessageKind::Message)
            .map(|(_, text)| text)
            .collect()
    }
}

/// Values of `key` as plain strings
pub fn values(project: &Project, key: &str) -> Vec<String> {
    project.values_of(key).iter().map(|v| v.to_string()).collect()
}
