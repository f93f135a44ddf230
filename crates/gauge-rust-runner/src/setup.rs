//! Project scaffolding for `--init`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::phase::PhaseExecutor;

const RUST_PROPERTIES: &str = "\
# Settings read by the Rust runner

# Attach a screenshot to failed hooks and steps when a grabber is configured
screenshot_enabled = true

# Seconds to keep retrying the connection to Gauge on startup
GAUGE_RUNNER_CONNECT_TIMEOUT_SECS = 30
";

const STEP_IMPLEMENTATION: &str = r#"use gauge_rust_runner::prelude::*;

pub fn steps() -> StepRegistry {
    StepRegistry::builder()
        .step(StepHandle::new("Vowels in English language are {}.", |args: &[String]| {
            datastore::scenario().put("vowels", json!(args[0]));
            Ok(())
        }))
        .step(StepHandle::new("The word {} has {} vowels.", |args: &[String]| {
            let vowels = datastore::scenario()
                .get("vowels")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "aeiou".to_string());
            let expected: usize = args[1]
                .parse()
                .map_err(|_| HookError::Assertion(format!("not a count: {}", args[1])))?;
            let actual = args[0].chars().filter(|c| vowels.contains(*c)).count();
            if actual == expected {
                Ok(())
            } else {
                Err(HookError::Assertion(format!(
                    "expected {} vowels in {}, found {}",
                    expected, args[0], actual
                )))
            }
        }))
        .build()
}

pub fn hooks() -> HookRegistry {
    HookRegistry::builder()
        .before_scenario(HookHandle::new("reset_vowels", |_info: &ExecutionInfo| {
            datastore::scenario().put("vowels", json!("aeiou"));
            Ok(())
        }))
        .build()
}
"#;

/// Files written by the setup phase, relative to the project root
const TEMPLATES: &[(&str, &str)] = &[
    ("env/default/rust.properties", RUST_PROPERTIES),
    ("src/step_implementation.rs", STEP_IMPLEMENTATION),
];

/// Creates the runner's project files, leaving existing ones untouched
pub struct SetupPhaseExecutor {
    project_root: PathBuf,
}

impl SetupPhaseExecutor {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Write any missing template files and return the paths created.
    pub fn scaffold(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();

        for (relative, contents) in TEMPLATES {
            let path = self.project_root.join(relative);
            if path.exists() {
                tracing::debug!(path = %path.display(), "Keeping existing file");
                continue;
            }
            write_new(&path, contents)?;
            created.push(path);
        }

        Ok(created)
    }
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

impl PhaseExecutor for SetupPhaseExecutor {
    fn execute(&self) -> Result<()> {
        for path in self.scaffold()? {
            let shown = path.strip_prefix(&self.project_root).unwrap_or(path.as_path());
            println!("create  {}", shown.display());
        }
        tracing::info!(project_root = %self.project_root.display(), "Rust runner initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_creates_templates() {
        let dir = TempDir::new().unwrap();
        let setup = SetupPhaseExecutor::new(dir.path());

        let created = setup.scaffold().unwrap();

        assert_eq!(created.len(), 2);
        let properties = fs::read_to_string(dir.path().join("env/default/rust.properties")).unwrap();
        assert!(properties.contains("screenshot_enabled"));
        assert!(dir.path().join("src/step_implementation.rs").is_file());
    }

    #[test]
    fn test_scaffold_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/step_implementation.rs"), "// mine").unwrap();

        let created = SetupPhaseExecutor::new(dir.path()).scaffold().unwrap();

        assert_eq!(created, vec![dir.path().join("env/default/rust.properties")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/step_implementation.rs")).unwrap(),
            "// mine"
        );
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let setup = SetupPhaseExecutor::new(dir.path());

        setup.execute().unwrap();
        assert!(setup.scaffold().unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_root_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "").unwrap();

        assert!(SetupPhaseExecutor::new(&file).execute().is_err());
    }
}
