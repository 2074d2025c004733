//! Generated script payload: parsing and materialization.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name the script is written to inside its run directory.
pub const SCRIPT_FILE_NAME: &str = "task_code.py";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Model output is not a valid script payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Failed to write script to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A third-party module the script needs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    pub module: String,
}

/// Code and dependency list returned by the model.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeneratedScript {
    pub code: String,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl GeneratedScript {
    /// Decode the JSON document found in the completion's message content.
    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Dependency header followed by the code, verbatim.
    pub fn render(&self, requires_python: &str) -> String {
        let mut out = dependency_header(requires_python, &self.dependencies);
        out.push_str(&self.code);
        out
    }

    /// Write the rendered script to `dir/task_code.py`, replacing any previous
    /// content, and return its path.
    pub async fn materialize(&self, dir: &Path, requires_python: &str) -> Result<PathBuf, ScriptError> {
        let path = dir.join(SCRIPT_FILE_NAME);
        tokio::fs::write(&path, self.render(requires_python))
            .await
            .map_err(|source| ScriptError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Inline script metadata block read by `uv run`.
pub fn dependency_header(requires_python: &str, deps: &[Dependency]) -> String {
    let mut header = String::from("# /// script\n");
    header.push_str(&format!("# requires-python = \"{}\"\n", requires_python));
    header.push_str("# dependencies = [\n");
    for dep in deps {
        header.push_str(&format!("# \"{}\",\n", dep.module));
    }
    header.push_str("# ]\n# ///\n");
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str) -> Dependency {
        Dependency {
            module: name.to_string(),
        }
    }

    #[test]
    fn empty_dependency_header_matches_inline_metadata_format() {
        assert_eq!(
            dependency_header(">= 3.12", &[]),
            "# /// script\n# requires-python = \">= 3.12\"\n# dependencies = [\n# ]\n# ///\n"
        );
    }

    #[test]
    fn header_lists_modules_in_order() {
        let header = dependency_header(">= 3.12", &[dep("requests"), dep("pandas")]);
        assert_eq!(
            header,
            "# /// script\n# requires-python = \">= 3.12\"\n# dependencies = [\n# \"requests\",\n# \"pandas\",\n# ]\n# ///\n"
        );
    }

    #[test]
    fn parse_reads_code_and_dependencies() {
        let script = GeneratedScript::parse(
            r#"{"code": "import os\nprint(os.listdir('.'))", "dependencies": [{"module": "rich"}]}"#,
        )
        .unwrap();
        assert_eq!(script.code, "import os\nprint(os.listdir('.'))");
        assert_eq!(script.dependencies, vec![dep("rich")]);
    }

    #[test]
    fn parse_rejects_missing_code_and_invalid_json() {
        assert!(GeneratedScript::parse(r#"{"dependencies": []}"#).is_err());
        assert!(GeneratedScript::parse("print('hi')").is_err());
        assert!(GeneratedScript::parse(r#"{"code": 42}"#).is_err());
    }

    #[test]
    fn parse_tolerates_missing_dependency_list() {
        let script = GeneratedScript::parse(r#"{"code": "echo hi"}"#).unwrap();
        assert!(script.dependencies.is_empty());
    }

    #[tokio::test]
    async fn materialize_overwrites_previous_script() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = GeneratedScript {
            code: "print('a much longer first script body')".to_string(),
            dependencies: vec![dep("requests")],
        };
        let second = GeneratedScript {
            code: "print('b')".to_string(),
            dependencies: vec![],
        };

        first.materialize(dir.path(), ">= 3.12").await.unwrap();
        let path = second.materialize(dir.path(), ">= 3.12").await.unwrap();

        assert_eq!(path, dir.path().join(SCRIPT_FILE_NAME));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, second.render(">= 3.12"));
        assert!(written.ends_with("print('b')"));
        assert!(!written.contains("requests"));
    }
}
