use core::fmt;
use core::str::FromStr;

use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A reference to a task from another task's `dependsOn` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskRef {
    /// `^name`: the task of the same name in every dependency package, run
    /// before this one.
    Upstream(String),
    /// `name`: a task in the same package.
    Local(String),
}

impl TaskRef {
    pub fn upstream(name: impl Into<String>) -> Self {
        Self::Upstream(name.into())
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::Local(name.into())
    }

    /// The referenced task name, without the `^` prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Upstream(name) | Self::Local(name) => name,
        }
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream(name) => write!(f, "^{name}"),
            Self::Local(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task reference '{input}': expected a task name, optionally prefixed with '^'")]
pub struct ParseTaskRefError {
    pub input: String,
}

impl FromStr for TaskRef {
    type Err = ParseTaskRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (upstream, name) = match s.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if name.is_empty() || name.contains('^') {
            return Err(ParseTaskRefError {
                input: s.to_owned(),
            });
        }
        Ok(if upstream {
            Self::upstream(name)
        } else {
            Self::local(name)
        })
    }
}

impl Serialize for TaskRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single entry of the `tasks` table.
///
/// Unset fields are left out of the rendered document so that Turborepo
/// applies its own defaults: tasks are cached and not persistent unless they
/// say otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
#[schemars(title = "Task Definition")]
pub struct TaskDefinition {
    /// Tasks that must complete before this one starts. A `^` prefix refers
    /// to the task of the same name in each dependency package.
    #[schemars(title = "Depends On", with = "Vec<String>")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskRef>,

    /// Glob patterns of the files this task produces, restored on a cache hit.
    #[schemars(title = "Outputs")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,

    /// Whether results of this task may be cached. Defaults to `true`.
    #[schemars(title = "Cache")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,

    /// Marks a long-running task, such as a dev server, that never exits.
    /// Defaults to `false`.
    #[schemars(title = "Persistent")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
}

impl TaskDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn depends_on(mut self, refs: impl IntoIterator<Item = TaskRef>) -> Self {
        self.depends_on.extend(refs);
        self
    }

    #[must_use]
    pub fn outputs<S: Into<String>>(mut self, globs: impl IntoIterator<Item = S>) -> Self {
        self.outputs.extend(globs.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = Some(persistent);
        self
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.unwrap_or(true)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_reference() -> anyhow::Result<()> {
        let task: TaskRef = "^build".parse()?;
        assert_eq!(task, TaskRef::upstream("build"));
        assert_eq!(task.name(), "build");
        Ok(())
    }

    #[test]
    fn parses_local_reference() -> anyhow::Result<()> {
        let task: TaskRef = "lint".parse()?;
        assert_eq!(task, TaskRef::local("lint"));
        Ok(())
    }

    #[test]
    fn display_round_trips_through_parse() -> anyhow::Result<()> {
        for input in ["^build", "test", "^typecheck"] {
            let task: TaskRef = input.parse()?;
            assert_eq!(task.to_string(), input);
        }
        Ok(())
    }

    #[test]
    fn rejects_missing_name() {
        for input in ["", "^", "^^build"] {
            let err = input.parse::<TaskRef>().expect_err("should reject");
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn serializes_as_string() -> anyhow::Result<()> {
        let json = serde_json::to_string(&[TaskRef::upstream("build"), TaskRef::local("lint")])?;
        assert_eq!(json, r#"["^build","lint"]"#);
        Ok(())
    }

    #[test]
    fn unset_fields_are_omitted() -> anyhow::Result<()> {
        let json = serde_json::to_string(&TaskDefinition::new().cache(false))?;
        assert_eq!(json, r#"{"cache":false}"#);
        Ok(())
    }

    #[test]
    fn effective_defaults() {
        let task = TaskDefinition::new();
        assert!(task.cache_enabled());
        assert!(!task.is_persistent());

        let task = task.cache(false).persistent(true);
        assert!(!task.cache_enabled());
        assert!(task.is_persistent());
    }

    #[test]
    fn builder_keeps_order() {
        let task = TaskDefinition::new()
            .outputs(["dist/**"])
            .outputs(["src-tauri/target/**"]);
        assert_eq!(task.outputs, vec!["dist/**", "src-tauri/target/**"]);
    }
}
