#![doc = include_str!("../README.md")]
#![allow(unused_assignments)] // thiserror/miette derive macros trigger false positives

mod emit;
mod task;

use indexmap::IndexMap;
use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde_json::Value;

pub use emit::{DEFAULT_PATH, WriteFailure, emit};
pub use task::{ParseTaskRefError, TaskDefinition, TaskRef};

/// Schema URI written at the top of the document.
pub const SCHEMA_URL: &str = "https://turbo.build/schema.json";

fn example_global_dependencies() -> Vec<String> {
    vec!["**/.env.*local".into(), "tsconfig.json".into()]
}

/// Turborepo configuration for the monorepo root.
///
/// Field and task order is preserved when rendering, so the generated file
/// is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "turbo.json")]
pub struct TurboConfig {
    /// URI of the JSON Schema describing this file.
    #[schemars(title = "Schema")]
    pub schema: String,

    /// Glob patterns of files outside any package whose changes invalidate
    /// every task's cache.
    #[schemars(title = "Global Dependencies", example = example_global_dependencies())]
    pub global_dependencies: Vec<String>,

    /// Task definitions keyed by task name.
    #[schemars(title = "Tasks")]
    pub tasks: IndexMap<String, TaskDefinition>,
}

impl TurboConfig {
    /// The pipeline shipped with the monorepo.
    ///
    /// - `build` runs after `build` in every dependency package and caches
    ///   `dist/**` and the Tauri target directory.
    /// - `dev` is a long-running, uncached task.
    /// - `lint` runs after `lint` in every dependency package.
    /// - `clean` is never cached.
    pub fn default_document() -> Self {
        let tasks = IndexMap::from([
            (
                "build".to_owned(),
                TaskDefinition::new()
                    .depends_on([TaskRef::upstream("build")])
                    .outputs(["dist/**", "src-tauri/target/**"]),
            ),
            (
                "dev".to_owned(),
                TaskDefinition::new().cache(false).persistent(true),
            ),
            (
                "lint".to_owned(),
                TaskDefinition::new().depends_on([TaskRef::upstream("lint")]),
            ),
            ("clean".to_owned(), TaskDefinition::new().cache(false)),
        ]);

        Self {
            schema: SCHEMA_URL.to_owned(),
            global_dependencies: vec!["**/.env.*local".to_owned()],
            tasks,
        }
    }

    /// Look up a task definition by name.
    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// Render the document exactly as it is written to disk: two-space
    /// indentation, no trailing newline.
    ///
    /// # Panics
    ///
    /// Panics if the document cannot be serialized to JSON (should never
    /// happen).
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(self).expect("config serialization cannot fail")
    }
}

impl Default for TurboConfig {
    fn default() -> Self {
        Self::default_document()
    }
}

/// Generate the JSON Schema for the `turbo.json` document as a
/// `serde_json::Value`.
///
/// # Panics
///
/// Panics if the schema cannot be serialized to JSON (should never happen).
pub fn schema() -> Value {
    serde_json::to_value(schema_for!(TurboConfig)).expect("schema serialization cannot fail")
}
