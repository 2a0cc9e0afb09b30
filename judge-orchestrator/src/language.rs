use crate::prelude::*;

/// One entry of the Language Registry (spec.md §4.8): how to save,
/// compile, and run a submission or checker written in a given
/// language. `compile` and `exec` are command templates; `exec` may
/// carry named placeholders (`{input}`, `{judge}`, `{contestant}`)
/// that the checker invocation binds to staged file names. Plain
/// languages just leave their `exec` free of placeholders.
#[derive(Debug, Deserialize)]
pub struct LanguageSpec {
    /// Source code should be saved into this file, relative to the
    /// sandbox's working directory.
    pub source_name: String,
    /// Command to compile `source_name`, as an argv vector.
    pub compile: Vec<String>,
    /// Artifacts the compile step must leave behind; staged back out
    /// of the sandbox and re-staged in before the run/checker step.
    pub objects: Vec<String>,
    /// Command to run the compiled program, as an argv template.
    pub exec: Vec<String>,
}

/// Language id -> [`LanguageSpec`], loaded straight from the
/// `[language.*]` tables of the orchestrator's TOML config.
pub type LanguageRegistry = std::collections::HashMap<String, LanguageSpec>;

/// Look up `id`, or fail with [`Error::UnconfiguredLanguage`] — the
/// only way this registry is consulted, so every caller gets the same
/// error message.
pub fn lookup<'a>(registry: &'a LanguageRegistry, id: &str) -> Result<&'a LanguageSpec> {
    registry
        .get(id)
        .ok_or_else(|| Error::UnconfiguredLanguage(id.to_owned()))
}

/// Expand a command template's named placeholders (`{name}`) against
/// `vars`, substituting within each argv word independently.
pub fn expand(template: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    template
        .iter()
        .map(|word| {
            let mut word = word.clone();
            for (name, value) in vars {
                word = word.replace(&format!("{{{}}}", name), value);
            }
            word
        })
        .collect()
}
