//! Localized prompt definitions loaded from YAML files.
//!
//! One file per prompt artifact (see [`load`] for the file names). Each file has the shape
//! of [`PromptFile`]; [`load_prompt`] adapts it into a [`Prompt`], compiling the optional
//! `template` into a [`PromptTemplate`].

mod load;
mod template;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use load::{
    load, load_prompt, prompts_root, PromptSet, ACTION_GROUP_FILE, FUNCTIONS_FILE,
    INSTRUCTION_FILE, KNOWLEDGE_BASE_FILE, POST_PROCESSING_FILE,
};
pub use template::{PromptTemplate, TemplateError, TemplateValues};

/// Per-file YAML shape of a prompt document. Unknown keys are ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PromptFile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub input_variables: Option<Vec<String>>,
}

/// A loaded prompt. Read-only once built.
#[derive(Clone, Debug)]
pub struct Prompt {
    /// Copied verbatim from the source; never empty.
    pub name: String,
    /// Copied verbatim from the source.
    pub description: Option<String>,
    /// Present iff the source had a non-empty `template`.
    pub template: Option<PromptTemplate>,
    pub input_variables: Option<Vec<String>>,
    /// File the prompt was loaded from, for error messages.
    pub source_path: PathBuf,
}

impl Prompt {
    /// Path the prompt was loaded from.
    pub fn path(&self) -> &Path {
        &self.source_path
    }

    /// Renders the template if there is one.
    pub async fn render(&self, values: &TemplateValues) -> Result<Option<String>, TemplateError> {
        match &self.template {
            Some(t) => t.render(values).await.map(Some),
            None => Ok(None),
        }
    }
}
