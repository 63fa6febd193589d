//! Load prompts from a locale directory of YAML files.
//!
//! Layout of one locale directory:
//!
//! ```text
//! <root>/<locale>/
//! ├── instruction.yaml       agent instruction (required)
//! ├── action_group.yaml      action group description (required)
//! ├── knowledge_base.yaml    knowledge base instruction (required)
//! ├── functions.yaml         action group function schema (required)
//! └── post_processing.yaml   post-processing prompt override (optional)
//! ```
//!
//! See [`load_prompt`], [`load`] and [`prompts_root`].

use std::path::{Path, PathBuf};

use super::{Prompt, PromptFile, PromptTemplate};
use crate::document::{self, Document, LoadError};
use crate::functions::{load_functions_schema, FunctionSchema};

pub const INSTRUCTION_FILE: &str = "instruction.yaml";
pub const ACTION_GROUP_FILE: &str = "action_group.yaml";
pub const KNOWLEDGE_BASE_FILE: &str = "knowledge_base.yaml";
pub const FUNCTIONS_FILE: &str = "functions.yaml";
pub const POST_PROCESSING_FILE: &str = "post_processing.yaml";

/// Default root directory when neither an explicit dir nor `CONCIERGE_PROMPTS_DIR` is given.
const DEFAULT_PROMPTS_ROOT: &str = "prompts";

/// Returns the prompts root: `dir` if `Some`, else `CONCIERGE_PROMPTS_DIR`, else `./prompts`.
pub fn prompts_root(dir: Option<&Path>) -> PathBuf {
    dir.map(Path::to_path_buf).unwrap_or_else(|| {
        std::env::var("CONCIERGE_PROMPTS_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_ROOT))
    })
}

/// Loads the prompt at `path`. The file is required and must have a non-empty `name`.
///
/// A non-empty `template` is compiled against `input_variables` (empty when omitted).
/// Placeholders the template uses but does not declare are logged, not rejected.
pub fn load_prompt(path: &Path) -> Result<Prompt, LoadError> {
    let doc = document::require_document(path)?;
    let file: PromptFile = document::from_document(path, doc)?;
    if file.name.trim().is_empty() {
        return Err(LoadError::Invalid {
            path: path.display().to_string(),
            message: "`name` must not be empty".to_string(),
        });
    }

    let template = match file.template.as_deref() {
        Some(src) if !src.is_empty() => {
            let declared = file.input_variables.clone().unwrap_or_default();
            let t = PromptTemplate::compile(src, declared).map_err(|e| LoadError::Invalid {
                path: path.display().to_string(),
                message: format!("`template`: {}", e),
            })?;
            let undeclared = t.undeclared_variables();
            if !undeclared.is_empty() {
                tracing::warn!(
                    path = %path.display(),
                    variables = ?undeclared,
                    "template uses variables not listed in input_variables"
                );
            }
            Some(t)
        }
        _ => None,
    };

    tracing::debug!(path = %path.display(), name = %file.name, has_template = template.is_some(), "loaded prompt");
    Ok(Prompt {
        name: file.name,
        description: file.description,
        template,
        input_variables: file.input_variables,
        source_path: path.to_path_buf(),
    })
}

/// Everything loaded from one locale directory.
#[derive(Clone, Debug)]
pub struct PromptSet {
    pub dir: PathBuf,
    pub instruction: Prompt,
    pub action_group: Prompt,
    pub knowledge_base: Prompt,
    pub functions: FunctionSchema,
    /// Raw post-processing document; `None` when the locale has no override.
    pub post_processing: Option<Document>,
}

/// Loads the four required documents and the optional post-processing document from `dir`.
///
/// Fails on the first missing required file or on any malformed file, naming its path.
pub fn load(dir: &Path) -> Result<PromptSet, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingRequired {
            path: dir.display().to_string(),
        });
    }
    let instruction = load_prompt(&dir.join(INSTRUCTION_FILE))?;
    let action_group = load_prompt(&dir.join(ACTION_GROUP_FILE))?;
    let knowledge_base = load_prompt(&dir.join(KNOWLEDGE_BASE_FILE))?;
    let functions = load_functions_schema(&dir.join(FUNCTIONS_FILE))?;
    let post_processing = document::read_document(&dir.join(POST_PROCESSING_FILE))?;

    Ok(PromptSet {
        dir: dir.to_path_buf(),
        instruction,
        action_group,
        knowledge_base,
        functions,
        post_processing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn write_required(dir: &Path) {
        write(
            dir,
            INSTRUCTION_FILE,
            "name: instruction\ntemplate: You help guests of {restaurant} book tables.\ninput_variables: [restaurant]\n",
        );
        write(dir, ACTION_GROUP_FILE, "name: TableBookingsActionGroup\ndescription: Manage bookings.\n");
        write(dir, KNOWLEDGE_BASE_FILE, "name: menu\ndescription: Menus and opening hours.\n");
        write(dir, FUNCTIONS_FILE, "functions:\n  - name: create_booking\n");
    }

    #[test]
    fn copies_name_and_description_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "p.yaml",
            "name: \"  Booking Agent \"\ndescription: \"Handles reservations.\\n\"\n",
        );
        let p = load_prompt(&path).unwrap();
        assert_eq!(p.name, "  Booking Agent ");
        assert_eq!(p.description.as_deref(), Some("Handles reservations.\n"));
        assert_eq!(p.path(), path.as_path());
    }

    #[test]
    fn no_template_field_means_no_template() {
        let dir = tempfile::tempdir().unwrap();
        let p = load_prompt(&write(dir.path(), "p.yaml", "name: kb\n")).unwrap();
        assert!(p.template.is_none());
        assert!(p.description.is_none());
        assert!(p.input_variables.is_none());
    }

    #[test]
    fn empty_template_field_means_no_template() {
        let dir = tempfile::tempdir().unwrap();
        let p = load_prompt(&write(dir.path(), "p.yaml", "name: kb\ntemplate: \"\"\n")).unwrap();
        assert!(p.template.is_none());
    }

    #[test]
    fn template_binds_declared_variables() {
        let dir = tempfile::tempdir().unwrap();
        let p = load_prompt(&write(
            dir.path(),
            "p.yaml",
            "name: t\ntemplate: \"{x}-{y}\"\ninput_variables: [x, y]\n",
        ))
        .unwrap();
        let t = p.template.unwrap();
        assert_eq!(t.input_variables(), ["x", "y"]);
        assert_eq!(t.variables(), ["x", "y"]);
    }

    #[test]
    fn omitted_input_variables_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let p = load_prompt(&write(dir.path(), "p.yaml", "name: t\ntemplate: \"{x}\"\n")).unwrap();
        let t = p.template.unwrap();
        assert!(t.input_variables().is_empty());
        assert_eq!(t.undeclared_variables(), vec!["x"]);
    }

    #[test]
    fn missing_prompt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prompt(&dir.path().join(INSTRUCTION_FILE)).unwrap_err();
        assert!(matches!(err, LoadError::MissingRequired { .. }));
        assert!(err.path().ends_with(INSTRUCTION_FILE));
    }

    #[test]
    fn empty_or_missing_name_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prompt(&write(dir.path(), "a.yaml", "name: \"\"\n")).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
        let err = load_prompt(&write(dir.path(), "b.yaml", "description: nameless\n")).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
    }

    #[test]
    fn malformed_template_is_invalid_with_field_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_prompt(&write(dir.path(), "p.yaml", "name: t\ntemplate: \"{oops\"\n")).unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
        assert!(err.to_string().contains("`template`"));
    }

    #[test]
    fn load_set_without_post_processing() {
        let dir = tempfile::tempdir().unwrap();
        write_required(dir.path());
        let set = load(dir.path()).unwrap();
        assert_eq!(set.action_group.name, "TableBookingsActionGroup");
        assert_eq!(set.functions.functions[0].name, "create_booking");
        assert!(set.post_processing.is_none());
    }

    #[test]
    fn load_set_with_post_processing() {
        let dir = tempfile::tempdir().unwrap();
        write_required(dir.path());
        write(dir.path(), POST_PROCESSING_FILE, "system: Rephrase for the guest.\n");
        let set = load(dir.path()).unwrap();
        let post = set.post_processing.unwrap();
        assert_eq!(post["system"].as_str(), Some("Rephrase for the guest."));
    }

    #[test]
    fn load_set_fails_on_first_missing_required_file() {
        let dir = tempfile::tempdir().unwrap();
        write_required(dir.path());
        std::fs::remove_file(dir.path().join(KNOWLEDGE_BASE_FILE)).unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(err.path().ends_with(KNOWLEDGE_BASE_FILE));
    }

    #[test]
    fn load_set_missing_dir_is_fatal() {
        let err = load(Path::new("/nonexistent_concierge_prompts_12345/en")).unwrap_err();
        assert!(matches!(err, LoadError::MissingRequired { .. }));
    }

    #[test]
    fn explicit_root_wins_over_env() {
        let root = prompts_root(Some(Path::new("/srv/prompts")));
        assert_eq!(root, PathBuf::from("/srv/prompts"));
    }
}
