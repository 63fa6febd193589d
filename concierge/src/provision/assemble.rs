//! Assembles a [`StackSpec`] from a loaded [`PromptSet`] and [`ProvisionSettings`].
//!
//! Every template is rendered and awaited before the descriptor that embeds it is built, so
//! a spec is either complete or not produced at all. There are no completion callbacks.

use std::path::Path;

use super::spec::{
    ActionGroupExecutor, ActionGroupSpec, ActionGroupState, AgentSpec, ChunkingConfiguration,
    DataSourceSpec, KnowledgeBaseSpec, StackSpec, TableSpec, TABLE_NAME_ENV,
};
use crate::document::LoadError;
use crate::locale::{self, Locale, LocaleError};
use crate::override_config::post_processing_override;
use crate::prompts::{self, Prompt, PromptSet, TemplateError, TemplateValues};
use crate::settings::{ProvisionSettings, SettingsError};

/// The agent service rejects instructions shorter than this.
pub const MIN_INSTRUCTION_CHARS: usize = 40;

/// Error when assembling the stack spec. Any error aborts the run; nothing partial is returned.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Locale(#[from] LocaleError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to render prompt `{prompt}` ({path}): {source}")]
    Render {
        prompt: String,
        path: String,
        #[source]
        source: TemplateError,
    },
    #[error("prompt `{prompt}` ({path}) has neither `template` nor `description`")]
    MissingText { prompt: String, path: String },
    #[error("agent instruction from {path} is {len} characters; at least {min} are required")]
    InstructionTooShort { path: String, len: usize, min: usize },
    #[error("failed to serialize post-processing prompt {path}: {message}")]
    Serialize { path: String, message: String },
}

/// Variables every template can use: `agent_name`, `locale`, then settings' `CONCIERGE_VAR_*`
/// values, then `extra` (later sources win).
pub fn template_values(
    locale: Locale,
    settings: &ProvisionSettings,
    extra: &TemplateValues,
) -> TemplateValues {
    let mut values = TemplateValues::new();
    values.insert("agent_name".to_string(), settings.agent_name.clone());
    values.insert("locale".to_string(), locale.code().to_string());
    values.extend(settings.template_vars.clone());
    values.extend(extra.clone());
    values
}

/// Rendered template, or the description when the prompt has no template.
async fn prompt_text(prompt: &Prompt, values: &TemplateValues) -> Result<String, AssembleError> {
    let rendered = prompt
        .render(values)
        .await
        .map_err(|source| AssembleError::Render {
            prompt: prompt.name.clone(),
            path: prompt.path().display().to_string(),
            source,
        })?;
    rendered
        .or_else(|| prompt.description.clone())
        .ok_or_else(|| AssembleError::MissingText {
            prompt: prompt.name.clone(),
            path: prompt.path().display().to_string(),
        })
}

/// Builds the stack spec for `locale` from an already loaded prompt set.
pub async fn assemble(
    locale: Locale,
    set: &PromptSet,
    settings: &ProvisionSettings,
    extra: &TemplateValues,
) -> Result<StackSpec, AssembleError> {
    let values = template_values(locale, settings, extra);

    let instruction = prompt_text(&set.instruction, &values).await?;
    let len = instruction.chars().count();
    if len < MIN_INSTRUCTION_CHARS {
        return Err(AssembleError::InstructionTooShort {
            path: set.instruction.path().display().to_string(),
            len,
            min: MIN_INSTRUCTION_CHARS,
        });
    }
    let action_group_description = prompt_text(&set.action_group, &values).await?;
    let kb_instruction = prompt_text(&set.knowledge_base, &values).await?;

    let prompt_override_configuration = match &set.post_processing {
        Some(doc) => Some(post_processing_override(doc, &settings.inference).map_err(|e| {
            AssembleError::Serialize {
                path: set.dir.join(prompts::POST_PROCESSING_FILE).display().to_string(),
                message: e.to_string(),
            }
        })?),
        None => None,
    };

    let knowledge_base = KnowledgeBaseSpec {
        name: set.knowledge_base.name.clone(),
        description: set.knowledge_base.description.clone(),
        instruction: kb_instruction,
        embeddings_model: settings.embeddings_model.clone(),
        data_source: DataSourceSpec {
            name: format!("{}-docs", settings.stack_name),
            bucket_name: settings.knowledge_bucket.clone(),
            chunking_configuration: ChunkingConfiguration::fixed_size(),
        },
    };

    let action_group = ActionGroupSpec {
        action_group_name: set.action_group.name.clone(),
        description: Some(action_group_description),
        action_group_executor: ActionGroupExecutor {
            lambda: format!("{}-booking-handler", settings.stack_name),
            environment: [(TABLE_NAME_ENV.to_string(), settings.table_name.clone())]
                .into_iter()
                .collect(),
        },
        function_schema: set.functions.clone(),
        action_group_state: ActionGroupState::Enabled,
    };

    let agent = AgentSpec {
        agent_name: settings.agent_name.clone(),
        description: set.instruction.description.clone(),
        instruction,
        foundation_model: settings.foundation_model.clone(),
        idle_session_ttl_in_seconds: settings.idle_session_ttl_secs,
        prompt_override_configuration,
        action_groups: vec![action_group],
        knowledge_bases: vec![knowledge_base.name.clone()],
    };

    tracing::info!(
        stack = %settings.stack_name,
        locale = %locale,
        post_processing_override = agent.prompt_override_configuration.is_some(),
        "assembled stack spec"
    );
    Ok(StackSpec {
        stack_name: settings.stack_name.clone(),
        locale,
        agent,
        knowledge_base,
        booking_table: TableSpec::bookings(settings.table_name.clone()),
    })
}

/// Resolves `lang`, loads that locale's prompt directory under `root`, and assembles.
pub async fn assemble_locale(
    root: &Path,
    lang: Option<&str>,
    settings: &ProvisionSettings,
    extra: &TemplateValues,
) -> Result<StackSpec, AssembleError> {
    let locale = locale::resolve(lang)?;
    let dir = locale.prompt_dir(root);
    tracing::debug!(locale = %locale, dir = %dir.display(), "loading prompt set");
    let set = prompts::load(&dir)?;
    assemble(locale, &set, settings, extra).await
}
