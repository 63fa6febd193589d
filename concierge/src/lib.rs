//! # Concierge
//!
//! Builds the resource specification for a conversational booking assistant: a managed agent
//! with a function-calling action group, a document-grounded knowledge base and a reservation
//! table. Model inference, retrieval and the action handler itself belong to the managed
//! service; this crate turns localized prompt files into the request that provisions them.
//!
//! ## Flow
//!
//! 1. [`locale::resolve`] picks a [`Locale`]; [`Locale::prompt_dir`] selects its directory.
//! 2. [`document::read_document`] reads YAML files (missing optional files are not errors).
//! 3. [`prompts::load_prompt`] and [`functions::load_functions_schema`] adapt the documents;
//!    [`prompts::load`] loads a whole locale into a [`PromptSet`].
//! 4. [`provision::assemble`] renders every template (awaiting each) and builds a [`StackSpec`],
//!    adding a post-processing [`PromptOverrideConfiguration`] when the locale has one.
//! 5. A [`Provisioner`] takes the finished spec.
//!
//! Settings come from `CONCIERGE_*` environment variables ([`ProvisionSettings::try_from_env`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use concierge::{provision, ManifestProvisioner, ProvisionSettings, TemplateValues};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ProvisionSettings::try_from_env()?;
//! let out = ManifestProvisioner::new("concierge.out");
//! let (spec, handle) = provision::provision(
//!     &out,
//!     Path::new("prompts"),
//!     Some("ko"),
//!     &settings,
//!     &TemplateValues::new(),
//! )
//! .await?;
//! println!("{} -> {}", spec.agent.agent_name, handle.location);
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod functions;
pub mod locale;
pub mod override_config;
pub mod prompts;
pub mod provision;
pub mod settings;
pub mod summary;

pub use document::{read_document, require_document, Document, LoadError};
pub use functions::{load_functions_schema, FunctionDefinition, FunctionSchema, ParameterType};
pub use locale::{Locale, LocaleError};
pub use override_config::{post_processing_override, serialize_template, PromptOverrideConfiguration};
pub use prompts::{load_prompt, Prompt, PromptSet, PromptTemplate, TemplateError, TemplateValues};
pub use provision::{
    assemble, assemble_locale, AssembleError, ManifestProvisioner, MockProvisioner,
    ProvisionError, Provisioner, RunError, StackHandle, StackSpec,
};
pub use settings::{InferenceSettings, ProvisionSettings, SettingsError};
pub use summary::{build_stack_summary, ConfigSection, StackSummary};
