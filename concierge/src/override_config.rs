//! Prompt override built from an optional post-processing document.
//!
//! The document is passed to the agent service verbatim as `basePromptTemplate`, serialized as
//! compact JSON, together with the inference parameters from
//! [`InferenceSettings`](crate::settings::InferenceSettings).

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::settings::InferenceSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptType {
    PreProcessing,
    Orchestration,
    PostProcessing,
    KnowledgeBaseResponseGeneration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptCreationMode {
    Default,
    Overridden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptState {
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParserMode {
    Default,
    Overridden,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfiguration {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub maximum_length: u32,
    pub stop_sequences: Vec<String>,
}

impl From<&InferenceSettings> for InferenceConfiguration {
    fn from(s: &InferenceSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_p: s.top_p,
            top_k: s.top_k,
            maximum_length: s.maximum_length,
            stop_sequences: s.stop_sequences.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfiguration {
    pub prompt_type: PromptType,
    pub prompt_creation_mode: PromptCreationMode,
    pub prompt_state: PromptState,
    pub base_prompt_template: String,
    pub inference_configuration: InferenceConfiguration,
    pub parser_mode: ParserMode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOverrideConfiguration {
    pub prompt_configurations: Vec<PromptConfiguration>,
}

/// Serializes a post-processing document to its `basePromptTemplate` string form.
pub fn serialize_template(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(doc)
}

/// Builds the override for a post-processing document.
pub fn post_processing_override(
    doc: &Document,
    inference: &InferenceSettings,
) -> Result<PromptOverrideConfiguration, serde_json::Error> {
    Ok(PromptOverrideConfiguration {
        prompt_configurations: vec![PromptConfiguration {
            prompt_type: PromptType::PostProcessing,
            prompt_creation_mode: PromptCreationMode::Overridden,
            prompt_state: PromptState::Enabled,
            base_prompt_template: serialize_template(doc)?,
            inference_configuration: InferenceConfiguration::from(inference),
            parser_mode: ParserMode::Default,
        }],
    })
}
