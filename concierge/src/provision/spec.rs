//! Resource specification handed to the provisioning API.
//!
//! Field names serialize in camelCase to match the request shape the managed agent service
//! expects (`promptOverrideConfiguration`, `actionGroupExecutor`, ...). Optional fields are
//! omitted rather than written as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::functions::FunctionSchema;
use crate::locale::Locale;
use crate::override_config::PromptOverrideConfiguration;

/// Fixed-size chunk length, in tokens, for knowledge base ingestion.
pub const CHUNK_MAX_TOKENS: u32 = 512;
/// Overlap between consecutive chunks, in percent.
pub const CHUNK_OVERLAP_PERCENTAGE: u32 = 20;
/// Partition key of the reservation table.
pub const BOOKING_PARTITION_KEY: &str = "booking_id";
/// Environment variable through which the action handler learns the table name.
pub const TABLE_NAME_ENV: &str = "BOOKING_TABLE_NAME";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionGroupState {
    Enabled,
    Disabled,
}

/// The callable endpoint behind an action group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupExecutor {
    /// Name of the handler function created alongside the agent.
    pub lambda: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupSpec {
    pub action_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub action_group_executor: ActionGroupExecutor,
    pub function_schema: FunctionSchema,
    pub action_group_state: ActionGroupState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChunkingStrategy {
    FixedSize,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedSizeChunkingConfiguration {
    pub max_tokens: u32,
    pub overlap_percentage: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingConfiguration {
    pub chunking_strategy: ChunkingStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_size_chunking_configuration: Option<FixedSizeChunkingConfiguration>,
}

impl ChunkingConfiguration {
    /// 512-token chunks with 20% overlap.
    pub fn fixed_size() -> Self {
        Self {
            chunking_strategy: ChunkingStrategy::FixedSize,
            fixed_size_chunking_configuration: Some(FixedSizeChunkingConfiguration {
                max_tokens: CHUNK_MAX_TOKENS,
                overlap_percentage: CHUNK_OVERLAP_PERCENTAGE,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSpec {
    pub name: String,
    pub bucket_name: String,
    pub chunking_configuration: ChunkingConfiguration,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tells the agent when to consult the knowledge base.
    pub instruction: String,
    pub embeddings_model: String,
    pub data_source: DataSourceSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub instruction: String,
    pub foundation_model: String,
    pub idle_session_ttl_in_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_override_configuration: Option<PromptOverrideConfiguration>,
    pub action_groups: Vec<ActionGroupSpec>,
    /// Names of knowledge bases associated with the agent.
    pub knowledge_bases: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    /// Attribute type code: `S`, `N` or `B`.
    #[serde(rename = "type")]
    pub attribute_type: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    PayPerRequest,
    Provisioned,
}

/// Reservation metadata store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
}

impl TableSpec {
    /// On-demand table keyed by `booking_id` (string).
    pub fn bookings(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: KeyAttribute {
                name: BOOKING_PARTITION_KEY.to_string(),
                attribute_type: "S".to_string(),
            },
            billing_mode: BillingMode::PayPerRequest,
        }
    }
}

/// The complete set of resources for one provisioning run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSpec {
    pub stack_name: String,
    pub locale: Locale,
    pub agent: AgentSpec,
    pub knowledge_base: KnowledgeBaseSpec,
    pub booking_table: TableSpec,
}
