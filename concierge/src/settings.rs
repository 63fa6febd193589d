//! Provisioning settings read from `CONCIERGE_*` environment variables.
//!
//! No variable is required; each has a documented default. Load `.env` / XDG config first
//! (the `config` crate) so file-based values are visible here. A variable that is set but does
//! not parse is an error naming the variable, never a silent fallback.

use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::prompts::TemplateValues;

/// Prefix for extra template variables: `CONCIERGE_VAR_RESTAURANT=Ember` renders `{restaurant}`.
/// The name after the prefix is always lowercased; `{RESTAURANT}` cannot be fed this way.
pub const TEMPLATE_VAR_PREFIX: &str = "CONCIERGE_VAR_";

const DEFAULT_STACK_NAME: &str = "concierge";
const DEFAULT_AGENT_NAME: &str = "booking-agent";
const DEFAULT_FOUNDATION_MODEL: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const DEFAULT_EMBEDDINGS_MODEL: &str = "amazon.titan-embed-text-v2:0";
const DEFAULT_IDLE_SESSION_TTL_SECS: u32 = 1800;

/// Bounds the agent service accepts for post-processing inference.
const TOP_K_RANGE: RangeInclusive<u32> = 0..=500;
const MAX_LENGTH_RANGE: RangeInclusive<u32> = 1..=4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {message}")]
pub struct SettingsError {
    pub var: String,
    pub value: String,
    pub message: String,
}

/// Inference parameters applied to the post-processing prompt override.
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub maximum_length: u32,
    pub stop_sequences: Vec<String>,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            top_k: 250,
            maximum_length: 2048,
            stop_sequences: vec!["\n\nHuman:".to_string()],
        }
    }
}

/// Everything the orchestrator needs besides the prompt files.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvisionSettings {
    pub stack_name: String,
    pub agent_name: String,
    pub foundation_model: String,
    pub embeddings_model: String,
    pub idle_session_ttl_secs: u32,
    /// Bucket holding the knowledge base documents.
    pub knowledge_bucket: String,
    /// Reservation metadata table.
    pub table_name: String,
    pub inference: InferenceSettings,
    /// Extra template variables from `CONCIERGE_VAR_*`, keyed by lowercased suffix.
    pub template_vars: TemplateValues,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self::with_stack_name(DEFAULT_STACK_NAME)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| SettingsError {
            var: var.to_string(),
            value: value.clone(),
            message: e.to_string(),
        }),
    }
}

fn check_range<T>(var: &str, value: T, range: RangeInclusive<T>) -> Result<(), SettingsError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return Ok(());
    }
    Err(SettingsError {
        var: var.to_string(),
        value: value.to_string(),
        message: format!("must be between {} and {}", range.start(), range.end()),
    })
}

impl ProvisionSettings {
    /// Defaults, with bucket and table names derived from `stack_name`.
    pub fn with_stack_name(stack_name: &str) -> Self {
        Self {
            stack_name: stack_name.to_string(),
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            foundation_model: DEFAULT_FOUNDATION_MODEL.to_string(),
            embeddings_model: DEFAULT_EMBEDDINGS_MODEL.to_string(),
            idle_session_ttl_secs: DEFAULT_IDLE_SESSION_TTL_SECS,
            knowledge_bucket: format!("{}-knowledge", stack_name),
            table_name: format!("{}-bookings", stack_name),
            inference: InferenceSettings::default(),
            template_vars: TemplateValues::new(),
        }
    }

    /// Reads settings from the process environment.
    ///
    /// Reads: `CONCIERGE_STACK_NAME`, `CONCIERGE_AGENT_NAME`, `CONCIERGE_FOUNDATION_MODEL`,
    /// `CONCIERGE_EMBEDDINGS_MODEL`, `CONCIERGE_IDLE_SESSION_TTL`, `CONCIERGE_KB_BUCKET`,
    /// `CONCIERGE_TABLE_NAME`, `CONCIERGE_POST_TEMPERATURE`, `CONCIERGE_POST_TOP_P`,
    /// `CONCIERGE_POST_TOP_K`, `CONCIERGE_POST_MAX_LENGTH`, `CONCIERGE_POST_STOP_SEQUENCES`
    /// (`|`-separated) and every `CONCIERGE_VAR_*`.
    pub fn try_from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::from_lookup(|key| std::env::var(key).ok())?;
        settings.template_vars = template_vars_from(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        );
        Ok(settings)
    }

    /// Builds settings from any key lookup (the environment, or a map in tests).
    /// Template variables are not collected here; see [`template_vars_from`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let stack_name = get("CONCIERGE_STACK_NAME").unwrap_or_else(|| DEFAULT_STACK_NAME.to_string());
        let base = Self::with_stack_name(&stack_name);
        let defaults = InferenceSettings::default();

        let inference = InferenceSettings {
            temperature: parse_var(&get, "CONCIERGE_POST_TEMPERATURE", defaults.temperature)?,
            top_p: parse_var(&get, "CONCIERGE_POST_TOP_P", defaults.top_p)?,
            top_k: parse_var(&get, "CONCIERGE_POST_TOP_K", defaults.top_k)?,
            maximum_length: parse_var(&get, "CONCIERGE_POST_MAX_LENGTH", defaults.maximum_length)?,
            stop_sequences: get("CONCIERGE_POST_STOP_SEQUENCES")
                .map(|s| {
                    s.split('|')
                        .filter(|piece| !piece.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.stop_sequences),
        };
        check_range("CONCIERGE_POST_TEMPERATURE", inference.temperature, 0.0..=1.0)?;
        check_range("CONCIERGE_POST_TOP_P", inference.top_p, 0.0..=1.0)?;
        check_range("CONCIERGE_POST_TOP_K", inference.top_k, TOP_K_RANGE)?;
        check_range("CONCIERGE_POST_MAX_LENGTH", inference.maximum_length, MAX_LENGTH_RANGE)?;

        Ok(Self {
            agent_name: get("CONCIERGE_AGENT_NAME").unwrap_or(base.agent_name),
            foundation_model: get("CONCIERGE_FOUNDATION_MODEL").unwrap_or(base.foundation_model),
            embeddings_model: get("CONCIERGE_EMBEDDINGS_MODEL").unwrap_or(base.embeddings_model),
            idle_session_ttl_secs: parse_var(&get, "CONCIERGE_IDLE_SESSION_TTL", base.idle_session_ttl_secs)?,
            knowledge_bucket: get("CONCIERGE_KB_BUCKET").unwrap_or(base.knowledge_bucket),
            table_name: get("CONCIERGE_TABLE_NAME").unwrap_or(base.table_name),
            inference,
            template_vars: TemplateValues::new(),
            stack_name,
        })
    }
}

/// Collects `CONCIERGE_VAR_<NAME>=value` pairs as `<name>` (lowercased) to `value`.
pub fn template_vars_from(vars: impl IntoIterator<Item = (String, String)>) -> TemplateValues {
    vars.into_iter()
        .filter_map(|(k, v)| {
            let name = k.strip_prefix(TEMPLATE_VAR_PREFIX)?;
            (!name.is_empty()).then(|| (name.to_ascii_lowercase(), v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = ProvisionSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, ProvisionSettings::default());
        assert_eq!(s.knowledge_bucket, "concierge-knowledge");
        assert_eq!(s.table_name, "concierge-bookings");
        assert_eq!(s.inference.top_k, 250);
    }

    #[test]
    fn derived_names_follow_stack_name() {
        let s = ProvisionSettings::from_lookup(lookup(&[("CONCIERGE_STACK_NAME", "bistro")])).unwrap();
        assert_eq!(s.knowledge_bucket, "bistro-knowledge");
        assert_eq!(s.table_name, "bistro-bookings");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let s = ProvisionSettings::from_lookup(lookup(&[
            ("CONCIERGE_AGENT_NAME", "host"),
            ("CONCIERGE_IDLE_SESSION_TTL", "600"),
            ("CONCIERGE_TABLE_NAME", "reservations"),
            ("CONCIERGE_POST_TEMPERATURE", "0.3"),
            ("CONCIERGE_POST_STOP_SEQUENCES", "</answer>|\n\nHuman:"),
        ]))
        .unwrap();
        assert_eq!(s.agent_name, "host");
        assert_eq!(s.idle_session_ttl_secs, 600);
        assert_eq!(s.table_name, "reservations");
        assert!((s.inference.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(s.inference.stop_sequences, vec!["</answer>", "\n\nHuman:"]);
    }

    #[test]
    fn unparsable_number_names_the_variable() {
        let err = ProvisionSettings::from_lookup(lookup(&[("CONCIERGE_POST_TOP_K", "many")])).unwrap_err();
        assert_eq!(err.var, "CONCIERGE_POST_TOP_K");
        assert!(err.to_string().contains("many"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let err = ProvisionSettings::from_lookup(lookup(&[("CONCIERGE_POST_TEMPERATURE", "1.5")])).unwrap_err();
        assert_eq!(err.var, "CONCIERGE_POST_TEMPERATURE");
    }

    #[test]
    fn empty_stop_sequences_are_dropped() {
        let s = ProvisionSettings::from_lookup(lookup(&[(
            "CONCIERGE_POST_STOP_SEQUENCES",
            "</answer>||\n\nHuman:|",
        )]))
        .unwrap();
        assert_eq!(s.inference.stop_sequences, vec!["</answer>", "\n\nHuman:"]);
    }

    #[test]
    fn out_of_range_top_k_and_max_length_are_rejected() {
        let err = ProvisionSettings::from_lookup(lookup(&[("CONCIERGE_POST_TOP_K", "501")])).unwrap_err();
        assert_eq!(err.var, "CONCIERGE_POST_TOP_K");
        assert!(err.message.contains("between 0 and 500"), "{}", err);

        let err = ProvisionSettings::from_lookup(lookup(&[("CONCIERGE_POST_MAX_LENGTH", "0")])).unwrap_err();
        assert_eq!(err.var, "CONCIERGE_POST_MAX_LENGTH");

        let s = ProvisionSettings::from_lookup(lookup(&[
            ("CONCIERGE_POST_TOP_K", "500"),
            ("CONCIERGE_POST_MAX_LENGTH", "4096"),
        ]))
        .unwrap();
        assert_eq!((s.inference.top_k, s.inference.maximum_length), (500, 4096));
    }

    #[test]
    fn template_var_names_are_lowercased() {
        let vars = template_vars_from(vec![(
            "CONCIERGE_VAR_Restaurant_NAME".to_string(),
            "Ember".to_string(),
        )]);
        assert_eq!(vars.get("restaurant_name").map(String::as_str), Some("Ember"));
        assert!(vars.get("Restaurant_NAME").is_none());
    }

    #[test]
    fn collects_prefixed_template_vars() {
        let vars = template_vars_from(vec![
            ("CONCIERGE_VAR_RESTAURANT".to_string(), "Ember".to_string()),
            ("CONCIERGE_VAR_".to_string(), "ignored".to_string()),
            ("PATH".to_string(), "/bin".to_string()),
        ]);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("restaurant").map(String::as_str), Some("Ember"));
    }
}
