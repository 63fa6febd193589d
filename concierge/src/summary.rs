//! Section-by-section summary of an assembled stack, for verbose output.
//!
//! [`ConfigSection`] is one labelled block of key-value pairs; [`StackSummary`] holds the
//! sections in order and prints them one line each (e.g. to stderr when `--verbose`).

use std::io::Write;

use crate::provision::StackSpec;

/// One block of the summary (agent, action group, knowledge base, table).
pub trait ConfigSection: Send + Sync {
    /// Section label, e.g. `"Agent"`.
    fn section_name(&self) -> &str;
    /// Key-value pairs. No prompt bodies, only their sizes.
    fn entries(&self) -> Vec<(&'static str, String)>;
    /// `[section_name] k1=v1 k2=v2 ...`
    fn line(&self) -> String {
        let entries: Vec<String> = self
            .entries()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("[{}] {}", self.section_name(), entries.join(" "))
    }
}

/// A section with a fixed label and precomputed entries.
pub struct Section {
    name: &'static str,
    entries: Vec<(&'static str, String)>,
}

impl ConfigSection for Section {
    fn section_name(&self) -> &str {
        self.name
    }

    fn entries(&self) -> Vec<(&'static str, String)> {
        self.entries.clone()
    }
}

/// Ordered list of sections.
#[derive(Default)]
pub struct StackSummary {
    sections: Vec<Box<dyn ConfigSection>>,
}

impl StackSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section and returns `self` for chaining.
    pub fn with_section(mut self, s: Box<dyn ConfigSection>) -> Self {
        self.sections.push(s);
        self
    }

    pub fn sections(&self) -> &[Box<dyn ConfigSection>] {
        &self.sections
    }

    /// One line per section.
    pub fn lines(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.line()).collect()
    }

    /// Prints every section to stderr. Best-effort: write errors are ignored.
    pub fn print_to_stderr(&self) {
        let mut err = std::io::stderr().lock();
        for line in self.lines() {
            let _ = writeln!(err, "{}", line);
        }
        let _ = err.flush();
    }
}

/// Builds the summary of `spec`: Agent, Action group, Knowledge base, Table.
pub fn build_stack_summary(spec: &StackSpec) -> StackSummary {
    let agent = &spec.agent;
    let mut summary = StackSummary::new().with_section(Box::new(Section {
        name: "Agent",
        entries: vec![
            ("name", agent.agent_name.clone()),
            ("locale", spec.locale.to_string()),
            ("model", agent.foundation_model.clone()),
            ("instruction_chars", agent.instruction.chars().count().to_string()),
            (
                "post_processing_override",
                agent.prompt_override_configuration.is_some().to_string(),
            ),
        ],
    }));
    for group in &agent.action_groups {
        summary = summary.with_section(Box::new(Section {
            name: "Action group",
            entries: vec![
                ("name", group.action_group_name.clone()),
                ("executor", group.action_group_executor.lambda.clone()),
                ("functions", group.function_schema.functions.len().to_string()),
            ],
        }));
    }
    let kb = &spec.knowledge_base;
    let chunking = kb
        .data_source
        .chunking_configuration
        .fixed_size_chunking_configuration
        .as_ref()
        .map(|c| format!("{}tok/{}%", c.max_tokens, c.overlap_percentage))
        .unwrap_or_else(|| "none".to_string());
    summary
        .with_section(Box::new(Section {
            name: "Knowledge base",
            entries: vec![
                ("name", kb.name.clone()),
                ("bucket", kb.data_source.bucket_name.clone()),
                ("embeddings", kb.embeddings_model.clone()),
                ("chunking", chunking),
            ],
        }))
        .with_section(Box::new(Section {
            name: "Table",
            entries: vec![
                ("name", spec.booking_table.table_name.clone()),
                ("partition_key", spec.booking_table.partition_key.name.clone()),
            ],
        }))
}
