//! Helpers for the `concierge` binary: argument parsing, prompt inspection and JSON output.
//!
//! Kept in a library so the binary stays a thin dispatcher and these pieces are unit-tested.

use std::path::{Path, PathBuf};

use concierge::prompts::POST_PROCESSING_FILE;
use concierge::{Locale, Prompt};
use serde::Serialize;

/// Parses one `--var KEY=VALUE` argument. The key is trimmed and must be non-empty; the value
/// is kept as given and may itself contain `=`.
pub fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Output format for `prompt show`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowFormat {
    Yaml,
    Json,
}

impl ShowFormat {
    /// `yaml` or `json`, case-insensitive.
    pub fn from_arg(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("yaml") {
            Ok(ShowFormat::Yaml)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(ShowFormat::Json)
        } else {
            Err(format!("unknown output format `{}` (expected yaml or json)", s))
        }
    }
}

/// Path of prompt `name` in `dir`; `instruction` and `instruction.yaml` both work.
pub fn prompt_file_path(dir: &Path, name: &str) -> PathBuf {
    if name.ends_with(".yaml") || name.ends_with(".yml") {
        dir.join(name)
    } else {
        dir.join(format!("{}.yaml", name))
    }
}

/// What `prompt show` prints for one prompt.
#[derive(Debug, Serialize)]
pub struct PromptView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_variables: Vec<String>,
    /// Placeholders the template references, in first-appearance order.
    pub template_variables: Vec<String>,
    pub path: String,
}

impl From<&Prompt> for PromptView {
    fn from(p: &Prompt) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            input_variables: p.input_variables.clone().unwrap_or_default(),
            template_variables: p
                .template
                .as_ref()
                .map(|t| t.variables().to_vec())
                .unwrap_or_default(),
            path: p.path().display().to_string(),
        }
    }
}

/// Renders a view in the requested format (no trailing newline for JSON).
pub fn format_prompt_view(view: &PromptView, format: ShowFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ShowFormat::Json => serde_json::to_string_pretty(view)?,
        ShowFormat::Yaml => serde_yaml::to_string(view)?,
    })
}

/// One line of `concierge locales`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub locale: Locale,
    pub dir: PathBuf,
    pub present: bool,
    pub post_processing: bool,
}

impl LocaleEntry {
    /// `code<TAB>dir<TAB>status`, status being `missing`, `ok` or `ok+post-processing`.
    pub fn line(&self) -> String {
        let status = match (self.present, self.post_processing) {
            (false, _) => "missing",
            (true, false) => "ok",
            (true, true) => "ok+post-processing",
        };
        format!("{}\t{}\t{}", self.locale, self.dir.display(), status)
    }
}

/// Every supported locale with its directory under `root` and what is on disk.
pub fn locale_listing(root: &Path) -> Vec<LocaleEntry> {
    Locale::ALL
        .into_iter()
        .map(|locale| {
            let dir = locale.prompt_dir(root);
            LocaleEntry {
                locale,
                present: dir.is_dir(),
                post_processing: dir.join(POST_PROCESSING_FILE).is_file(),
                dir,
            }
        })
        .collect()
}

/// Writes JSON to stdout or to the given file. When pretty is true, multi-line; else one line.
pub fn write_json_output(
    value: &serde_json::Value,
    file: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match file {
        Some(path) => std::fs::write(path, format!("{}\n", s))?,
        None => {
            println!("{}", s);
            std::io::Write::flush(&mut std::io::stdout())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_splits_on_first_equals() {
        assert_eq!(
            parse_var("restaurant=Chez Rust").unwrap(),
            ("restaurant".to_string(), "Chez Rust".to_string())
        );
        assert_eq!(
            parse_var(" url = a=b").unwrap(),
            ("url".to_string(), " a=b".to_string())
        );
        assert_eq!(parse_var("empty=").unwrap(), ("empty".to_string(), String::new()));
    }

    #[test]
    fn parse_var_rejects_missing_equals_or_key() {
        assert!(parse_var("restaurant").unwrap_err().contains("KEY=VALUE"));
        assert!(parse_var("=value").unwrap_err().contains("empty key"));
    }

    #[test]
    fn show_format_is_case_insensitive() {
        assert_eq!(ShowFormat::from_arg("YAML").unwrap(), ShowFormat::Yaml);
        assert_eq!(ShowFormat::from_arg("json").unwrap(), ShowFormat::Json);
        assert!(ShowFormat::from_arg("toml").is_err());
    }

    #[test]
    fn prompt_file_path_appends_extension_once() {
        let dir = Path::new("prompts/en");
        assert_eq!(prompt_file_path(dir, "instruction"), dir.join("instruction.yaml"));
        assert_eq!(prompt_file_path(dir, "instruction.yaml"), dir.join("instruction.yaml"));
    }

    #[test]
    fn prompt_view_lists_template_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instruction.yaml");
        std::fs::write(
            &path,
            "name: instruction\ndescription: Helps guests.\ntemplate: \"{agent_name} serves {restaurant}, {{literal}}\"\ninput_variables: [agent_name]\n",
        )
        .unwrap();
        let prompt = concierge::load_prompt(&path).unwrap();
        let view = PromptView::from(&prompt);
        assert_eq!(view.name, "instruction");
        assert_eq!(view.input_variables, vec!["agent_name"]);
        assert_eq!(view.template_variables, vec!["agent_name", "restaurant"]);

        let json = format_prompt_view(&view, ShowFormat::Json).unwrap();
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["description"], "Helps guests.");
        let yaml = format_prompt_view(&view, ShowFormat::Yaml).unwrap();
        assert!(yaml.contains("template_variables:"));
    }

    #[test]
    fn locale_listing_reports_what_is_on_disk() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("en")).unwrap();
        std::fs::create_dir_all(root.path().join("ko")).unwrap();
        std::fs::write(root.path().join("ko").join(POST_PROCESSING_FILE), "system: x\n").unwrap();

        let lines: Vec<String> = locale_listing(root.path()).iter().map(|e| e.line()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("en\t") && lines[0].ends_with("\tok"));
        assert!(lines[1].starts_with("ko\t") && lines[1].ends_with("\tok+post-processing"));
        assert!(lines[2].starts_with("ja\t") && lines[2].ends_with("\tmissing"));
    }

    #[test]
    fn write_json_output_to_file_appends_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json_output(&serde_json::json!({"a": 1}), Some(&path), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}\n");
    }
}
