//! Concierge CLI binary: assemble the booking-agent stack spec from localized prompts.
//!
//! Subcommands: `synth` (default), `prompt show`, `locales`.

mod logging;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cli::{
    format_prompt_view, locale_listing, parse_var, prompt_file_path, write_json_output,
    PromptView, ShowFormat,
};
use concierge::prompts::prompts_root;
use concierge::provision::provision;
use concierge::{
    assemble_locale, build_stack_summary, load_prompt, locale, ManifestProvisioner,
    ProvisionSettings, TemplateValues,
};

#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(about = "Concierge: assemble the booking-agent stack from localized prompts")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Prompt locale (en, ko, ja); default: CONCIERGE_LOCALE or en
    #[arg(short, long, global = true, env = "CONCIERGE_LOCALE", value_name = "CODE")]
    locale: Option<String>,

    /// Prompts root holding one directory per locale; default: CONCIERGE_PROMPTS_DIR or ./prompts
    #[arg(long, global = true, value_name = "DIR")]
    prompts_dir: Option<PathBuf>,

    /// Extra template variable (repeatable); wins over CONCIERGE_VAR_*
    #[arg(long = "var", global = true, value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Verbose: info-level logs and a per-section run summary on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Assemble the stack spec and print it as JSON (default)
    Synth(SynthArgs),
    /// Inspect prompt files of the selected locale
    Prompt(PromptArgs),
    /// List supported locales and their prompt directories
    Locales,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct SynthArgs {
    /// Pretty-print (multi-line). Default: compact, one line
    #[arg(long)]
    pretty: bool,

    /// Write output to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Write the manifest to DIR/<stack>.json and print the stack handle instead of the stack spec
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
struct PromptArgs {
    #[command(subcommand)]
    sub: PromptCommand,
}

#[derive(Subcommand, Debug, Clone)]
enum PromptCommand {
    /// Show one prompt (name, description, declared and referenced variables)
    Show(ShowPromptArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct ShowPromptArgs {
    /// Prompt file name without extension (e.g. instruction, knowledge_base)
    name: String,
    /// Output format: yaml (default) or json
    #[arg(long, value_name = "FORMAT", default_value = "yaml")]
    output: String,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

async fn run_synth(args: &Args, root: &Path, synth: &SynthArgs) -> CliResult {
    let settings = ProvisionSettings::try_from_env()?;
    let extra: TemplateValues = args.vars.iter().cloned().collect();
    let lang = args.locale.as_deref();

    let (spec, handle) = match &synth.out_dir {
        Some(dir) => {
            let provisioner = ManifestProvisioner::new(dir);
            let (spec, handle) = provision(&provisioner, root, lang, &settings, &extra).await?;
            (spec, Some(handle))
        }
        None => (assemble_locale(root, lang, &settings, &extra).await?, None),
    };

    if args.verbose {
        build_stack_summary(&spec).print_to_stderr();
    }
    let out = match handle {
        Some(h) => serde_json::json!({ "stackName": h.stack_name, "location": h.location }),
        None => serde_json::to_value(&spec)?,
    };
    write_json_output(&out, synth.file.as_deref(), synth.pretty)
}

fn show_prompt(args: &Args, root: &Path, show: &ShowPromptArgs) -> CliResult {
    let format = ShowFormat::from_arg(&show.output)?;
    let dir = locale::resolve(args.locale.as_deref())?.prompt_dir(root);
    let prompt = load_prompt(&prompt_file_path(&dir, &show.name))?;
    let text = format_prompt_view(&PromptView::from(&prompt), format)?;
    println!("{}", text.trim_end());
    Ok(())
}

fn list_locales(root: &Path) -> CliResult {
    for entry in locale_listing(root) {
        println!("{}", entry.line());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config::load_and_apply(config::APP_NAME, None) {
        eprintln!("concierge: {}", e);
        std::process::exit(1);
    }
    let args = Args::parse();
    logging::init(args.verbose)?;

    let root = prompts_root(args.prompts_dir.as_deref());
    let cmd = args
        .cmd
        .clone()
        .unwrap_or_else(|| Command::Synth(SynthArgs::default()));
    let result = match &cmd {
        Command::Synth(synth) => run_synth(&args, &root, synth).await,
        Command::Prompt(PromptArgs {
            sub: PromptCommand::Show(show),
        }) => show_prompt(&args, &root, show),
        Command::Locales => list_locales(&root),
    };
    if let Err(e) = result {
        eprintln!("concierge: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
