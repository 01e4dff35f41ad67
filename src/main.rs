use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use iron_gate::{
    summarize, BloodGroup, CandidateScreener, CompatibilityEvaluator, FileDiscovery, Genotype,
    MatchRequest, MatchResponse, ParsedProfile, PartnerRole, ProfileParser, ProfileRecord,
    ReportFormat, ReportGenerator, ReportScanner, RiskLevel,
};

/// Genotype and rhesus compatibility screening
#[derive(Parser, Debug)]
#[command(
    name = "iron-gate",
    version,
    about = "Traffic-light genetic compatibility checks for prospective partners",
    long_about = r#"
Compares two partners' hemoglobin genotype and rhesus factor:
- both partners carry a non-AA genotype  -> danger (sickle cell disease risk)
- rhesus-negative mother, positive father -> caution
- otherwise                               -> safe

Profiles can be given inline, as JSON/TOML files, or as plain-text lab reports.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Interactive mode: prompt for both partners and run a single check
    #[arg(short, long, global = true)]
    interactive: bool,

    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check one couple
    Check(CheckArgs),
    /// Screen one profile against many candidate profiles
    Screen(ScreenArgs),
    /// Extract genotype and blood group from a plain-text lab report
    Scan {
        #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Print the extracted profile as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recognised genotypes and blood groups
    Genotypes,
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Male (paternal) profile file
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    male: Option<PathBuf>,

    /// Female (maternal) profile file
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    female: Option<PathBuf>,

    /// Male genotype, overrides the file
    #[arg(long, value_name = "GENOTYPE")]
    male_genotype: Option<Genotype>,

    /// Male rhesus factor, e.g. "A POS", overrides the file
    #[arg(long, value_name = "RHESUS")]
    male_rhesus: Option<String>,

    /// Female genotype, overrides the file
    #[arg(long, value_name = "GENOTYPE")]
    female_genotype: Option<Genotype>,

    /// Female rhesus factor, e.g. "O NEG", overrides the file
    #[arg(long, value_name = "RHESUS")]
    female_rhesus: Option<String>,

    /// JSON request document with male_profile and female_profile
    #[arg(
        long,
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        conflicts_with_all = ["male", "female", "male_genotype", "male_rhesus", "female_genotype", "female_rhesus"]
    )]
    request: Option<PathBuf>,

    /// Print the response as JSON (implied by --request)
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ScreenArgs {
    /// Profile of the person being screened
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    profile: PathBuf,

    /// Role of the screened person; candidates take the other role
    #[arg(long, value_enum)]
    role: PartnerRole,

    /// Candidate files or directories
    #[arg(short, long, value_name = "PATHS", num_args = 1.., required = true, value_hint = ValueHint::AnyPath)]
    candidates: Vec<PathBuf>,

    /// Recursively search directories
    #[arg(short, long)]
    recursive: bool,

    /// Number of threads (0 = auto)
    #[arg(short, long, default_value = "0", env = "IRON_GATE_THREADS")]
    threads: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    format: OutputFormat,

    /// Output directory for reports
    #[arg(short, long, default_value = "./reports", env = "IRON_GATE_OUTPUT")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Html,
    Csv,
    Json,
    Tsv,
    All,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> ReportFormat {
        match format {
            OutputFormat::Html => ReportFormat::Html,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Tsv => ReportFormat::Tsv,
            OutputFormat::All => ReportFormat::All,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.interactive {
        let request = run_interactive_mode()?;
        let response = CompatibilityEvaluator::new().evaluate_request(&request);
        print_verdict(&response);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Check(args)) => run_check(args),
        Some(Commands::Screen(args)) => run_screen(AppConfig::from_args(args)),
        Some(Commands::Scan { file, json }) => run_scan(&file, json),
        Some(Commands::Genotypes) => {
            list_vocabulary();
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
        None => Ok(()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("iron_gate={}", level))
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    let num_threads = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn list_vocabulary() {
    println!("{}", style("Genotypes:").bold().cyan());
    for genotype in Genotype::ALL {
        println!(
            "  {} - {}",
            style(genotype).green().bold(),
            style(genotype.description()).dim()
        );
    }

    println!();
    println!("{}", style("Blood groups:").bold().cyan());
    let labels: Vec<&str> = BloodGroup::ALL.iter().map(|bg| bg.label()).collect();
    println!("  {}", labels.join("  "));
    println!();
    println!(
        "{}",
        style("Rhesus factors are free text: \"NEG\" or a trailing '-' marks negative, \"POS\" or a trailing '+' marks positive.").dim()
    );
}

fn load_record(path: Option<&Path>) -> Result<ProfileRecord> {
    match path {
        Some(path) => {
            let parsed = ProfileParser::new()
                .parse(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?;
            Ok(parsed.record)
        }
        None => Ok(ProfileRecord::default()),
    }
}

fn apply_overrides(
    mut record: ProfileRecord,
    genotype: Option<Genotype>,
    rhesus: Option<String>,
) -> ProfileRecord {
    if genotype.is_some() {
        record.genotype = genotype;
    }
    if rhesus.is_some() {
        record.rhesus_factor = rhesus;
    }
    record
}

fn run_check(args: CheckArgs) -> Result<()> {
    let request = match &args.request {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read request {}", path.display()))?;
            serde_json::from_str::<MatchRequest>(&content)
                .with_context(|| format!("Malformed request {}", path.display()))?
        }
        None => MatchRequest {
            male_profile: apply_overrides(
                load_record(args.male.as_deref())?,
                args.male_genotype,
                args.male_rhesus,
            ),
            female_profile: apply_overrides(
                load_record(args.female.as_deref())?,
                args.female_genotype,
                args.female_rhesus,
            ),
        },
    };

    let response = CompatibilityEvaluator::new().evaluate_request(&request);
    info!("Verdict: {}", response.status);

    // A request document always gets the response document back
    if args.json || args.request.is_some() {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_verdict(&response);
    }

    Ok(())
}

fn print_verdict(response: &MatchResponse) {
    let light = match response.status {
        RiskLevel::Green => style("● SAFE").green().bold(),
        RiskLevel::Amber => style("● CAUTION").yellow().bold(),
        RiskLevel::Red => style("● DANGER").red().bold(),
    };

    println!("{}", light);
    if response.messages.is_empty() {
        println!("  {}", style("No findings: genotype and rhesus data incomplete.").dim());
    }
    for message in &response.messages {
        println!("  - {}", message);
    }
    println!(
        "  Photos: {}",
        if response.can_unblur_photos {
            style("may be unblurred").green()
        } else {
            style("stay blurred").red()
        }
    );
}

fn run_scan(path: &Path, json: bool) -> Result<()> {
    let scanned = ReportScanner::new()
        .scan_file(path)
        .with_context(|| format!("Failed to scan {}", path.display()))?;

    if json {
        let record = scanned.into_record(None);
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let show = |value: Option<String>| value.unwrap_or_else(|| "not found".to_string());
    println!("Genotype:    {}", show(scanned.genotype.map(|g| g.to_string())));
    println!("Blood group: {}", show(scanned.blood_group.map(|bg| bg.to_string())));
    Ok(())
}

fn run_interactive_mode() -> Result<MatchRequest> {
    println!(
        "{}",
        style("╔══════════════════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        Iron Gate Compatibility Check - Interactive Mode      ║")
            .cyan()
            .bold()
    );
    println!(
        "{}",
        style("╚══════════════════════════════════════════════════════════════╝").cyan()
    );
    println!();

    let theme = ColorfulTheme::default();

    let prompt_partner = |label: &str| -> Result<ProfileRecord> {
        let mut genotypes = vec!["Unknown".to_string()];
        genotypes.extend(Genotype::ALL.iter().map(|g| g.to_string()));

        let genotype_idx = Select::with_theme(&theme)
            .with_prompt(format!("{} genotype", label))
            .default(0)
            .items(&genotypes)
            .interact()?;

        let genotype = genotype_idx
            .checked_sub(1)
            .and_then(|idx| Genotype::ALL.get(idx).copied());

        let rhesus: String = Input::with_theme(&theme)
            .with_prompt(format!("{} rhesus factor (e.g. O POS, A-; empty if unknown)", label))
            .allow_empty(true)
            .interact_text()?;

        Ok(ProfileRecord {
            genotype,
            rhesus_factor: Some(rhesus).filter(|rh| !rh.trim().is_empty()),
            ..Default::default()
        })
    };

    let male_profile = prompt_partner("Male")?;
    let female_profile = prompt_partner("Female")?;

    Ok(MatchRequest {
        male_profile,
        female_profile,
    })
}

fn run_screen(config: AppConfig) -> Result<()> {
    init_thread_pool(config.threads)?;

    info!("Starting compatibility screening...");
    info!("Using {} threads", rayon::current_num_threads());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Loading subject profile...");
    let parser = ProfileParser::new();
    let subject = parser
        .parse(&config.profile)
        .with_context(|| format!("Failed to load profile {}", config.profile.display()))?;
    pb.set_position(10);

    pb.set_message("Discovering candidate profiles...");
    let discovery = FileDiscovery::new(config.recursive);
    let subject_path = config.profile.canonicalize().ok();
    let files: Vec<PathBuf> = discovery
        .discover(&config.candidates)?
        .into_iter()
        .filter(|path| path.canonicalize().ok() != subject_path)
        .collect();
    pb.set_position(30);

    info!("Found {} candidate files", files.len());

    pb.set_message("Parsing candidate profiles...");
    let candidates: Vec<ParsedProfile> = files
        .par_iter()
        .filter_map(|path| match parser.parse(path) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    pb.set_position(60);

    pb.set_message("Evaluating candidates...");
    let screener = CandidateScreener::new(subject.record.to_profile(), config.role);
    let results = screener.screen(&candidates);
    pb.set_position(80);

    pb.set_message("Generating reports...");
    let generator = ReportGenerator::new(&config.output)?;
    generator.generate(&results, config.format.into())?;
    pb.set_position(100);

    pb.finish_with_message("Screening complete!");

    let counts = summarize(&results);
    println!(
        "\n{} screened against {} candidates: {} safe, {} caution, {} danger",
        style(&subject.candidate_id).bold(),
        results.len(),
        style(counts[&RiskLevel::Green]).green(),
        style(counts[&RiskLevel::Amber]).yellow(),
        style(counts[&RiskLevel::Red]).red()
    );
    println!(
        "{} Reports saved to: {}",
        style("✓").green().bold(),
        style(config.output.display()).cyan()
    );

    Ok(())
}

#[derive(Debug)]
struct AppConfig {
    profile: PathBuf,
    role: PartnerRole,
    candidates: Vec<PathBuf>,
    recursive: bool,
    threads: usize,
    format: OutputFormat,
    output: PathBuf,
}

impl AppConfig {
    fn from_args(args: ScreenArgs) -> Self {
        Self {
            profile: args.profile,
            role: args.role,
            candidates: args.candidates,
            recursive: args.recursive,
            threads: args.threads,
            format: args.format,
            output: args.output,
        }
    }
}
