//! RFantibody job client
//!
//! Configure an RFantibody design job (framework and target structures,
//! hotspots, CDR loop ranges, RFdiffusion and ProteinMPNN settings) and submit
//! it to a remote pipeline service, interactively or from the command line.

mod api;
mod config;
mod job;
mod logging;
mod submission;
mod tui;

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;

use crate::api::{ArchiveScope, PipelineClient};
use crate::job::{build_payload, Attachment, FoldModel, JobForm, Mode};
use crate::submission::{present, Presentation, Rejection, SubmissionController, SubmitOutcome};

/// RFantibody job client - configure and submit antibody design jobs
#[derive(Parser)]
#[command(name = "rfantibody")]
#[command(version)]
#[command(about = "Configure and submit RFantibody design jobs to a pipeline service")]
struct Cli {
    /// Pipeline base URL (absolute, or a path joined onto the configured origin)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive job form (default)
    Tui,

    /// Submit one job and print the pipeline's response
    Submit {
        #[command(flatten)]
        job: JobArgs,

        /// Print only the raw JSON response
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show readiness and the request that would be sent, without sending it
    Check {
        #[command(flatten)]
        job: JobArgs,
    },

    /// Download the ZIP archive of a finished job
    Download {
        /// Job id reported by the pipeline
        #[arg(long)]
        job_id: String,

        /// Whole job directory or only its output
        #[arg(long, value_enum, default_value = "job")]
        scope: ScopeArg,

        /// Where to write the archive (default: <job-id>_<scope>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration and the resolved pipeline endpoint
    Config,
}

#[derive(Args, Debug, Clone)]
struct JobArgs {
    /// Job name (default: RFantibody_<UTC timestamp>)
    #[arg(long)]
    job_name: Option<String>,

    /// Design mode
    #[arg(long, value_enum, default_value = "antibody")]
    mode: ModeArg,

    /// Structure prediction model used for filtering
    #[arg(long, value_enum, default_value = "af3")]
    fold: FoldArg,

    /// Framework structure (PDB)
    #[arg(long)]
    framework: Option<PathBuf>,

    /// Target structure (PDB)
    #[arg(long)]
    target: Option<PathBuf>,

    /// Target hotspot residues, e.g. "A21,B14-21" (default: none)
    #[arg(long)]
    hotspots: Option<String>,

    /// CDR loops and length ranges (default: H1:7,H2:6,H3:5-13)
    #[arg(long)]
    design_loops: Option<String>,

    /// RFdiffusion backbone designs
    #[arg(long, default_value = "1")]
    designs: String,

    /// RFdiffusion final step
    #[arg(long, default_value = "48")]
    final_step: String,

    /// Run RFdiffusion deterministically
    #[arg(long, default_value_t = false)]
    deterministic: bool,

    /// RFdiffusion diffuser T
    #[arg(long, default_value = "50")]
    diffuser_t: String,

    /// ProteinMPNN sequences per backbone
    #[arg(long, default_value = "1")]
    mpnn_designs: String,
}

impl JobArgs {
    fn into_form(self) -> Result<JobForm> {
        let mut form = JobForm::new();
        if let Some(name) = self.job_name {
            form.set_job_name(name);
        }
        form.set_mode(self.mode.into());
        form.set_fold(self.fold.into());
        if let Some(path) = &self.framework {
            form.select_framework_file(Some(load_structure(path, "framework")?));
        }
        if let Some(path) = &self.target {
            form.select_target_file(Some(load_structure(path, "target")?));
        }
        if let Some(hotspots) = self.hotspots {
            form.hotspots_mut().set(hotspots);
        }
        if let Some(loops) = self.design_loops {
            form.design_loops_mut().set(loops);
        }
        form.set_rf_diffusion_designs(self.designs);
        form.set_rf_diffusion_final_step(self.final_step);
        form.set_rf_diffusion_deterministic(self.deterministic);
        form.set_rf_diffusion_diffuser_t(self.diffuser_t);
        form.set_protein_mpnn_designs(self.mpnn_designs);
        Ok(form)
    }
}

fn load_structure(path: &Path, what: &str) -> Result<Attachment> {
    Attachment::from_path(path).with_context(|| format!("Could not load {what} structure"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Antibody,
    Nanobody,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Antibody => Mode::Antibody,
            ModeArg::Nanobody => Mode::Nanobody,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FoldArg {
    Af3,
    Rf2,
}

impl From<FoldArg> for FoldModel {
    fn from(value: FoldArg) -> Self {
        match value {
            FoldArg::Af3 => FoldModel::Af3,
            FoldArg::Rf2 => FoldModel::Rf2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Job,
    Output,
}

impl From<ScopeArg> for ArchiveScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Job => ArchiveScope::Job,
            ScopeArg::Output => ArchiveScope::Output,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let api_base = cli.api_base.as_deref();

    match cli.command {
        Some(Commands::Tui) | None => run_tui(api_base)?,
        Some(Commands::Submit { job, json }) => {
            logging::init_stderr();
            run_submit(api_base, job.into_form()?, json)?;
        }
        Some(Commands::Check { job }) => {
            logging::init_stderr();
            run_check(api_base, &job.into_form()?)?;
        }
        Some(Commands::Download {
            job_id,
            scope,
            output,
        }) => {
            logging::init_stderr();
            run_download(api_base, &job_id, scope.into(), output)?;
        }
        Some(Commands::Config) => {
            logging::init_stderr();
            show_config_info(api_base)?;
        }
    }

    Ok(())
}

fn pipeline_client(api_base: Option<&str>) -> Result<PipelineClient> {
    let cfg = config::Config::load()?;
    Ok(PipelineClient::from_config(&cfg.api, api_base)?)
}

fn run_tui(api_base: Option<&str>) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        println!(
            "{}",
            "The terminal UI requires an interactive TTY. Use `rfantibody submit` for scripted runs."
                .bright_yellow()
        );
        return Ok(());
    }

    if let Err(err) = logging::init_file() {
        eprintln!("{} {}", "Logging disabled:".bright_yellow(), err);
    }

    let controller = Arc::new(SubmissionController::new(pipeline_client(api_base)?));
    let rt = tokio::runtime::Runtime::new()?;

    match tui::run_tui(&rt, controller)? {
        tui::TuiExit::Quit => {}
    }
    Ok(())
}

fn print_readiness(form: &JobForm) -> bool {
    let missing = form.missing_fields();
    if missing.is_empty() {
        println!("{} {}", "Ready:".bright_cyan(), "all required inputs present".bright_green());
    } else {
        println!("{}", "Missing inputs:".bright_red().bold());
        for field in &missing {
            println!("  {} {}", "✕".bright_red(), field.label());
        }
    }

    for advisory in form.advisories() {
        println!("  {} {}", "!".bright_yellow(), advisory.bright_yellow());
    }
    missing.is_empty()
}

fn run_submit(api_base: Option<&str>, form: JobForm, json: bool) -> Result<()> {
    let controller = SubmissionController::new(pipeline_client(api_base)?);
    let base = controller.client().base().clone();

    if !json {
        println!("{}", "RFantibody job submission\n".bright_cyan().bold());
        println!(
            "{} {}",
            "Endpoint:".bright_yellow(),
            base.pipeline_url().bright_white()
        );
        print_readiness(&form);
        println!();
    }

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(controller.submit(form.snapshot()));

    let state = match outcome {
        SubmitOutcome::Rejected(Rejection::Incomplete(missing)) => {
            let labels: Vec<&str> = missing.iter().map(|field| field.label()).collect();
            bail!("Job is not ready to submit (missing: {})", labels.join(", "));
        }
        SubmitOutcome::Rejected(Rejection::AlreadyPending) => {
            bail!("A submission is already in progress");
        }
        SubmitOutcome::Completed(state) => state,
    };

    match present(&state, &base) {
        Some(Presentation::Result(view)) => {
            if json {
                println!("{}", view.pretty);
                return Ok(());
            }

            let summary = if view.pipeline_error.is_some() {
                view.summary.bright_red().bold()
            } else {
                view.summary.bright_green().bold()
            };
            println!("{summary}");

            if let Some(failure) = &view.pipeline_error {
                if let Some(stage) = &failure.stage {
                    println!("  {} {}", "Failed stage:".bright_red(), stage);
                }
                if let Some(log_tail) = &failure.log_tail {
                    println!("  {}", "Log tail:".bright_red());
                    for line in log_tail.lines() {
                        println!("    {}", line.bright_black());
                    }
                }
            }

            for link in &view.downloads {
                println!(
                    "  {} {}",
                    format!("{}:", link.label).bright_cyan(),
                    link.url.bright_white().underline()
                );
            }

            println!("\n{}", "Response:".bright_white().bold());
            println!("{}", view.pretty);
            Ok(())
        }
        Some(Presentation::Error(view)) => {
            eprintln!("{}", view.line.bright_red());
            bail!("Submission failed");
        }
        None => bail!("Submission did not finish"),
    }
}

fn run_check(api_base: Option<&str>, form: &JobForm) -> Result<()> {
    let client = pipeline_client(api_base)?;

    println!("{}", "RFantibody job check\n".bright_cyan().bold());
    println!(
        "{} {}",
        "Endpoint:".bright_yellow(),
        client.base().pipeline_url().bright_white()
    );
    let ready = print_readiness(form);

    println!("\n{}", "Request preview:".bright_white().bold());
    match build_payload(form, &form.effective_job_name()) {
        Ok(payload) => {
            for part in payload.parts() {
                let value = match &part.value {
                    job::payload::PartValue::Text(text) if text.is_empty() => {
                        "(empty)".bright_black().to_string()
                    }
                    job::payload::PartValue::Text(text) => text.clone(),
                    job::payload::PartValue::File(file) => {
                        format!("{} ({} bytes)", file.file_name(), file.len())
                    }
                };
                println!("  {} {}", format!("{:<26}", part.name).bright_cyan(), value);
            }
        }
        Err(err) => println!("  {} {}", "Cannot build request:".bright_red(), err),
    }

    if !ready {
        println!(
            "\n{}",
            "Not ready: provide the missing inputs before submitting.".bright_yellow()
        );
    }
    Ok(())
}

fn run_download(
    api_base: Option<&str>,
    job_id: &str,
    scope: ArchiveScope,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = pipeline_client(api_base)?;
    let rt = tokio::runtime::Runtime::new()?;

    let bytes = rt.block_on(client.download_archive(job_id, scope))?;
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!("{}_{}.zip", job_id.trim(), scope.as_api_value()))
    });
    fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write archive to {}", path.display()))?;

    println!(
        "{} {} ({} bytes)",
        "Saved".bright_green(),
        path.display().to_string().bright_white(),
        bytes.len()
    );
    Ok(())
}

fn show_config_info(api_base: Option<&str>) -> Result<()> {
    println!("{}", "RFantibody client configuration\n".bright_cyan().bold());

    match config::get_config_path() {
        Ok(path) => {
            println!("{} {}", "Config file:".bright_yellow(), path.bright_white());
            if Path::new(&path).exists() {
                println!("  {} {}", "Status:".bright_cyan(), "Exists".bright_green());
            } else {
                println!(
                    "  {} {}",
                    "Status:".bright_cyan(),
                    "Not created yet (will use defaults)".bright_yellow()
                );
            }
        }
        Err(e) => {
            println!(
                "{} Could not determine config path: {}",
                "Error:".bright_red(),
                e
            );
        }
    }

    let cfg = config::Config::load().unwrap_or_default();
    if let Err(err) = config::init_config() {
        println!(
            "  {} {}",
            "Note:".bright_yellow(),
            format!("Could not create config file yet: {err}").bright_black()
        );
    }

    println!("\n{}", "API settings:".bright_white().bold());
    println!("  {} {}", "Base URL:".bright_cyan(), cfg.api.base_url.bright_white());
    println!("  {} {}", "Origin:".bright_cyan(), cfg.api.origin.bright_white());
    println!(
        "  {} {}",
        "Verify SSL:".bright_cyan(),
        if cfg.api.verify_ssl {
            "true".bright_green()
        } else {
            "false".bright_yellow()
        }
    );

    match cfg.api.resolve_base(api_base) {
        Ok(base) => println!(
            "  {} {}",
            "Pipeline endpoint:".bright_cyan(),
            base.pipeline_url().bright_white()
        ),
        Err(err) => println!("  {} {}", "Pipeline endpoint:".bright_cyan(), err.to_string().bright_red()),
    }

    if let Ok(path) = logging::log_file_path() {
        println!(
            "\n{} {}",
            "TUI log file:".bright_yellow(),
            path.display().to_string().bright_white()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, FoldArg, ModeArg};
    use crate::job::{FoldModel, Mode};
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["rfantibody"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn submit_flags_build_form() {
        let mut framework = NamedTempFile::new().unwrap();
        framework.write_all(b"FRAMEWORK").unwrap();
        let mut target = NamedTempFile::new().unwrap();
        target.write_all(b"TARGET").unwrap();

        let cli = Cli::try_parse_from([
            "rfantibody",
            "submit",
            "--job-name",
            "rsv_site3",
            "--mode",
            "nanobody",
            "--fold",
            "rf2",
            "--framework",
            framework.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
            "--hotspots",
            "A21,B14-21",
            "--designs",
            "4",
            "--deterministic",
            "--json",
        ])
        .unwrap();

        let Some(Commands::Submit { job, json }) = cli.command else {
            panic!("expected submit");
        };
        assert!(json);
        assert_eq!(job.mode, ModeArg::Nanobody);
        assert_eq!(job.fold, FoldArg::Rf2);

        let form = job.into_form().unwrap();
        assert_eq!(form.job_name(), "rsv_site3");
        assert_eq!(form.mode(), Mode::Nanobody);
        assert_eq!(form.fold(), FoldModel::Rf2);
        assert_eq!(form.hotspots().effective_value(), "A21,B14-21");
        assert_eq!(form.design_loops().effective_value(), "H1:7,H2:6,H3:5-13");
        assert_eq!(form.rf_diffusion_designs(), "4");
        assert!(form.rf_diffusion_deterministic());
        assert_eq!(form.framework_file().map(|f| f.len()), Some(9));
        assert!(form.is_submittable());
    }

    #[test]
    fn check_defaults_leave_files_missing() {
        let cli = Cli::try_parse_from(["rfantibody", "check"]).unwrap();
        let Some(Commands::Check { job }) = cli.command else {
            panic!("expected check");
        };
        let form = job.into_form().unwrap();
        assert_eq!(form.rf_diffusion_final_step(), "48");
        assert_eq!(form.rf_diffusion_diffuser_t(), "50");
        assert_eq!(form.protein_mpnn_designs(), "1");
        assert!(form.hotspots().is_placeholder());
        assert!(!form.is_submittable());
    }

    #[test]
    fn unreadable_structure_is_an_error() {
        let cli = Cli::try_parse_from([
            "rfantibody",
            "check",
            "--framework",
            "/definitely/not/here.pdb",
        ])
        .unwrap();
        let Some(Commands::Check { job }) = cli.command else {
            panic!("expected check");
        };
        let err = job.into_form().unwrap_err();
        assert!(err.to_string().contains("framework"));
    }

    #[test]
    fn api_base_is_global() {
        let cli =
            Cli::try_parse_from(["rfantibody", "config", "--api-base", "https://lab.example.org/api"])
                .unwrap();
        assert_eq!(cli.api_base.as_deref(), Some("https://lab.example.org/api"));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["rfantibody", "check", "--mode", "scfv"]).is_err());
    }
}
