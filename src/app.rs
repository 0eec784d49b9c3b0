use std::process::ExitCode;

use clap::{error::ErrorKind, Parser};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::api::{self, Backend, HttpBackend, HttpOptions};
use crate::cli::args::{CliArgs, Command, StudentFields};
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::form::{FormError, StudentForm};
use crate::notify::{read_answer, Answer, ConsoleNotifier};
use crate::output::{self, OutputFormat};
use crate::session::{Session, DEACTIVATE_PROMPT};

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "boleto_client=info",
        2 => "boleto_client=debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Clone, Debug)]
struct RunConfig {
    base_url: String,
    timeout: u64,
    proxy: Option<String>,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    assume_yes: bool,
    command: Command,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| api::DEFAULT_BASE_URL.to_string());
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let output = args
        .output
        .map(|p| config::expand_tilde(&p).to_string_lossy().to_string());
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };
    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let assume_yes = cfg.assume_yes.unwrap_or(false);

    Ok(RunConfig {
        base_url,
        timeout,
        proxy,
        output,
        output_format,
        no_color,
        assume_yes,
        command: args.command,
    })
}

async fn emit(run: &RunConfig, content: &str) -> Result<(), String> {
    match run.output.as_deref() {
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .map_err(|e| format!("failed to create output file '{path}': {e}"))?;
            file.write_all(content.as_bytes())
                .await
                .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
            format_kv_line("Output", path);
            Ok(())
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}

// copies the flags that were given onto the form, leaving the rest untouched
fn apply_fields(form: &mut StudentForm, fields: &StudentFields) -> Result<(), FormError> {
    let pairs = [
        ("name", &fields.name),
        ("ra", &fields.code),
        ("email", &fields.email),
        ("fee", &fields.fee),
        ("active", &fields.active),
    ];
    for (field, value) in pairs {
        if let Some(value) = value {
            form.set_field(field, value)?;
        }
    }
    Ok(())
}

fn outcome(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run_async<B: Backend>(
    run: RunConfig,
    mut session: Session<B, ConsoleNotifier>,
) -> Result<ExitCode, String> {
    let format = run.output_format;
    match run.command.clone() {
        Command::List { search } => {
            if session.load().await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            let records = session.search(search.as_deref().unwrap_or_default());
            emit(&run, &output::render_students(&records, format)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { ra } => {
            if session.edit(&ra).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            let ctl = session.controller();
            emit(&run, &output::render_form(ctl.mode(), ctl.form())).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Create { fields } => {
            apply_fields(session.controller_mut().form_mut(), &fields)
                .map_err(|e| e.to_string())?;
            Ok(outcome(session.submit().await.is_ok()))
        }
        Command::Update { ra, fields } => {
            if session.edit(&ra).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
            apply_fields(session.controller_mut().form_mut(), &fields)
                .map_err(|e| e.to_string())?;
            Ok(outcome(session.submit().await.is_ok()))
        }
        Command::Deactivate { ra, yes } => {
            let confirmed = yes || run.assume_yes || {
                let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
                read_answer(DEACTIVATE_PROMPT, &mut lines).await
            };
            match session.deactivate(&ra, &Answer(confirmed)).await {
                Ok(crate::session::Deactivation::Done) => Ok(ExitCode::SUCCESS),
                Ok(crate::session::Deactivation::Cancelled) => {
                    format_kv_line("Cancelled", &ra);
                    Ok(ExitCode::SUCCESS)
                }
                Err(_) => Ok(ExitCode::FAILURE),
            }
        }
        Command::Notices => match session.notices().await {
            Ok(notices) => {
                emit(&run, &output::render_notices(&notices, format)).await?;
                Ok(ExitCode::SUCCESS)
            }
            Err(_) => Ok(ExitCode::FAILURE),
        },
        Command::Notice {
            student_id,
            amount,
            due_date,
        } => {
            let draft = session.draft_mut();
            draft.student_id = Some(student_id);
            draft.amount = amount;
            draft.due_date = due_date;
            draft.open = true;
            match session.submit_notice().await {
                Ok(created) => {
                    let listing = created.listing.unwrap_or_else(|| vec![created.notice]);
                    emit(&run, &output::render_notices(&listing, format)).await?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(_) => Ok(ExitCode::FAILURE),
            }
        }
        Command::Students => match session.student_choices().await {
            Ok(choices) => {
                let mut out = String::new();
                for (id, label) in choices {
                    out.push_str(&format!("{id:>6}  {label}\n"));
                }
                emit(&run, &out).await?;
                Ok(ExitCode::SUCCESS)
            }
            Err(_) => Ok(ExitCode::FAILURE),
        },
        Command::Shell => {
            format_kv_line("Server", &run.base_url);
            println!("type 'help' for commands\n");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            crate::shell::run(&mut session, stdin, format, run.assume_yes).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig => Ok(ExitCode::SUCCESS),
    }
}

fn init_config(path: Option<std::path::PathBuf>) -> Result<ExitCode, String> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or_else(|| "could not determine home directory for the config file".to_string())?;
    if config::ensure_default_config_file(&path)? {
        format_kv_line("Created", &path.display().to_string());
    } else {
        format_kv_line("Exists", &path.display().to_string());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_cli() -> Result<ExitCode, String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(ExitCode::SUCCESS);
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if matches!(args.command, Command::InitConfig) {
        return init_config(user_config_path);
    }
    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    if run.no_color {
        colored::control::set_override(false);
    }
    tracing::debug!(base_url = %run.base_url, timeout = run.timeout, "configuration resolved");

    let backend = HttpBackend::new(
        &run.base_url,
        &HttpOptions {
            timeout_seconds: run.timeout,
            proxy: run.proxy.clone(),
        },
    )
    .map_err(|e| e.to_string())?;
    let session = Session::new(backend, ConsoleNotifier);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run, session))
}
