use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::model::Collection;
use crate::output::{self, OutputFormat};
use crate::page::{Document, FilterButton, Selectors, StaticPage};
use crate::render::RenderOptions;
use crate::runner::{CollectionState, HttpOptions, PortfolioConfig, Runner, SourceConfig};
use crate::source::{Backend, Endpoints};

fn format_kv_line(label: &str, value: &str) -> String {
    format!(":: {:<10}: {}", label, value)
}

fn flag_list(arg: &clap::Arg) -> String {
    let mut flags: Vec<String> = Vec::new();
    if let Some(short) = arg.get_short() {
        flags.push(format!("-{short}"));
    }
    flags.extend(arg.get_long().map(|long| format!("--{long}")));
    for alias in arg.get_visible_aliases().unwrap_or_default() {
        flags.push(format!("--{alias}"));
    }
    let mut out = flags.join(", ");
    if arg.get_action().takes_values() {
        let value = arg
            .get_value_names()
            .and_then(|names| names.first())
            .map(|name| name.as_str())
            .unwrap_or("VALUE");
        out.push_str(&format!(" <{value}>"));
    }
    out
}

/// Options grouped under their help headings, in declaration order, with
/// the usage examples last.
fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = format!(
        "{} {}\n{}\n\nUsage: {} [OPTIONS]\n",
        cmd.get_name(),
        cmd.get_version().unwrap_or_default(),
        cmd.get_about().map(|a| a.to_string()).unwrap_or_default(),
        cmd.get_name(),
    );

    let args: Vec<&clap::Arg> = cmd.get_arguments().filter(|a| !a.is_hide_set()).collect();
    let mut headings: Vec<&str> = Vec::new();
    for arg in &args {
        let heading = arg.get_help_heading().unwrap_or("Options");
        if !headings.contains(&heading) {
            headings.push(heading);
        }
    }
    for heading in headings {
        out.push_str(&format!("\n{heading}:\n"));
        for arg in args
            .iter()
            .filter(|a| a.get_help_heading().unwrap_or("Options") == heading)
        {
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            out.push_str(&format!("  {:<42} {}\n", flag_list(arg), help.trim()));
        }
    }

    if let Some(long_about) = cmd.get_long_about() {
        let text = long_about.to_string();
        if let Some(examples) = text.find("Examples:") {
            out.push('\n');
            out.push_str(text[examples..].trim_end());
            out.push('\n');
        }
    }
    out
}

fn pick(cli: Option<String>, file: Option<String>) -> Option<String> {
    cli.or(file).filter(|v| !v.trim().is_empty())
}

#[derive(Clone, Debug)]
struct RunConfig {
    portfolio: PortfolioConfig,
    filters: Option<Vec<FilterButton>>,
    output: Option<String>,
    output_format: OutputFormat,
    title: String,
    no_color: bool,
    verbose: u8,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let backend_raw = pick(args.backend, cfg.backend).unwrap_or_else(|| "static".to_string());
    let backend = Backend::parse(&backend_raw)
        .ok_or_else(|| format!("invalid backend '{backend_raw}', expected static or documents"))?;

    let defaults = match backend {
        Backend::Static => Endpoints::static_defaults(),
        Backend::Documents => Endpoints::document_defaults(),
    };
    let endpoints = Endpoints {
        projects: pick(args.projects, cfg.projects_endpoint).unwrap_or(defaults.projects),
        certificates: pick(args.certificates, cfg.certificates_endpoint)
            .unwrap_or(defaults.certificates),
    };

    let source = match backend {
        Backend::Static => SourceConfig::Static {
            base: pick(args.base, cfg.base).unwrap_or_else(|| ".".to_string()),
            endpoints,
        },
        Backend::Documents => SourceConfig::Documents {
            store_url: pick(args.store_url, cfg.store_url).unwrap_or_default(),
            paths: endpoints,
            token: pick(args.store_token, cfg.store_token),
        },
    };

    let http = HttpOptions {
        timeout_seconds: args.timeout.or(cfg.timeout).unwrap_or(10),
        proxy: pick(args.proxy, cfg.proxy),
    };

    let stock = Selectors::default();
    let selectors = Selectors {
        projects: cfg.projects_selector.unwrap_or(stock.projects),
        certificates: cfg.certificates_selector.unwrap_or(stock.certificates),
        grid: cfg.grid_selector.unwrap_or(stock.grid),
        filter_buttons: cfg.filter_buttons_selector.unwrap_or(stock.filter_buttons),
        projects_error: cfg.projects_error_selector,
        certificates_error: cfg.certificates_error_selector,
    };

    let stock = RenderOptions::default();
    let size = |name: &str, value: Option<String>, fallback: String| match value {
        Some(raw) => crate::utils::parse_css_size(&raw)
            .map_err(|e| format!("invalid {name} '{raw}': {e}")),
        None => Ok(fallback),
    };
    let default_category_raw =
        pick(args.default_category, cfg.default_category).unwrap_or(stock.default_category);
    let default_category = crate::utils::class_token(&default_category_raw)
        .ok_or_else(|| format!("invalid default category '{default_category_raw}'"))?;
    let render = RenderOptions {
        project_item_classes: cfg.project_item_classes.unwrap_or(stock.project_item_classes),
        certificate_item_classes: cfg
            .certificate_item_classes
            .unwrap_or(stock.certificate_item_classes),
        project_image_height: size(
            "project_image_height",
            cfg.project_image_height,
            stock.project_image_height,
        )?,
        certificate_image_height: size(
            "certificate_image_height",
            cfg.certificate_image_height,
            stock.certificate_image_height,
        )?,
        default_category,
    };

    let filters = if !args.filter.is_empty() {
        let mut buttons = Vec::with_capacity(args.filter.len());
        for raw in &args.filter {
            let (label, filter) = crate::utils::parse_label_value(raw)
                .map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
            buttons.push(FilterButton::new(&label, &filter));
        }
        Some(buttons)
    } else {
        cfg.filters.map(|entries| {
            entries
                .iter()
                .map(|e| FilterButton::new(&e.label, &e.filter))
                .collect()
        })
    };
    let filters = filters.filter(|b: &Vec<FilterButton>| !b.is_empty()).map(|mut b| {
        b[0].active = true;
        b
    });

    let output = pick(args.output, cfg.output).map(|p| config::expand_tilde_string(&p));
    let output_format_raw = pick(args.output_format, cfg.output_format);
    let output_format = match output_format_raw.as_deref() {
        Some(raw) => OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected html or json"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Html),
    };

    let title = pick(args.title, cfg.title).unwrap_or_else(|| "Portfolio".to_string());

    Ok(RunConfig {
        portfolio: PortfolioConfig {
            source,
            http,
            selectors,
            render,
        },
        filters,
        output,
        output_format,
        title,
        no_color,
        verbose: args.verbose,
    })
}

fn init_logging(verbose: u8, no_color: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}

fn state_line(state: &CollectionState) -> String {
    match state {
        CollectionState::Rendered { cards } => format!("{} ({cards} cards)", "rendered".green()),
        CollectionState::Failed { kind, message } => {
            format!("{} [{kind:?}] {message}", "failed".red())
        }
        other => other.label().yellow().to_string(),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let selectors = run.portfolio.selectors.clone();
    let runner = Runner::new(run.portfolio).map_err(|e| e.to_string())?;

    let mut page = StaticPage::portfolio(&selectors);
    if let Some(buttons) = run.filters.clone() {
        page.set_filter_group(&selectors.filter_buttons, buttons);
    }

    let report = runner.run(&mut page).await.map_err(|e| e.to_string())?;

    // stdout carries the page itself when no output file is given
    let summary = |line: String| {
        if run.output.is_some() {
            println!("{line}");
        } else {
            eprintln!("{line}");
        }
    };
    for collection in Collection::ALL {
        summary(format_kv_line(
            &collection.name().to_uppercase(),
            &state_line(report.state(collection)),
        ));
    }
    let filters = match report.filters.as_ref() {
        Some(controller) => {
            let buttons = page
                .filter_buttons(controller.buttons_selector())
                .map(|b| b.len())
                .unwrap_or(0);
            format!("{buttons} buttons on {}", controller.grid_selector())
        }
        None => "not attached".to_string(),
    };
    summary(format_kv_line("Filters", &filters));

    let rendered = match run.output_format {
        OutputFormat::Html => output::render_html(&page, &selectors, &run.title),
        OutputFormat::Json => output::render_json(&page, &selectors, &report),
    };

    match run.output.as_ref() {
        Some(outfile_path) => {
            let mut outfile = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(outfile_path)
                .await
                .map_err(|e| format!("failed to open output file: {e}"))?;
            outfile
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output file: {e}"))?;
            summary(format_kv_line("Output", outfile_path));
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(&rendered)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            stdout
                .flush()
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
        }
    }

    summary(format!(
        ":: Completed :: loaded in {}ms ::",
        report.elapsed.as_millis()
    ));
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "unable to locate a home directory for the config file".to_string())?;
        config::ensure_default_config_file(&path)?;
        println!("{}", format_kv_line("Config", &path.display().to_string()));
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;
    init_logging(run.verbose, run.no_color);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
