//! uritemplate CLI - expand and check URI templates

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use uritemplate::{
    expand_with, Expander, FixSuggestion, Mode, Package, Params, PercentEncoder, Template,
    UriTemplateError, Verbatim,
};

#[derive(Parser)]
#[command(name = "uritemplate")]
#[command(about = "Expand URI Templates (draft v3), fully or in stages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a template against parameters
    Expand {
        /// Template, e.g. "/search{-opt|?|q}{-join|&|q,page}"
        template: String,

        /// Scalar parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// List parameter, comma separated (repeatable)
        #[arg(short = 'l', long = "list", value_name = "NAME=A,B")]
        lists: Vec<String>,

        /// Load parameters from a JSON or YAML file
        #[arg(long = "params", value_name = "FILE")]
        params_file: Option<PathBuf>,

        /// Keep unresolved expressions as template syntax
        #[arg(long)]
        partial: bool,

        /// Substitute values without percent-encoding
        #[arg(long)]
        raw: bool,
    },

    /// Parse templates and list their expressions and variables
    Check {
        #[arg(required = true)]
        templates: Vec<String>,
    },

    /// Build query URLs for every resource of a search package
    Search {
        /// Path to package YAML file
        package: PathBuf,

        /// Query terms
        query: String,

        /// Print links as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr, stdout only carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Expand {
            template,
            params,
            lists,
            params_file,
            partial,
            raw,
        } => collect_params(params_file.as_deref(), &params, &lists)
            .and_then(|p| run_expand(&template, &p, Mode::from(partial), raw)),
        Commands::Check { templates } => Ok(check_templates(&templates)),
        Commands::Search {
            package,
            query,
            json,
        } => run_search(&package, &query, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if let Some(suggestion) = e
                .downcast_ref::<UriTemplateError>()
                .and_then(|err| err.fix_suggestion())
            {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

fn split_assignment(input: &str) -> Result<(&str, &str), UriTemplateError> {
    input
        .split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| UriTemplateError::ParamSyntax {
            input: input.to_string(),
        })
}

fn load_params_file(path: &Path) -> Result<Params> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let params = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Params::from_json_str(&text)?,
        _ => Params::from_yaml_str(&text)?,
    };
    Ok(params)
}

/// File first, then -p and -l flags override
fn collect_params(file: Option<&Path>, scalars: &[String], lists: &[String]) -> Result<Params> {
    let mut params = match file {
        Some(path) => load_params_file(path)?,
        None => Params::new(),
    };

    for pair in scalars {
        let (name, value) = split_assignment(pair)?;
        params.insert(name, value);
    }
    for pair in lists {
        let (name, value) = split_assignment(pair)?;
        let items: Vec<&str> = if value.is_empty() {
            Vec::new()
        } else {
            value.split(',').collect()
        };
        params.insert(name, items);
    }

    Ok(params)
}

fn run_expand(template: &str, params: &Params, mode: Mode, raw: bool) -> Result<ExitCode> {
    let output = if raw {
        expand_with(template, params, &Verbatim, mode)?
    } else {
        expand_with(template, params, &PercentEncoder, mode)?
    };
    println!("{}", output);
    Ok(ExitCode::SUCCESS)
}

fn check_templates(templates: &[String]) -> ExitCode {
    let mut failed = 0;

    for source in templates {
        match Template::parse(source.as_str()) {
            Ok(template) => {
                println!("{} {}", "✓".green(), source);
                for expression in template.expressions() {
                    println!("  expression {}", expression);
                }
                println!("  variables: {}", template.variables().join(", "));
                for lint in template.lint() {
                    println!("  {} {}", "warning:".yellow(), lint);
                }
            }
            Err(e) => {
                failed += 1;
                println!("{} {}", "✗".red(), source);
                println!("  {}", e);
                if let Some(suggestion) = e.fix_suggestion() {
                    println!("  {} {}", "Fix:".yellow(), suggestion);
                }
            }
        }
    }

    if failed > 0 {
        eprintln!("{} {} of {} templates invalid", "Error:".red().bold(), failed, templates.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run_search(path: &Path, query: &str, json: bool) -> Result<ExitCode> {
    let package =
        Package::from_path(path).with_context(|| format!("loading package {}", path.display()))?;
    let expander = Expander::new();
    let links = package.query_links(&expander, query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
    } else {
        println!("{}", package.name.bold());
        for link in &links {
            println!("  {} {}", link.name.cyan(), link.query_uri);
        }
    }

    Ok(ExitCode::SUCCESS)
}
