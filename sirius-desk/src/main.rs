use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sirius_catalog::CatalogRepository;
use sirius_desk::{read_form, render, Desk, DeskError, FormOverrides};
use sirius_reservation::{DraftLoad, ReservationForm, SubmissionError, SubmissionOutcome};
use sirius_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "sirius-desk",
    about = "Front desk for Sirius Farm reservations",
    long_about = "Quote, submit and draft Sirius Farm reservations.\n\
                  Forms are JSON files in the same format as the saved draft."
)]
struct Cli {
    /// Directory holding default/{RUN_MODE}/local configuration files
    #[arg(long, global = true, default_value = "config")]
    config_dir: PathBuf,

    /// Treat this day as today when checking dates, YYYY-MM-DD.
    /// The built-in catalog only opens dates in June 2025, so bookings
    /// against it need a day on or before those dates.
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List reservation types, activities, open dates and services
    Catalog,
    /// Price a reservation without submitting it
    Quote {
        /// Form file; omitted means an empty form
        #[arg(long)]
        form: Option<PathBuf>,
        #[command(flatten)]
        overrides: FormOverrides,
    },
    /// Submit a reservation, or save it as the draft
    Submit {
        #[arg(long, conflicts_with = "from_draft")]
        form: Option<PathBuf>,
        /// Start from the saved draft
        #[arg(long)]
        from_draft: bool,
        /// Save as draft instead of booking
        #[arg(long)]
        draft: bool,
        #[command(flatten)]
        overrides: FormOverrides,
    },
    /// Inspect or discard the saved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Load the draft and show its quote
    Show,
    /// Delete the draft
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli, config).await {
        match &e {
            DeskError::Submission(SubmissionError::Invalid(errors)) => eprint!("{}", render::validation_report(errors)),
            other => eprintln!("{}", other),
        }
        exit(e.exit_code());
    }
}

fn load_config(dir: &Path) -> anyhow::Result<Config> {
    Config::load_from(dir).with_context(|| format!("Failed to load config from {}", dir.display()))
}

async fn run(cli: Cli, config: Config) -> Result<(), DeskError> {
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let desk = Desk::from_config(config)?;
    tracing::debug!(%today, draft = %desk.config().drafts.slot_path().display(), "Front desk ready");

    match cli.command {
        Commands::Catalog => {
            if cli.json {
                print_json(&serde_json::json!({
                    "reservationTypes": desk.catalog().types(),
                    "additionalServices": desk.catalog().services(),
                }));
            } else {
                print!("{}", desk.catalog_listing());
            }
        }
        Commands::Quote { form, overrides } => {
            let form = match form {
                Some(path) => read_form(path)?,
                None => ReservationForm::default(),
            };
            let (controller, report) = desk.prepare(form, overrides.into_changes());
            if cli.json {
                print_json(&controller.view());
            } else {
                print!("{}", desk.quote(&controller, &report, today));
            }
        }
        Commands::Submit {
            form,
            from_draft,
            draft,
            overrides,
        } => {
            let form = match (form, from_draft) {
                (Some(path), _) => read_form(path)?,
                (None, true) => desk.draft_form()?,
                (None, false) => ReservationForm::default(),
            };
            let (controller, _) = desk.prepare(form, overrides.into_submission_changes(draft));
            let outcome = desk.submit(&controller, today).await?;
            match (&outcome, cli.json) {
                (SubmissionOutcome::Confirmed(c), true) => print_json(c),
                (SubmissionOutcome::DraftSaved { status, bytes }, true) => {
                    print_json(&serde_json::json!({ "status": status, "bytes": bytes }))
                }
                _ => print!("{}", desk.render_outcome(&outcome)),
            }
        }
        Commands::Draft { action: DraftAction::Show } => {
            let loaded = desk.load_draft();
            println!("{}", loaded.message());
            if let DraftLoad::Loaded(form) = loaded {
                let (controller, report) = desk.prepare(form, Vec::new());
                print!("{}", desk.quote(&controller, &report, today));
            }
        }
        Commands::Draft { action: DraftAction::Clear } => {
            desk.clear_draft()?;
            println!("Draft cleared");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Could not encode output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sirius_reservation::FieldChange;

    #[test]
    fn test_today_help_names_seed_dates() {
        let cmd = Cli::command();
        let today = cmd.get_arguments().find(|a| a.get_id() == "today").unwrap();
        let help = today.get_long_help().or(today.get_help()).unwrap().to_string();
        assert!(help.contains("June 2025"));
    }

    #[test]
    fn test_submit_from_draft_books_by_default() {
        let cli = Cli::try_parse_from(["sirius-desk", "--today", "2025-06-01", "submit", "--from-draft"]).unwrap();
        let Commands::Submit { from_draft, draft, overrides, .. } = cli.command else {
            panic!("expected the submit command");
        };

        assert!(from_draft);
        assert_eq!(overrides.into_submission_changes(draft), vec![FieldChange::SaveAsDraft(false)]);
    }
}
