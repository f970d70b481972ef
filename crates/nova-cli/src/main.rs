mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nova_core::mock_data::DatasetCounts;

use commands::invoices::InvoiceQuery;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// nova -- command-line client for the Nova business dashboard API.
#[derive(Parser)]
#[command(name = "nova", version, about)]
struct Cli {
    /// Base URL of the nova daemon.
    #[arg(long, global = true, env = "NOVA_API_URL", default_value = "http://127.0.0.1:9090")]
    api_url: String,

    /// Print raw JSON instead of a table.
    #[arg(short, long, global = true)]
    json: bool,

    /// Language for numbers and dates, e.g. `de`. Defaults to the saved client setting.
    #[arg(long, global = true, env = "NOVA_LANG")]
    lang: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server status (default when no subcommand is given).
    Status,

    /// List invoices.
    Invoices {
        /// Workflow stage, e.g. `approved`.
        #[arg(long)]
        stage: Option<String>,
        /// Substring of the customer name.
        #[arg(long)]
        customer: Option<String>,
        /// Earliest issue date (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Latest issue date (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
    },

    /// Move an invoice to its next workflow stage.
    Advance {
        /// Invoice ID, e.g. INV-000001.
        id: String,
        /// Name recorded in the activity timeline.
        #[arg(long)]
        user: Option<String>,
    },

    /// List customers.
    Customers {
        #[arg(long)]
        country: Option<String>,
        /// `active`, `at_risk` or `inactive`.
        #[arg(long)]
        status: Option<String>,
    },

    /// Filter the agent catalog by business function and country.
    Catalog {
        /// Business function; repeat to select several.
        #[arg(long = "function")]
        functions: Vec<String>,
        /// Country code; repeat to select several.
        #[arg(long = "country")]
        countries: Vec<String>,
    },

    /// Rank coming-soon agents by ROI (computed locally).
    Roadmap {
        #[arg(long)]
        function: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Summarize agent metrics, or export them as CSV.
    Metrics {
        #[arg(long)]
        agent: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Export the matching samples as CSV.
        #[arg(long)]
        csv: bool,
        /// Write the CSV here instead of stdout.
        #[arg(long, requires = "csv")]
        out: Option<PathBuf>,
    },

    /// Show client settings, or change country / language.
    Settings {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },

    /// Write a seeded mock dataset fixture (no daemon needed).
    Generate {
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 100)]
        customers: usize,
        #[arg(long, default_value_t = 100)]
        invoices: usize,
        #[arg(long, default_value_t = 100)]
        metrics: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    nova_telemetry::logging::init_logging("nova-cli", "warn");

    let api_url = cli.api_url.trim_end_matches('/');
    let json = cli.json;
    let lang = cli.lang.as_deref();

    match cli.command {
        None | Some(Commands::Status) => {
            commands::status::run(api_url, json).await?;
        }
        Some(Commands::Invoices {
            stage,
            customer,
            from,
            to,
        }) => {
            let query = InvoiceQuery {
                stage,
                customer,
                from,
                to,
            };
            let display = commands::display_locale(api_url, lang).await?;
            commands::invoices::list(api_url, &query, &display.language, json).await?;
        }
        Some(Commands::Advance { id, user }) => {
            let display = commands::display_locale(api_url, lang).await?;
            commands::invoices::advance(api_url, &id, user, &display.language, json).await?;
        }
        Some(Commands::Customers { country, status }) => {
            let display = commands::display_locale(api_url, lang).await?;
            commands::customers::list(api_url, country.as_deref(), status.as_deref(), &display, json)
                .await?;
        }
        Some(Commands::Catalog {
            functions,
            countries,
        }) => {
            commands::catalog::list(api_url, &functions, &countries, json).await?;
        }
        Some(Commands::Roadmap { function, search }) => {
            let display = commands::display_locale(api_url, lang).await?;
            commands::roadmap::run(function, search, &display.language, json)?;
        }
        Some(Commands::Metrics {
            agent,
            country,
            csv,
            out,
        }) => {
            if csv {
                commands::metrics::export_csv(api_url, agent.as_deref(), country.as_deref(), out.as_deref())
                    .await?;
            } else {
                let display = commands::display_locale(api_url, lang).await?;
                commands::metrics::summary(
                    api_url,
                    agent.as_deref(),
                    country.as_deref(),
                    &display.language,
                    json,
                )
                .await?;
            }
        }
        Some(Commands::Settings { country, language }) => {
            commands::settings::run(api_url, country, language, json).await?;
        }
        Some(Commands::Generate {
            seed,
            out,
            customers,
            invoices,
            metrics,
        }) => {
            let counts = DatasetCounts {
                customers,
                invoices,
                metrics,
            };
            commands::generate::run(seed, counts, &out)?;
        }
    }

    Ok(())
}
