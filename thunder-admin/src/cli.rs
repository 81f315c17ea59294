//! Command-line interface
//!
//! Flags fall back to the same `THUNDER_*` variables `ClientConfig`
//! reads, so a `.env` file configures both.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use shared::{Carrier, EditableField, OrderFilter, OrderStatus, Period};
use thunder_client::{AuthExpiry, ClientConfig, ExportFormat, SavePayload};

#[derive(Debug, Parser)]
#[command(author, version, about = "Thunder Recargas admin console")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "THUNDER_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Admin password (prompted for when absent)
    #[arg(long, env = "THUNDER_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// What to do when the password is rejected: reload | reprompt
    #[arg(long, env = "THUNDER_AUTH_EXPIRY")]
    pub auth_expiry: Option<AuthExpiry>,

    /// Row save body: full | changed
    #[arg(long, env = "THUNDER_SAVE_PAYLOAD")]
    pub save_payload: Option<SavePayload>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "THUNDER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "THUNDER_LOG_JSON")]
    pub log_json: bool,

    /// Write logs to daily files in this directory instead of stderr
    #[arg(long, env = "THUNDER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment configuration with flag overrides applied
    pub fn client_config(&self) -> ClientConfig {
        self.apply(ClientConfig::from_env())
    }

    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.backend_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(policy) = self.auth_expiry {
            config = config.with_auth_expiry(policy);
        }
        if let Some(mode) = self.save_payload {
            config = config.with_save_payload(mode);
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Wait until the backend answers its health check
    Wait,
    /// List orders
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show dashboard metrics
    Dashboard,
    /// Edit an order row and save it
    Edit {
        id: String,
        /// Page the order is listed on
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        app_password: Option<String>,
    },
    /// Change one field without the row editor
    Set {
        id: String,
        /// status | admin_comment | nome | telefone | recarga_selecionada | senha_app
        field: EditableField,
        value: String,
    },
    /// Add an order
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        carrier: Carrier,
        #[arg(long)]
        plan: String,
        #[arg(long, default_value = "")]
        app_password: String,
    },
    /// Delete an order
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Download orders as csv, excel, json or pdf
    Export {
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Site configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration document
    Show,
    /// Change configuration fields; untouched keys are kept
    Set(ConfigSetArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    #[arg(long)]
    pub header_title: Option<String>,
    #[arg(long)]
    pub header_subtitle: Option<String>,
    #[arg(long)]
    pub footer_warning: Option<String>,
    #[arg(long)]
    pub pix_key: Option<String>,
    #[arg(long)]
    pub pix_name: Option<String>,
    /// Tim plan, repeat for each (replaces the list)
    #[arg(long = "tim-plan")]
    pub tim_plans: Vec<String>,
    #[arg(long = "vivo-plan")]
    pub vivo_plans: Vec<String>,
    #[arg(long = "claro-plan")]
    pub claro_plans: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Name or phone
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<OrderStatus>,
    #[arg(long)]
    pub carrier: Option<Carrier>,
    /// today | week | month
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub period: Option<Period>,
    /// Custom range start (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Custom range end (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> OrderFilter {
        let period = match (self.period, self.from, self.to) {
            (Some(period), _, _) => Some(period),
            (None, None, None) => None,
            (None, start, end) => Some(Period::Custom { start, end }),
        };
        OrderFilter {
            search: self.search.clone(),
            status: self.status.clone(),
            carrier: self.carrier.clone(),
            period,
        }
    }
}
