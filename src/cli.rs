use clap::{Parser, Subcommand};
use enver::{Settings, define_settings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

define_settings! {
    // Read by name only in this binary
    #[allow(dead_code)]
    pub struct DemoSettings {
        /// Address the service binds to
        #[field(default = "127.0.0.1")]
        pub app_host: String,

        /// Port the service listens on
        #[field(default = 8080)]
        pub app_port: u16,

        /// Enable verbose diagnostics
        #[field(default = false)]
        pub app_debug: bool,

        /// Origins allowed to call the API, comma-separated or a JSON array
        #[field(default = Vec::new())]
        pub app_allowed_origins: Vec<String>,

        /// Connection string, there is no default
        pub app_database_url: String,

        /// Read replica connection string
        pub app_replica_url: Option<String>,
    }
}

#[derive(Parser)]
#[command(name = "enver-cli", about = "Inspect settings resolved from the environment")]
struct Cli {
    /// Load variables from this dotenv file before resolving
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every resolved field with its source
    Show {
        /// Print the resolved values as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one field, looked up case-insensitively
    Get { name: String },
    /// Report every configuration error, exit non-zero if there are any
    Check,
    /// Print the declared fields
    Schema,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // A missing dotenv file is fine, the process environment may be complete
    if let Err(e) = dotenvy::from_path(&cli.env_file)
        && !e.not_found()
    {
        eprintln!("Failed to read {}: {}", cli.env_file.display(), e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Show { json } => show(json),
        Command::Get { name } => get(&name),
        Command::Check => check(),
        Command::Schema => {
            print_schema();
            ExitCode::SUCCESS
        }
    }
}

fn show(json: bool) -> ExitCode {
    let settings = match DemoSettings::instance() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(settings.all()) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize settings: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    for (name, value) in settings.all() {
        let source = settings
            .source(name)
            .map(|s| s.to_string())
            .unwrap_or_default();
        println!("{} = {} ({})", name, value, source);
    }
    ExitCode::SUCCESS
}

fn get(name: &str) -> ExitCode {
    let result = DemoSettings::instance().and_then(|settings| settings.get(name));
    match result {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn check() -> ExitCode {
    match DemoSettings::resolve_from(&enver::ProcessEnv) {
        Ok(_) => {
            println!("✓ Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("{}", errors);
            ExitCode::FAILURE
        }
    }
}

fn print_schema() {
    let schema = DemoSettings::schema();
    println!("{}:", schema.name);
    for field in schema.fields {
        let status = if field.required { "required" } else { "optional" };
        println!("  {} ({}, {})", field.name, field.kind, status);
        if !field.description.is_empty() {
            println!("    description: {}", field.description);
        }
        if let Some(default) = field.default {
            println!("    default: {}", default);
        }
    }
}
