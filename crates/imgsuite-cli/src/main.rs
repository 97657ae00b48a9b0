//! imgsuite CLI: command-line client for the image processing backend.
//!
//! Reads IMGSUITE_API_BASE (or API_BASE); `--api-base` overrides it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use imgsuite_api_client::{ApiClient, Session, StatusPoller};
use imgsuite_cli::{init_tracing, parse_params, render_page, variant_lines};
use imgsuite_core::models::{
    EditOperation, OutputFormat, Variant, DEFAULT_AUTOCONTRAST_CUTOFF, DEFAULT_BLUR_RADIUS,
    DEFAULT_PROCESS_OPERATION, DEFAULT_ROTATE_ANGLE, DEFAULT_SHARPEN_FACTOR,
};
use imgsuite_core::state::{Action, AppState};
use imgsuite_core::ClientConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "imgsuite", about = "Image processing backend CLI")]
struct Cli {
    /// Backend base URL (overrides IMGSUITE_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of images
    List {
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
        /// Images per page (defaults to IMGSUITE_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,
        /// Only show images whose filename, id or status contains this text
        #[arg(long)]
        query: Option<String>,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Upload one or more images, in order, stopping at the first failure
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Start background processing of an image
    Process {
        id: String,
        #[arg(long, default_value = DEFAULT_PROCESS_OPERATION)]
        operation: String,
        /// Operation parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// Keep polling until processing finishes
        #[arg(long)]
        wait: bool,
    },
    /// Show the current status of an image
    Status { id: String },
    /// Poll the status of an image until it completes or fails
    Watch {
        id: String,
        /// Poll interval (defaults to IMGSUITE_POLL_INTERVAL_MS)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Apply an edit synchronously
    Edit {
        id: String,
        /// Output encoding: png, jpeg, webp, gif, bmp, tiff
        #[arg(long)]
        output_format: Option<OutputFormat>,
        #[command(subcommand)]
        op: EditCommands,
    },
    /// Delete an image and its content
    Delete { id: String },
    /// Print variant URLs without contacting the backend
    Url {
        id: String,
        /// original, processed or edited (all three when omitted)
        #[arg(long)]
        variant: Option<Variant>,
    },
    /// Save one variant of an image to a local file
    Download {
        id: String,
        #[arg(long, default_value = "original")]
        variant: Variant,
        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum EditCommands {
    Resize {
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Stretch to the exact size instead of keeping the aspect ratio
        #[arg(long)]
        stretch: bool,
    },
    Crop {
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        x: i64,
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        y: i64,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    Rotate {
        #[arg(long, default_value_t = DEFAULT_ROTATE_ANGLE, allow_negative_numbers = true)]
        angle: f64,
        /// Keep the original canvas size
        #[arg(long)]
        no_expand: bool,
    },
    Grayscale,
    Blur {
        #[arg(long, default_value_t = DEFAULT_BLUR_RADIUS)]
        radius: f64,
    },
    Sharpen {
        #[arg(long, default_value_t = DEFAULT_SHARPEN_FACTOR)]
        factor: f64,
    },
    Autocontrast {
        #[arg(long, default_value_t = DEFAULT_AUTOCONTRAST_CUTOFF)]
        cutoff: f64,
    },
    /// Mirror top to bottom
    Flip,
    /// Mirror left to right
    Flop,
}

impl From<EditCommands> for EditOperation {
    fn from(command: EditCommands) -> Self {
        match command {
            EditCommands::Resize {
                width,
                height,
                stretch,
            } => EditOperation::Resize {
                width,
                height,
                keep_aspect: !stretch,
            },
            EditCommands::Crop {
                x,
                y,
                width,
                height,
            } => EditOperation::Crop {
                x,
                y,
                width,
                height,
            },
            EditCommands::Rotate { angle, no_expand } => EditOperation::Rotate {
                angle,
                expand: !no_expand,
            },
            EditCommands::Grayscale => EditOperation::Grayscale {},
            EditCommands::Blur { radius } => EditOperation::Blur { radius },
            EditCommands::Sharpen { factor } => EditOperation::Sharpen { factor },
            EditCommands::Autocontrast { cutoff } => EditOperation::Autocontrast { cutoff },
            EditCommands::Flip => EditOperation::Flip {},
            EditCommands::Flop => EditOperation::Flop {},
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Poll until a terminal status, printing every observed status.
async fn watch(client: ApiClient, id: String, every: Duration) -> anyhow::Result<()> {
    let mut poller = StatusPoller::spawn(Arc::new(client), id, every);
    let mut last = None;
    while let Some(update) = poller.next().await {
        let meta = update?;
        if last != Some(meta.status) {
            println!("{}: {}", meta.id, meta.status);
            last = Some(meta.status);
        }
    }
    Ok(())
}

fn load_config(api_base: Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(base) = api_base {
        config.api_base = base;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn connect(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    let client = ApiClient::from_config(config).context(
        "Failed to create API client. Set IMGSUITE_API_BASE (or API_BASE) or pass --api-base",
    )?;
    tracing::debug!(base = client.base_url(), "Using backend");
    Ok(client)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.api_base)?;

    match cli.command {
        Commands::List {
            page,
            page_size,
            query,
            format,
        } => {
            let client = connect(&config)?;
            let mut state = AppState::with_page_size(page_size.unwrap_or(config.page_size));
            state.page = page.max(1);
            state.query = query.unwrap_or_default();
            let mut session = Session::new(client, state);
            let state = session.run(Action::Refresh).await;
            if let Some(error) = &state.error {
                anyhow::bail!("{}", error);
            }
            if format == "json" {
                let shown: Vec<_> = state.filtered();
                print_json(&serde_json::json!({
                    "items": shown,
                    "total": state.total,
                    "page": state.page,
                    "page_size": state.page_size,
                }))?;
            } else {
                print!("{}", render_page(state));
            }
        }
        Commands::Upload { files } => {
            let client = connect(&config)?;
            let count = files.len();
            let mut session = Session::new(client, AppState::with_page_size(config.page_size));
            let state = session.run(Action::Upload(files)).await;
            print!("{}", render_page(state));
            if let Some(error) = &state.error {
                anyhow::bail!("{}", error);
            }
            println!("\nUploaded {} file(s)", count);
        }
        Commands::Process {
            id,
            operation,
            params,
            wait,
        } => {
            let client = connect(&config)?;
            let params = parse_params(params.as_deref())?;
            let response = client.trigger_process(&id, &operation, &params).await?;
            print_json(&response)?;
            if wait && !response.status.is_terminal() {
                watch(client, id, config.poll_interval()).await?;
            }
        }
        Commands::Status { id } => {
            let client = connect(&config)?;
            let response = client.get_status(&id).await?;
            print_json(&response)?;
        }
        Commands::Watch { id, interval_ms } => {
            let client = connect(&config)?;
            let every = interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.poll_interval());
            watch(client, id, every).await?;
        }
        Commands::Edit {
            id,
            output_format,
            op,
        } => {
            let client = connect(&config)?;
            let operation = EditOperation::from(op);
            let response = client.edit_image(&id, &operation, output_format).await?;
            print_json(&response)?;
            println!("{}", client.edited_url(&id));
        }
        Commands::Delete { id } => {
            let client = connect(&config)?;
            client.delete_image(&id).await?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Image {} deleted", id) }),
            )?;
        }
        Commands::Download {
            id,
            variant,
            out,
        } => {
            let client = connect(&config)?;
            let bytes = client.fetch_variant(&id, variant).await?;
            tokio::fs::write(&out, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!(
                "Saved {} variant of {} to {} ({} bytes)",
                variant,
                id,
                out.display(),
                bytes.len()
            );
        }
        Commands::Url { id, variant } => {
            for line in variant_lines(&config.api_base, &id, variant) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
