use anyhow::Context;
use imgsuite_api_client::Endpoints;
use imgsuite_core::models::{ImageMeta, Variant};
use imgsuite_core::state::AppState;
use serde_json::Value;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse `--params` for a processing request. Must be a JSON object.
pub fn parse_params(raw: Option<&str>) -> anyhow::Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(raw).context("--params must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--params must be a JSON object, got {}", value);
    }
    Ok(value)
}

/// One table row per image.
pub fn image_row(image: &ImageMeta) -> String {
    format!(
        "{:<36} {:<40} {:<10}",
        truncate_string(&image.id, 36),
        truncate_string(&image.filename, 40),
        image.status.as_str()
    )
}

/// Render the current page, filtered by the state's query.
pub fn render_page(state: &AppState) -> String {
    let mut out = String::new();
    let shown = state.filtered();
    out.push_str(&format!(
        "Page {} of {} ({} images total)\n",
        state.page,
        state.total_pages(),
        state.total
    ));

    if shown.is_empty() {
        out.push_str("\nNo images found.\n");
        return out;
    }

    out.push_str(&format!("\n{:<36} {:<40} {:<10}\n", "ID", "Filename", "Status"));
    out.push_str(&"-".repeat(88));
    out.push('\n');
    for image in shown {
        out.push_str(&image_row(image));
        out.push('\n');
    }

    if state.page < state.total_pages() {
        out.push_str("\n... (more images available, use --page to see more)\n");
    }
    out
}

/// One `<variant> <url>` line per requested variant, all three when none is given.
/// Needs no client: an empty base yields host-relative paths.
pub fn variant_lines(api_base: &str, id: &str, variant: Option<Variant>) -> Vec<String> {
    let endpoints = Endpoints::new(api_base);
    let variants = match variant {
        Some(v) => vec![v],
        None => Variant::ALL.to_vec(),
    };
    variants
        .into_iter()
        .map(|v| format!("{:<10} {}", v.path_segment(), endpoints.variant(id, v)))
        .collect()
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
