use anyhow::Context;
use athenaeum_core::models::ResourcePage;
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Render one page of resources as a fixed-width table.
pub fn render_resource_table(page: &ResourcePage) -> String {
    let info = &page.page_info;
    let mut out = format!(
        "Page {} of {} ({} resources)\n",
        info.page,
        info.total_pages.max(1),
        info.total
    );

    if page.resources.is_empty() {
        out.push_str("\nNo resources found.\n");
        return out;
    }

    out.push_str(&format!(
        "\n{:<26} {:<40} {:<16} {:<24} {:>5} {:>8} {:>9} {:<10}\n",
        "ID", "Title", "Category", "Department", "Files", "Views", "Downloads", "Created"
    ));
    out.push_str(&"-".repeat(145));
    out.push('\n');

    for resource in &page.resources {
        let created = resource
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<26} {:<40} {:<16} {:<24} {:>5} {:>8} {:>9} {:<10}\n",
            truncate_string(resource.resource_id.as_str(), 26),
            truncate_string(&resource.title, 40),
            resource.category.as_str(),
            resource.department.as_str(),
            resource.file_urls.len(),
            resource.view_count,
            resource.downloads,
            created
        ));
    }

    if info.page < info.total_pages {
        out.push_str("\n... (more resources available, use --page to see more)\n");
    }
    out
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
