//! The `show` command.

use std::path::Path;

use console::style;
use jobscroll::harvest::AppendStore;

use crate::cli::icons;

/// Print the listings stored in `file`.
pub fn cmd_show(file: &Path, limit: usize, json: bool) -> anyhow::Result<()> {
    let records = AppendStore::new(file).load()?;
    let shown = if limit == 0 {
        &records[..]
    } else {
        &records[..limit.min(records.len())]
    };

    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No listings in {}", icons::warn(), file.display());
        return Ok(());
    }

    println!(
        "{} {} listings in {}",
        icons::success(),
        style(records.len()).cyan(),
        file.display()
    );
    for record in shown {
        println!();
        println!("  {} {}", icons::bullet(), style(&record.title).bold());
        println!("    {} at {}", record.company, record.location);
        println!("    {}", style(&record.salary).dim());
        println!("    {} {}", icons::dim_arrow(), record.link);
    }
    if shown.len() < records.len() {
        println!();
        println!(
            "  {}",
            style(format!("... and {} more", records.len() - shown.len())).dim()
        );
    }

    Ok(())
}
