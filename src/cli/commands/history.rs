use anyhow::Result;

use crate::cli::{display, CliApp};

pub async fn list(app: &mut CliApp) -> Result<()> {
    let entries = app.history().await?;
    println!("{} saved entries\n", entries.len());
    display::print_entries(&entries);
    Ok(())
}

pub async fn delete(app: &mut CliApp, entry_id: i64) -> Result<()> {
    app.delete_entry(entry_id).await?;
    println!("Deleted entry #{}", entry_id);
    Ok(())
}

pub async fn summary(app: &mut CliApp) -> Result<()> {
    let summary = app.weekly_summary().await?;
    println!("This week ({} entries):\n", summary.entry_count);
    println!("{}", summary.summary);
    Ok(())
}
