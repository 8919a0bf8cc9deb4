use std::path::PathBuf;

use colored::Colorize;
use outline_core::{LineReport, Verdict};

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct InspectOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Only show this page (1-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

const TEXT_WIDTH: usize = 48;

fn truncate(text: &str) -> String {
    if text.chars().count() <= TEXT_WIDTH {
        return text.to_string();
    }
    let head: String = text.chars().take(TEXT_WIDTH - 1).collect();
    f!("{head}\u{2026}")
}

fn flag(on: bool) -> &'static str {
    if on {
        "x"
    } else {
        ""
    }
}

/// Keep the reports for `page`, or all of them.
pub fn select_page(reports: Vec<LineReport>, page: Option<usize>, pages: usize) -> Result<Vec<LineReport>> {
    match page {
        None => Ok(reports),
        Some(page) if page == 0 || page > pages => Err(Error::PageOutOfRange { page, pages }.into()),
        Some(page) => Ok(reports.into_iter().filter(|r| r.page == page).collect()),
    }
}

fn print_table(reports: &[LineReport]) {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Page".bold().cyan(),
        "Text".bold().cyan(),
        "Size".bold().cyan(),
        "B".bold().cyan(),
        "C".bold().cyan(),
        "Num".bold().cyan(),
        "Caps".bold().cyan(),
        "Gap".bold().cyan(),
        "Words".bold().cyan(),
        "Verdict".bold().cyan(),
        "Level".bold().cyan()
    ]);

    for report in reports {
        let feat = &report.features;
        let verdict = match (report.verdict, report.level) {
            (Verdict::Rejected(_), _) => report.verdict.to_string().red(),
            (_, Some(_)) => report.verdict.to_string().green(),
            _ => report.verdict.to_string().normal(),
        };
        let level = report
            .level
            .map(|level| level.as_str().bright_yellow().bold())
            .unwrap_or_else(|| "".normal());

        table.add_row(prettytable::row![
            report.page,
            truncate(&report.text),
            f!("{:.2}", feat.rel_size),
            flag(feat.is_bold),
            flag(feat.is_centered),
            flag(feat.starts_num),
            flag(feat.is_all_caps),
            f!("{:.2}", feat.space_above),
            feat.word_count,
            verdict,
            level
        ]);
    }

    table.printstd();
}

pub async fn run(options: InspectOptions, global: crate::Global) -> Result<()> {
    let builder = crate::config::outline_builder(&global)?;

    let (reports, pages) = tokio::task::spawn_blocking({
        let path = options.path.clone();
        move || -> Result<_> {
            let pages = pdf_layout::load_file(&path)
                .wrap_err_with(|| f!("failed to load {}", path.display()))?;
            Ok((builder.inspect(&pages), pages.len()))
        }
    })
    .await??;

    let reports = select_page(reports, options.page, pages)?;

    if options.json {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No text lines found.");
        return Ok(());
    }

    print_table(&reports);
    let headings = reports.iter().filter(|r| r.level.is_some()).count();
    println!("\n{} lines, {} headings", reports.len(), headings.to_string().bold());
    Ok(())
}
