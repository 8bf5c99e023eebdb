//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chrono::DateTime;
use colored::*;
use retort_ingest::views::{PaperDetail, PaperView};
use retort_ingest::{CommitOutcome, ItemKind, ParsedDocument};
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Summarize a parse and where its review file went.
    pub fn parsed_document(&self, parsed: &ParsedDocument, review_path: &Path) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(parsed)?);
        }

        let mut lines = vec![
            self.success(&format!(
                "Parsed {} ({} page(s))",
                parsed.filename, parsed.page_count
            )),
            format!("  Title:   {}", parsed.paper_candidate.title),
            format!("  Authors: {}", parsed.paper_candidate.authors.join(", ")),
            format!("  Year:    {}", parsed.paper_candidate.year),
        ];

        if !parsed.compound_candidates.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Compound", "Category", "SMILES"]);
            for compound in &parsed.compound_candidates {
                builder.push_record([
                    compound.name.as_str(),
                    compound.category.as_str(),
                    compound.possible_smiles.as_str(),
                ]);
            }
            lines.push(self.table(builder));
        }

        for route in &parsed.synthesis_route_candidates {
            lines.push(format!("  Route: {} ({} step(s))", route.name, route.steps.len()));
        }

        if let Some(warning) = &parsed.extraction_warning {
            lines.push(self.warning(&format!("No candidates extracted: {}", warning)));
        }

        lines.push(self.info(&format!(
            "Review file written to {}; edit it, then run `retort commit`",
            review_path.display()
        )));
        Ok(lines.join("\n"))
    }

    /// Summarize a commit.
    pub fn commit_outcome(&self, outcome: &CommitOutcome) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(outcome)?);
        }

        let mut lines = vec![
            self.success(&format!("Paper saved: {}", outcome.paper.id)),
            format!(
                "  {} compound(s), {} synthesis route(s) created",
                outcome.compounds_created, outcome.synthesis_created
            ),
        ];

        for failure in &outcome.failures {
            let kind = match failure.kind {
                ItemKind::Compound => "compound",
                ItemKind::SynthesisRoute => "synthesis route",
            };
            lines.push(self.error(&format!(
                "{} '{}' not saved: {}",
                kind, failure.name, failure.reason
            )));
        }
        for warning in &outcome.warnings {
            lines.push(self.warning(warning));
        }

        Ok(lines.join("\n"))
    }

    /// Format a paper listing.
    pub fn papers(&self, papers: &[PaperView]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(papers)?);
        }

        if papers.is_empty() {
            return Ok(self.colorize("No papers found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Year", "Compounds", "Contributor", "Added"]);
        for paper in papers {
            builder.push_record([
                paper.id.clone(),
                paper.title.clone(),
                paper.year.to_string(),
                paper.related_compounds.len().to_string(),
                paper.contributor.clone().unwrap_or_else(|| "-".to_string()),
                format_timestamp(paper.created_at),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format one paper with its compounds.
    pub fn paper_detail(&self, detail: &PaperDetail) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(detail)?);
        }

        let paper = &detail.paper;
        let mut lines = vec![
            self.colorize(&paper.title, "cyan"),
            format!("  ID:       {}", paper.id),
            format!("  Authors:  {}", paper.authors.join(", ")),
            format!("  Journal:  {} ({})", paper.journal, paper.year),
            format!("  PDF:      {}", paper.pdf_url),
            format!("  Added:    {}", format_timestamp(paper.created_at)),
        ];
        if !paper.tags.is_empty() {
            lines.push(format!("  Keywords: {}", paper.tags.join(", ")));
        }

        if detail.compounds.is_empty() {
            lines.push(self.colorize("No compounds recorded.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["ID", "Compound", "Category", "SMILES", "Route"]);
            for compound in &detail.compounds {
                builder.push_record([
                    compound.id.clone(),
                    compound.name.clone(),
                    compound.category.clone(),
                    compound.smiles.clone(),
                    compound.synthesis_route.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            lines.push(self.table(builder));
        }

        Ok(lines.join("\n"))
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render unix seconds as a UTC date and time.
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}
