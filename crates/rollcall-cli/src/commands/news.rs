//! News command - Load and print the news board

use anyhow::{Context, Result};
use clap::Args;

use rollcall_core::domain::{NewsBoard, NewsItem, NewsStatus};

use super::{App, CliContext};
use crate::output::{get_formatter, OutputFormatter};

/// Arguments for the news subcommand
#[derive(Debug, Args)]
pub struct NewsCommand {}

impl NewsCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let app = App::build(&ctx.config)?;
        app.news.load().await;
        let board = app.news.board_snapshot();

        if ctx.format.is_json() {
            let json = serde_json::to_value(board.items()).context("Failed to serialize news")?;
            formatter.print_json(&json);
        } else {
            print_board(formatter.as_ref(), &board);
        }
        Ok(())
    }
}

pub fn print_board(formatter: &dyn OutputFormatter, board: &NewsBoard) {
    formatter.success(&format!("News ({} items)", board.len()));
    for (index, item) in board.items().iter().enumerate() {
        let marker = if index == board.current_index() { '>' } else { ' ' };
        formatter.info(&format!("{marker} {}. {}", index + 1, describe(item)));
    }
}

/// One-line summary of a news item
pub fn describe(item: &NewsItem) -> String {
    let mut line = format!("[{}] {}", item.priority.as_str(), item.headline);
    if !item.subtitle.is_empty() {
        line.push_str(&format!(" - {}", item.subtitle));
    }
    if item.show_image {
        if let Some(image) = &item.image {
            line.push_str(&format!(" ({image})"));
        }
    }
    if item.status == NewsStatus::Inactive {
        line.push_str(" (inactive)");
    }
    line
}
