// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let header = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::HEADER))));
    let literal = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::LITERAL))));
    let context = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::CONTEXT))));

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(literal)
        .placeholder(context)
        .valid(context)
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    format!(
        "\
{header_sync}
  {sync}        Merge local and shared history once
  {clear}       Empty the shared history

{header_setup}
  {daemon}      Manage the background sync daemon
  {config}      Show configuration
  {completion}  Generate shell completions
",
        header_sync = colors::header("History:"),
        header_setup = colors::header("Setup & Configuration:"),
        sync = colors::literal("sync"),
        clear = colors::literal("clear"),
        daemon = colors::literal("daemon"),
        config = colors::literal("config"),
        completion = colors::literal("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  histsync config show      Review settings (created on first run)
  histsync sync             Sync once
  histsync daemon start     Keep syncing in the background",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
