//! Terminal output and prompts.
//!
//! Status lines start with a coloured marker; prompts share dialoguer's
//! colourful theme.

use anyhow::Result;
use console::{StyledObject, style};
use dialoguer::{Confirm, Input, theme::ColorfulTheme};

/// Yes/no question, `default` preselected
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let answer = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Single-line edit starting from `initial`
pub fn input(prompt: &str, initial: &str) -> Result<String> {
    let text = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .with_initial_text(initial)
        .interact_text()?;
    Ok(text)
}

pub fn header(text: &str) {
    println!("\n{}\n", style(text).bold().cyan());
}

fn status(marker: StyledObject<&str>, text: &str) -> String {
    format!("{marker} {text}")
}

pub fn success(text: &str) {
    println!("{}", status(style("✓").green().bold(), text));
}

/// Goes to stderr so `list --json` output stays clean
pub fn error(text: &str) {
    eprintln!("{}", status(style("✗").red().bold(), text));
}

pub fn info(text: &str) {
    println!("{}", status(style("ℹ").blue(), text));
}

/// One take row: selection dot, play arrow, name
pub fn row(name: &str, selected: bool, playing: bool) {
    let dot = if selected {
        style("●").green().to_string()
    } else {
        " ".to_string()
    };
    let label = if playing {
        style(format!("▶ {name}")).bold().to_string()
    } else {
        format!("  {name}")
    };
    println!(" {dot} {label}");
}
