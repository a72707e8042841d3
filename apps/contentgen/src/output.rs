// Terminal output helpers. Content goes to stdout; notifications to stderr.

use std::path::Path;

use console::style;

use crate::content::prompts::TIPS;
use crate::content::{parse_blocks, terminal::render_blocks};
use crate::errors::{AppError, Notification};

pub fn print_content(text: &str) {
    print!("{}", render_blocks(&parse_blocks(text)));
}

/// Numbered list, 1-based so numbers match `generate --saved N`.
pub fn format_numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}. {item}\n", i + 1))
        .collect()
}

pub fn print_numbered(items: &[String], empty_message: &str) {
    if items.is_empty() {
        println!("{}", style(empty_message).dim());
    } else {
        print!("{}", format_numbered(items));
    }
}

pub fn print_tips() {
    println!("{}", style("Prompt tips").bold());
    for tip in TIPS {
        println!("  • {tip}");
    }
}

pub fn print_saved(path: &Path) {
    eprintln!("{} Saved as {}", style("✓").green(), path.display());
}

/// Reports a failure on stderr and returns the notification shown.
pub fn notify(error: &AppError) -> Notification {
    let n = error.notification();
    let label = if n.soft {
        style(n.code).yellow()
    } else {
        style(n.code).red()
    };
    eprintln!("{label}: {}", n.message);
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numbered_is_one_based() {
        let items = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(format_numbered(&items), "  1. alpha\n  2. beta\n");
    }

    #[test]
    fn test_format_numbered_empty() {
        assert_eq!(format_numbered(&[]), "");
    }
}
