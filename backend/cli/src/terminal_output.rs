//! Terminal output utilities: ANSI formatting, notes, and the one-shot
//! diagnosis card printed by `cropguard analyze`.

use cropguard_core::ConfidenceTier;
use cropguard_media::{mime_from_data_uri, SUPPORTED_FORMATS_HINT};
use cropguard_session::{text, DiagnosisCard, Outcome, Screen};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
#[cfg(test)]
fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Print a formatted INFO note to stdout.
pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

/// Print a formatted WARNING note.
pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

/// Print a formatted ERROR note.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Print a formatted SUCCESS note.
pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Screen rendering
// ---------------------------------------------------------------------------

struct Painter {
    color: bool,
}

impl Painter {
    fn paint(&self, style: &str, s: &str) -> String {
        if self.color {
            format!("{style}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}

fn tier_style(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => GREEN,
        ConfidenceTier::Medium => YELLOW,
        ConfidenceTier::Low => RED,
    }
}

/// Render a `Screen` as plain terminal text, with ANSI styling when `color`.
pub fn render_screen(screen: &Screen, color: bool) -> String {
    let p = Painter { color };
    let mut out = String::new();

    out.push_str(&p.paint(BOLD, text::APP_TITLE));
    out.push('\n');

    if screen.hero {
        out.push_str(&format!("\n{}\n{}\n", p.paint(BOLD, text::HERO_TITLE), text::HERO_SUBTITLE));
    }

    if let Some(panel) = &screen.upload {
        let style = if panel.enabled { "" } else { DIM };
        out.push_str(&format!(
            "\n{}\n{}\n",
            p.paint(style, text::UPLOAD_TITLE),
            p.paint(DIM, &format!("{SUPPORTED_FORMATS_HINT} · {}", text::MAX_SIZE_HINT)),
        ));
    }

    if screen.loading {
        out.push_str(&format!("\n{}\n", p.paint(CYAN, text::LOADING_TITLE)));
    }

    if let Some(banner) = &screen.error_banner {
        out.push_str(&format!(
            "\n{}\n{}\n",
            p.paint(&format!("{RED}{BOLD}"), text::ERROR_TITLE),
            p.paint(RED, &banner.message),
        ));
    }

    match &screen.outcome {
        Some(Outcome::Diagnosis(card)) => render_card(&mut out, &p, card),
        Some(Outcome::NotAPlant) => {
            out.push_str(&format!(
                "\n{}\n{}\n",
                p.paint(&format!("{YELLOW}{BOLD}"), text::NOT_A_PLANT_TITLE),
                text::NOT_A_PLANT_BODY,
            ));
        }
        None => {}
    }

    out
}

fn render_card(out: &mut String, p: &Painter, card: &DiagnosisCard) {
    let result = &card.result;
    out.push('\n');
    if let Some(mime) = card.image_uri.as_deref().and_then(mime_from_data_uri) {
        out.push_str(&p.paint(DIM, &format!("[{mime}]")));
        out.push('\n');
    }

    let condition_style = if card.healthy { GREEN } else { RED };
    out.push_str(&format!(
        "{}  {}  {}: {}\n",
        p.paint(BOLD, &result.plant_name),
        p.paint(condition_style, &result.condition),
        text::CONFIDENCE_LABEL,
        p.paint(tier_style(card.confidence_tier), &format!("{}%", card.confidence_percent)),
    ));
    out.push_str(&result.description);
    out.push('\n');

    for (title, items, numbered) in [
        (text::SYMPTOMS_TITLE, &result.symptoms, false),
        (text::TREATMENT_TITLE, &result.treatment, true),
        (text::PREVENTION_TITLE, &result.prevention, false),
    ] {
        out.push_str(&format!("\n{}\n", p.paint(BOLD, title)));
        for (i, item) in items.iter().enumerate() {
            if numbered {
                out.push_str(&format!("  {}. {item}\n", i + 1));
            } else {
                out.push_str(&format!("  • {item}\n"));
            }
        }
    }
}
