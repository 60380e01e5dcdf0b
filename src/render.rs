//! Terminal output helpers shared by the command workflows.
//!
//! Report content (headers, key/value blocks, tables) goes to stdout so it
//! stays pipeable; progress lines and warnings go to stderr.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::api::types::SniEndpoint;

pub fn styled_header(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(stdout, "=== {message}");
    let _ = stdout.reset();
}

/// Key/value block with values aligned one column past the longest key.
pub fn styled_object(pairs: &[(&str, String)]) {
    let width = pairs.iter().map(|(key, _)| key.len() + 1).max().unwrap_or(0);
    for (key, value) in pairs {
        println!("{:<width$} {}", format!("{key}:"), value);
    }
}

pub fn warn(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Always);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(stderr, " ▸    {message}");
    let _ = stderr.reset();
}

pub fn error(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Always);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
    let _ = writeln!(stderr, " ▸    {message}");
    let _ = stderr.reset();
}

/// Run a future behind a spinner, then leave a `message... done|failed`
/// status line on stderr. The result passes through untouched either way.
pub async fn action<F, T, E>(message: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let spinner = spinner(message);
    let result = fut.await;
    spinner.finish_and_clear();

    let mut stderr = StandardStream::stderr(ColorChoice::Always);
    let _ = write!(stderr, "{message}... ");
    match &result {
        Ok(_) => {
            let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
            let _ = writeln!(stderr, "done");
        }
        Err(_) => {
            let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            let _ = writeln!(stderr, "failed");
        }
    }
    let _ = stderr.reset();
    result
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{msg} {spinner:.cyan}") {
        pb.set_style(style);
    }
    pb.set_message(format!("{message}..."));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Certificate summary block: common names, validity window, issuer and
/// subject, then a one-line trust verdict.
pub fn certificate_details(cert: &SniEndpoint) {
    println!("Certificate details:");
    let ssl = &cert.ssl_cert;
    styled_object(&[
        ("Common Name(s)", ssl.cert_domains.join(", ")),
        ("Expires At", format_date(&ssl.expires_at)),
        ("Issuer", ssl.issuer.clone()),
        ("Starts At", format_date(&ssl.starts_at)),
        ("Subject", ssl.subject.clone()),
    ]);
    if ssl.ca_signed {
        println!("SSL certificate is verified by a root authority.");
    } else if ssl.issuer == ssl.subject {
        println!("SSL certificate is self signed.");
    } else {
        println!("SSL certificate is not trusted.");
    }
}

/// Platform warnings attached to a certificate, one warning line per entry.
pub fn display_warnings(cert: &SniEndpoint) {
    for (category, messages) in &cert.warnings {
        for message in messages {
            warn(&format!("{category} {message}"));
        }
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn painted(spec: &ColorSpec, text: &str) -> String {
    let mut buf = Ansi::new(Vec::new());
    let _ = buf.set_color(spec);
    let _ = buf.write_all(text.as_bytes());
    let _ = buf.reset();
    match String::from_utf8(buf.into_inner()) {
        Ok(out) => out,
        Err(_) => text.to_string(),
    }
}

/// App names render cyan wherever they appear inline.
pub fn app(name: &str) -> String {
    painted(ColorSpec::new().set_fg(Some(Color::Cyan)), name)
}

/// Suggested commands render bold cyan.
pub fn cmd(text: &str) -> String {
    painted(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true), text)
}

pub fn green(text: &str) -> String {
    painted(ColorSpec::new().set_fg(Some(Color::Green)), text)
}

pub fn yellow(text: &str) -> String {
    painted(ColorSpec::new().set_fg(Some(Color::Yellow)), text)
}

pub fn red(text: &str) -> String {
    painted(ColorSpec::new().set_fg(Some(Color::Red)), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_render_in_utc_minutes() {
        let date = Utc.with_ymd_and_hms(2012, 8, 1, 21, 34, 23).unwrap();
        assert_eq!(format_date(&date), "2012-08-01 21:34 UTC");
    }

    #[test]
    fn painted_text_keeps_the_payload() {
        let painted = green("example.com");
        assert!(painted.contains("example.com"));
        assert!(painted.starts_with('\x1b'));
    }
}
