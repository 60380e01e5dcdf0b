//! `certs auto`: report Automatic Certificate Management status for an app.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tabled::builder::Builder;

use crate::api::ApiClient;
use crate::api::types::Domain;
use crate::render;

pub async fn run(client: &ApiClient, app: &str) -> Result<()> {
    let (app_info, certs, domains) = tokio::try_join!(
        client.app(app),
        client.sni_endpoints(app),
        client.domains_acm(app),
    )?;

    if !app_info.acm {
        render::styled_header(&format!(
            "Automatic Certificate Management is {} on {}",
            render::yellow("disabled"),
            render::app(app)
        ));
        return Ok(());
    }

    render::styled_header(&format!(
        "Automatic Certificate Management is {} on {}",
        render::green("enabled"),
        render::app(app)
    ));

    if certs.len() == 1 && certs[0].ssl_cert.acm {
        println!();
        render::certificate_details(&certs[0]);
    }

    let customs: Vec<&Domain> = domains
        .iter()
        .filter(|domain| domain.kind == "custom")
        .collect();

    if !customs.is_empty() {
        println!();
        println!("{}", status_table(&customs, Utc::now()));
    }

    if let Some(message) = guidance(&customs) {
        println!();
        render::styled_header(&message);
    }

    Ok(())
}

/// Status table with a Reason column only when some domain carries one.
fn status_table(domains: &[&Domain], now: DateTime<Utc>) -> String {
    let has_reason = domains
        .iter()
        .any(|domain| domain.acm_status_reason.is_some());

    let mut builder = Builder::default();
    let mut header = vec!["Domain", "Status"];
    if has_reason {
        header.push("Reason");
    }
    header.push("Updated");
    builder.push_record(header);

    for domain in domains {
        let mut row = vec![domain.hostname.clone(), humanize(domain.acm_status.as_deref())];
        if has_reason {
            row.push(domain.acm_status_reason.clone().unwrap_or_default());
        }
        row.push(
            domain
                .updated_at
                .map(|updated| time_since(&updated, now))
                .unwrap_or_default(),
        );
        builder.push_record(row);
    }

    builder.build().to_string()
}

fn humanize(status: Option<&str>) -> String {
    match status {
        None | Some("") => render::yellow("Waiting"),
        Some("ok") => render::green("OK"),
        Some("failed") => render::red("Failed"),
        // Remove once the ACM service reports a distinct in-progress status
        Some("verified") => render::yellow("In Progress"),
        Some("dns-verified") => render::yellow("DNS Verified"),
        Some(other) => other
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn time_since(date: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(*date);
    let minutes = delta.num_minutes();
    if minutes < 1 {
        return "less than a minute".to_string();
    }
    if minutes < 60 {
        return count(minutes, "minute");
    }
    let hours = delta.num_hours();
    if hours < 24 {
        return count(hours, "hour");
    }
    let days = delta.num_days();
    if days < 30 {
        return count(days, "day");
    }
    if days < 365 {
        return count(days / 30, "month");
    }
    count(days / 365, "year")
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// One post-table hint, first match wins: nothing to manage, hard failures,
/// then still-failing validations.
fn guidance(domains: &[&Domain]) -> Option<String> {
    if domains.is_empty() {
        return Some(format!(
            "Add a custom domain to your app by running: {}",
            render::cmd("nimbusctl domains add <yourdomain.com>")
        ));
    }
    if has_status(domains, "failed") {
        return Some(format!(
            "Some domains failed validation after multiple attempts, retry by running: {}",
            render::cmd("nimbusctl certs auto refresh")
        ));
    }
    if has_status(domains, "failing") {
        return Some(format!(
            "Some domains are failing validation, please verify that your DNS matches: {}",
            render::cmd("nimbusctl domains")
        ));
    }
    None
}

fn has_status(domains: &[&Domain], status: &str) -> bool {
    domains
        .iter()
        .any(|domain| domain.acm_status.as_deref() == Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn domain(hostname: &str, status: Option<&str>, reason: Option<&str>) -> Domain {
        Domain {
            hostname: hostname.to_string(),
            kind: "custom".to_string(),
            cname: None,
            acm_status: status.map(str::to_string),
            acm_status_reason: reason.map(str::to_string),
            updated_at: None,
        }
    }

    #[test]
    fn humanize_known_statuses() {
        assert_eq!(humanize(None), render::yellow("Waiting"));
        assert_eq!(humanize(Some("ok")), render::green("OK"));
        assert_eq!(humanize(Some("failed")), render::red("Failed"));
        assert_eq!(humanize(Some("verified")), render::yellow("In Progress"));
        assert_eq!(humanize(Some("dns-verified")), render::yellow("DNS Verified"));
    }

    #[test]
    fn humanize_unknown_statuses_word_by_word() {
        assert_eq!(humanize(Some("custom-state")), "Custom State");
        assert_eq!(humanize(Some("SOMETHING-else")), "Something Else");
    }

    #[test]
    fn guidance_prefers_failed_over_failing() {
        let failed = domain("a.example.com", Some("failed"), None);
        let failing = domain("b.example.com", Some("failing"), None);
        let set = vec![&failing, &failed];

        let message = guidance(&set).expect("message");
        assert!(message.contains("failed validation after multiple attempts"));
    }

    #[test]
    fn guidance_suggests_domains_add_when_empty() {
        let message = guidance(&[]).expect("message");
        assert!(message.contains("Add a custom domain"));
    }

    #[test]
    fn guidance_is_quiet_when_healthy() {
        let ok = domain("a.example.com", Some("ok"), None);
        assert!(guidance(&[&ok]).is_none());
    }

    #[test]
    fn reason_column_only_when_present() {
        let with = domain("a.example.com", Some("failing"), Some("CAA record forbids issuance"));
        let without = domain("b.example.com", Some("ok"), None);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let table = status_table(&[&with, &without], now);
        assert!(table.contains("Reason"));
        assert!(table.contains("CAA record forbids issuance"));

        let table = status_table(&[&without], now);
        assert!(!table.contains("Reason"));
    }

    #[test]
    fn time_since_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let checks = [
            (now - chrono::Duration::seconds(30), "less than a minute"),
            (now - chrono::Duration::minutes(5), "5 minutes"),
            (now - chrono::Duration::hours(1), "1 hour"),
            (now - chrono::Duration::days(3), "3 days"),
            (now - chrono::Duration::days(90), "3 months"),
            (now - chrono::Duration::days(730), "2 years"),
        ];
        for (date, expected) in checks {
            assert_eq!(time_since(&date, now), expected);
        }
    }

    mod flows {
        use super::*;
        use httpmock::prelude::*;
        use serde_json::json;

        use crate::config::Config;

        fn client_for(server: &MockServer) -> ApiClient {
            let config = Config {
                api_url: server.base_url(),
                api_token: "secret-token".to_string(),
            };
            ApiClient::new(&config).expect("client")
        }

        #[tokio::test]
        async fn disabled_acm_short_circuits() {
            let server = MockServer::start_async().await;
            let app = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/apps/myapp")
                        .header("accept", "application/vnd.nimbus+json; version=3.acm");
                    then.status(200).json_body(json!({"name": "myapp", "acm": false}));
                })
                .await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/apps/myapp/sni-endpoints");
                    then.status(200).json_body(json!([]));
                })
                .await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/apps/myapp/domains");
                    then.status(200).json_body(json!([]));
                })
                .await;

            run(&client_for(&server), "myapp").await.expect("auto");
            app.assert_async().await;
        }

        #[tokio::test]
        async fn enabled_acm_reports_certificate_and_domains() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/apps/myapp");
                    then.status(200).json_body(json!({"name": "myapp", "acm": true}));
                })
                .await;
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/apps/myapp/sni-endpoints")
                        .header("accept", "application/vnd.nimbus+json; version=3.sni_ssl_cert");
                    then.status(200).json_body(json!([{
                        "name": "tokyo-1050",
                        "cname": null,
                        "ssl_cert": {
                            "ca_signed?": true,
                            "cert_domains": ["example.org"],
                            "starts_at": "2012-08-01T21:34:23Z",
                            "expires_at": "2013-08-01T21:34:23Z",
                            "issuer": "/C=US/O=Example CA/CN=ca.example.org",
                            "subject": "/C=US/O=Example/CN=example.org",
                            "acm": true,
                        },
                    }]));
                })
                .await;
            let domains = server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/apps/myapp/domains")
                        .header("accept", "application/vnd.nimbus+json; version=3.acm");
                    then.status(200).json_body(json!([
                        {
                            "hostname": "example.org",
                            "kind": "custom",
                            "acm_status": "failing",
                            "acm_status_reason": "CAA record forbids issuance",
                            "updated_at": "2024-05-01T12:00:00Z",
                        },
                        {
                            "hostname": "myapp.nimbusapp.dev",
                            "kind": "default",
                            "acm_status": "ok",
                        },
                    ]));
                })
                .await;

            run(&client_for(&server), "myapp").await.expect("auto");
            domains.assert_async().await;
        }
    }
}
