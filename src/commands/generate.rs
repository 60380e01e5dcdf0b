//! `ssl generate`: key plus CSR (or self-signed certificate) generation for
//! a domain, with next-step guidance.

use anyhow::Result;
use inquire::Text;

use crate::api::ApiClient;
use crate::api::types::SniEndpoint;
use crate::cli::GenerateArgs;
use crate::openssl;

pub async fn run(client: &ApiClient, app: &str, args: &GenerateArgs) -> Result<()> {
    let (mut owner, mut country, mut area, mut city) = (
        args.owner.clone(),
        args.country.clone(),
        args.area.clone(),
        args.city.clone(),
    );

    if requires_prompt(args) {
        owner = Some(Text::new("Owner of this certificate").prompt()?);
        country = Some(Text::new("Country of owner (two-letter ISO code)").prompt()?);
        area = Some(Text::new("State/province/etc. of owner").prompt()?);
        city = Some(Text::new("City of owner").prompt()?);
    }

    let subject = build_subject(
        &args.domain,
        args.subject.as_deref(),
        owner.as_deref(),
        country.as_deref(),
        area.as_deref(),
        city.as_deref(),
    );

    let domain = &args.domain;
    let keyfile = format!("{domain}.key");

    let certs = client.sni_endpoints(app).await?;
    let command = next_command(&certs, domain);

    if args.selfsigned {
        let crtfile = format!("{domain}.crt");
        openssl::req(&openssl::Request {
            keysize: args.keysize,
            keyfile: &keyfile,
            outfile: &crtfile,
            subject: &subject,
            self_signed: true,
        })
        .await?;

        eprintln!("Your key and self-signed certificate have been generated.");
        eprintln!("Next, run:");
        eprintln!("$ nimbusctl certs {command} {crtfile} {keyfile}");
    } else {
        let csrfile = format!("{domain}.csr");
        openssl::req(&openssl::Request {
            keysize: args.keysize,
            keyfile: &keyfile,
            outfile: &csrfile,
            subject: &subject,
            self_signed: false,
        })
        .await?;

        eprintln!("Your key and certificate signing request have been generated.");
        eprintln!("Submit the CSR in '{csrfile}' to your preferred certificate authority.");
        eprintln!("When you've received your certificate, run:");
        eprintln!("$ nimbusctl certs {command} CERTFILE {keyfile}");
    }

    Ok(())
}

/// Prompt for owner details only when nothing about the subject was given
/// and `--now` does not forbid it.
fn requires_prompt(args: &GenerateArgs) -> bool {
    let fields = [&args.owner, &args.country, &args.area, &args.city];
    args.subject.as_deref().is_none_or(str::is_empty)
        && !args.now
        && fields
            .iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
}

/// X.509 subject, either taken verbatim from `--subject` or assembled from
/// the individual fields. Empty fields are left out; CN is always last.
fn build_subject(
    domain: &str,
    subject: Option<&str>,
    owner: Option<&str>,
    country: Option<&str>,
    area: Option<&str>,
    city: Option<&str>,
) -> String {
    if let Some(subject) = subject.filter(|subject| !subject.is_empty()) {
        return subject.to_string();
    }

    let mut out = String::new();
    push_field(&mut out, "C", country);
    push_field(&mut out, "ST", area);
    push_field(&mut out, "L", city);
    push_field(&mut out, "O", owner);
    out.push_str("/CN=");
    out.push_str(domain);
    out
}

fn push_field(out: &mut String, attribute: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        out.push('/');
        out.push_str(attribute);
        out.push('=');
        out.push_str(value);
    }
}

/// Whether the follow-up command is `certs add` or `certs update`: update
/// when a hosted certificate already lists the domain verbatim.
fn next_command(certs: &[SniEndpoint], domain: &str) -> &'static str {
    let covered = certs
        .iter()
        .any(|cert| cert.ssl_cert.cert_domains.iter().any(|name| name == domain));
    if covered { "update" } else { "add" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn args(subject: Option<&str>, owner: Option<&str>, now: bool) -> GenerateArgs {
        GenerateArgs {
            domain: "example.com".to_string(),
            selfsigned: false,
            keysize: 2048,
            owner: owner.map(str::to_string),
            country: None,
            area: None,
            city: None,
            subject: subject.map(str::to_string),
            now,
        }
    }

    fn cert(domains: &[&str]) -> SniEndpoint {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        SniEndpoint {
            name: "tokyo-1050".to_string(),
            cname: None,
            ssl_cert: crate::api::types::SslCert {
                ca_signed: true,
                cert_domains: domains.iter().map(|d| d.to_string()).collect(),
                starts_at: date,
                expires_at: date,
                issuer: "issuer".to_string(),
                subject: "subject".to_string(),
                acm: false,
            },
            warnings: BTreeMap::new(),
        }
    }

    #[test]
    fn subject_skips_empty_fields_and_ends_with_cn() {
        let subject = build_subject("x.com", None, Some("Acme"), Some("US"), None, Some("SF"));
        assert_eq!(subject, "/C=US/L=SF/O=Acme/CN=x.com");
    }

    #[test]
    fn subject_flag_wins_when_non_empty() {
        let subject = build_subject("x.com", Some("/O=Flag/CN=x.com"), Some("Acme"), None, None, None);
        assert_eq!(subject, "/O=Flag/CN=x.com");
        let subject = build_subject("x.com", Some(""), Some("Acme"), None, None, None);
        assert_eq!(subject, "/O=Acme/CN=x.com");
    }

    #[test]
    fn prompting_only_without_subject_fields() {
        assert!(requires_prompt(&args(None, None, false)));
        assert!(!requires_prompt(&args(None, None, true)));
        assert!(!requires_prompt(&args(None, Some("Acme"), false)));
        assert!(!requires_prompt(&args(Some("/CN=x.com"), None, false)));
        // Empty values look absent, exactly like unset flags.
        assert!(requires_prompt(&args(Some(""), Some(""), false)));
    }

    #[test]
    fn next_command_by_domain_membership() {
        let certs = vec![cert(&["example.com", "www.example.com"])];
        assert_eq!(next_command(&certs, "example.com"), "update");
        assert_eq!(next_command(&certs, "api.example.com"), "add");
        assert_eq!(next_command(&[], "example.com"), "add");
    }
}
