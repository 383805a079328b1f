use clap::{Arg, Command};
use log::LevelFilter;
use phish_ensemble::{Config, EnsembleClassifier, EnsembleVerdict, PhishError};
use std::collections::HashMap;
use std::io::Read;
use std::process;

fn main() {
    let matches = Command::new("phish-ensemble")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing verdicts for emails and URLs from content and URL classifiers")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phish-ensemble.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load the configured models and report what will be used")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Classify a single URL")
                .conflicts_with("email")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("FILE")
                .help("Classify an email file (headers optional), or '-' for stdin")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .value_name("ADDRESS")
                .help("From header, overrides the one in the email file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("reply-to")
                .long("reply-to")
                .value_name("ADDRESS")
                .help("Reply-To header, overrides the one in the email file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("legacy")
                .long("legacy")
                .help("Print the single-classifier response shape for email verdicts")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phish-ensemble.yaml");

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let classifier = match EnsembleClassifier::from_config(&config) {
        Ok(classifier) => classifier,
        Err(e) => {
            eprintln!("Error loading models: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("Configuration: {config_path}");
        println!("Content classifier: {}", classifier.content_scorer().describe());
        println!("URL classifier: {}", classifier.url_scorer().describe());
        println!("URL features: {}", classifier.url_scorer().schema());
        let policy = classifier.policy();
        println!(
            "Ensemble: threshold {}, content weight {}, url weight {}",
            policy.high_confidence_threshold, policy.content_weight, policy.url_weight
        );
        return;
    }

    let legacy = matches.get_flag("legacy");

    let verdict = if let Some(url) = matches.get_one::<String>("url") {
        classifier.combine_url_only(url)
    } else if let Some(email_file) = matches.get_one::<String>("email") {
        let raw = match read_input(email_file) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("Error reading email: {e}");
                process::exit(1);
            }
        };
        let (mut headers, body) = split_email(&raw);
        if let Some(from) = matches.get_one::<String>("from") {
            headers.insert("from".to_string(), from.clone());
        }
        if let Some(reply_to) = matches.get_one::<String>("reply-to") {
            headers.insert("reply-to".to_string(), reply_to.clone());
        }
        let headers = (!headers.is_empty()).then_some(headers);
        classifier.analyze_email(&body, headers.as_ref())
    } else {
        eprintln!("Nothing to classify: pass --url or --email");
        process::exit(2);
    };

    match verdict {
        Ok(verdict) => print_verdict(&verdict, legacy),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(if e.is_client_error() { 2 } else { 1 });
        }
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(Config::default())
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Point model_dir at the directory holding your trained artifacts.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn read_input(path: &str) -> Result<String, PhishError> {
    if path == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Split a message into lowercased headers and body. Input without a header
/// block followed by a blank line is treated as a bare body.
fn split_email(raw: &str) -> (HashMap<String, String>, String) {
    let bare = || (HashMap::new(), raw.to_string());
    let mut headers: HashMap<String, String> = HashMap::new();
    let mut last_header_key: Option<String> = None;
    let mut lines = raw.lines();
    let mut separated = false;

    for line in lines.by_ref() {
        if line.trim().is_empty() {
            separated = true;
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            // Continuation of previous header
            match last_header_key.as_ref().and_then(|k| headers.get_mut(k)) {
                Some(existing_value) => {
                    existing_value.push(' ');
                    existing_value.push_str(line.trim());
                }
                None => return bare(),
            }
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) if !key.is_empty() && !key.contains(' ') => {
                let key = key.to_lowercase();
                headers.insert(key.clone(), value.trim().to_string());
                last_header_key = Some(key);
            }
            _ => return bare(),
        }
    }

    if !separated || headers.is_empty() {
        return bare();
    }

    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }
    (headers, body)
}

fn print_verdict(verdict: &EnsembleVerdict, legacy: bool) {
    let rendered = match (legacy, verdict.to_legacy()) {
        (true, Some(legacy_verdict)) => serde_json::to_string_pretty(&legacy_verdict),
        _ => serde_json::to_string_pretty(verdict),
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing verdict: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_email_with_headers() {
        let raw = "From: Bank <alerts@bank.com>\nReply-To: help@bank-help.tk\nSubject: Account\n\tnotice\n\nYour account is suspended.\nhttp://bank-help.tk/login\n";
        let (headers, body) = split_email(raw);
        assert_eq!(headers.get("from").unwrap(), "Bank <alerts@bank.com>");
        assert_eq!(headers.get("reply-to").unwrap(), "help@bank-help.tk");
        assert_eq!(headers.get("subject").unwrap(), "Account notice");
        assert_eq!(body, "Your account is suspended.\nhttp://bank-help.tk/login\n");
    }

    #[test]
    fn test_split_bare_body() {
        let raw = "Hi team, lunch is at noon.\nSee you there.";
        let (headers, body) = split_email(raw);
        assert!(headers.is_empty());
        assert_eq!(body, raw);

        let (headers, body) = split_email("Reminder: lunch at noon");
        assert!(headers.is_empty());
        assert_eq!(body, "Reminder: lunch at noon");
    }
}
