#![allow(clippy::uninlined_format_args)]

use phish_ensemble::{Config, EnsembleClassifier};
use std::collections::HashMap;

struct Sample {
    name: &'static str,
    body: &'static str,
    from: Option<&'static str>,
    reply_to: Option<&'static str>,
}

const SAMPLES: &[Sample] = &[
    Sample {
        name: "Bank account suspension",
        body: "URGENT: Your bank account has been suspended due to unusual activity. \
               Verify your identity immediately: http://secure-bank-login.tk/verify?id=8812",
        from: Some("Security Team <security@mybank.com>"),
        reply_to: Some("support@secure-bank-login.tk"),
    },
    Sample {
        name: "Lottery winner",
        body: "Congratulations! You are the lottery winner of $1,000,000. \
               Act now, this is a limited time offer: http://bit.ly/claim-prize",
        from: Some("claims@intl-lottery.xyz"),
        reply_to: None,
    },
    Sample {
        name: "IP address login page",
        body: "Your password expires today. Click here to keep it: http://192.168.13.37/owa/login",
        from: None,
        reply_to: None,
    },
    Sample {
        name: "Team meeting",
        body: "Hi all, the quarterly review moved to Thursday at 10am. \
               Agenda: https://wiki.example.org/reviews/q3",
        from: Some("alice@example.org"),
        reply_to: Some("alice@example.org"),
    },
    Sample {
        name: "Plain newsletter",
        body: "Thanks for subscribing. This week: three recipes for autumn soups.",
        from: Some("news@cooking.example.com"),
        reply_to: None,
    },
];

const URLS: &[&str] = &[
    "https://www.google.com/search?q=rust",
    "http://paypal-account-verify.ml/login.php",
    "http://203.0.113.50/secure/update",
    "bit.ly/3xYz",
    "https://github.com/rust-lang/rust",
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let classifier = match std::env::args().nth(1) {
        Some(path) => EnsembleClassifier::from_config(&Config::from_file(&path)?)?,
        None => EnsembleClassifier::from_config(&Config::default())?,
    };

    println!("Content classifier: {}", classifier.content_scorer().describe());
    println!("URL classifier: {}", classifier.url_scorer().describe());
    println!();

    println!("Full email analysis");
    println!("═══════════════════════════════════════");
    for sample in SAMPLES {
        let mut headers = HashMap::new();
        if let Some(from) = sample.from {
            headers.insert("from".to_string(), from.to_string());
        }
        if let Some(reply_to) = sample.reply_to {
            headers.insert("reply-to".to_string(), reply_to.to_string());
        }
        let headers = (!headers.is_empty()).then_some(headers);

        let verdict = classifier.analyze_email(sample.body, headers.as_ref())?;
        println!(
            "{:<28} {:<10} confidence {:.3} risk {:>3}%",
            sample.name,
            verdict.prediction(),
            verdict.confidence(),
            verdict.risk_percentage()
        );
        if let Some(legacy) = verdict.to_legacy() {
            println!(
                "  keywords: {:?}",
                legacy.features.suspicious_keywords.iter().collect::<Vec<_>>()
            );
            println!("  urls: {:?}", legacy.features.urls);
        }
    }
    println!();

    println!("URL-only analysis");
    println!("═══════════════════════════════════════");
    for url in URLS {
        let verdict = classifier.combine_url_only(url)?;
        println!(
            "{:<45} {:<10} confidence {:.3} risk {:>3}%",
            url,
            verdict.prediction(),
            verdict.confidence(),
            verdict.risk_percentage()
        );
    }

    println!();
    println!("Sample JSON response:");
    let verdict = classifier.combine_url_only(URLS[1])?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    Ok(())
}
