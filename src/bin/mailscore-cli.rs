use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mailscore::{BlocklistStore, VerificationResult, Verifier, VerifyOptions};

#[derive(Parser)]
#[command(
    name = "mailscore-cli",
    about = "Score email deliverability without sending mail"
)]
struct Cli {
    /// address to verify (omit when using --stdin)
    email: Option<String>,

    /// read addresses from stdin (one per line)
    #[arg(long)]
    stdin: bool,

    /// format: human|json|ndjson
    #[arg(long, default_value = "human")]
    format: String,

    /// write report to file instead of stdout
    #[arg(long)]
    out: Option<String>,

    /// seed the disposable blocklist from a file (one domain per line)
    #[arg(long)]
    blocklist: Option<String>,

    /// fetch the public disposable-domain lists before verifying
    #[cfg(feature = "with-refresh")]
    #[arg(long)]
    fetch_lists: bool,

    /// whole-transaction SMTP deadline in milliseconds
    #[arg(long, default_value_t = 4_000)]
    timeout_ms: u64,

    /// HELO identity (defaults to the target domain)
    #[arg(long)]
    helo: Option<String>,

    /// SMTP port to probe
    #[arg(long, default_value_t = 25)]
    port: u16,

    /// evaluate blocklist/MX/heuristic signals only, skip the SMTP probe
    #[arg(long)]
    skip_smtp: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let blocklist = match &cli.blocklist {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read blocklist file {path}"))?;
            BlocklistStore::from_lines(&text)
        }
        None => BlocklistStore::new(),
    };

    #[cfg(feature = "with-refresh")]
    if cli.fetch_lists {
        let total = mailscore::blocklist::refresh::refresh(&blocklist)
            .context("fetch disposable-domain lists")?;
        eprintln!("loaded {total} disposable domains");
    }

    let options = VerifyOptions {
        smtp: mailscore::SmtpProbeOptions {
            port: cli.port,
            helo_domain: cli.helo.clone(),
            timeout_ms: cli.timeout_ms,
            ..mailscore::SmtpProbeOptions::default()
        },
        probe_smtp: !cli.skip_smtp,
    };

    let verifier = Verifier::new(blocklist, options).context("initialize verifier")?;

    let mut rows: Vec<VerificationResult> = Vec::new();
    if cli.stdin {
        for line in io::stdin().lock().lines() {
            let email = line.context("read stdin")?;
            if email.trim().is_empty() {
                continue;
            }
            rows.push(verifier.verify(&email));
        }
    } else if let Some(email) = &cli.email {
        rows.push(verifier.verify(email));
    } else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    match cli.format.as_str() {
        "human" => {
            emit(cli.out.as_deref(), render_human(&rows).as_bytes())?;
        }
        "json" => {
            let mut body = serde_json::to_vec_pretty(&rows)?;
            body.push(b'\n');
            emit(cli.out.as_deref(), &body)?;
        }
        "ndjson" => {
            let mut body = Vec::new();
            for row in &rows {
                serde_json::to_writer(&mut body, row)?;
                body.push(b'\n');
            }
            emit(cli.out.as_deref(), &body)?;
        }
        other => {
            eprintln!("unknown --format '{other}', use: human|json|ndjson");
            std::process::exit(1);
        }
    }

    // exit codes: 0 all scored above zero, 2 otherwise, 1 fatal
    if rows.iter().any(|row| row.score == 0) {
        std::process::exit(2);
    }
    Ok(())
}

fn render_human(rows: &[VerificationResult]) -> String {
    let mut report = String::new();
    for row in rows {
        report.push_str(&format!("[{:>3}] {}\n", row.score, row.email));
        for reason in &row.reasons {
            report.push_str(&format!("      - {reason}\n"));
        }
    }
    report
}

fn emit(out: Option<&str>, bytes: &[u8]) -> Result<()> {
    match out {
        Some(path) => write_all_atomically(path, bytes),
        None => {
            io::stdout().write_all(bytes)?;
            Ok(())
        }
    }
}

fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    let tmp = format!("{path}.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
