use anyhow::{Context, Result};
use emotion_detector::emotion_predictor;
use serde_json::Value;
use std::io::Read;

/// Scores the text given as arguments, or stdin when there are none.
fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read text from stdin")?;
        buf
    } else {
        args.join(" ")
    };

    let prediction = emotion_predictor(Some(&Value::String(text)));
    println!("{}", serde_json::to_string_pretty(&prediction)?);

    if !prediction.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
