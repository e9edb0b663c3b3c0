use log::error;
use recipe_ingest::{parse_ingredient_lines, parse_instruction_text, parse_recipe_from_url};
use std::env;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

const USAGE: &str = "Usage: recipe-ingest <url> | --ingredients | --instructions (text on stdin)";

async fn read_stdin() -> std::io::Result<String> {
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let arg = args.get(1).ok_or(USAGE)?;

    match arg.as_str() {
        "--ingredients" => {
            let text = read_stdin().await?;
            println!("{}", serde_json::to_string_pretty(&parse_ingredient_lines(&text))?);
        }
        "--instructions" => {
            let text = read_stdin().await?;
            println!("{}", serde_json::to_string_pretty(&parse_instruction_text(&text))?);
        }
        "-h" | "--help" => println!("{}", USAGE),
        url => {
            let result = parse_recipe_from_url(url).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                for message in result.errors() {
                    error!("{}", message);
                }
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
