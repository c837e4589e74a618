use clap::{ArgGroup, Parser};
use imgsplice::{
    append_image, embedded_images, extract_direct_prompt, extract_smart_prompt,
    logger::{self, LogLevel, LoggerConfig},
    rewrite_message, CompletionsClient, EmbedStyle, GeneratorConfig, ImageRef,
};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Replace every <!-- img-prompt="..." --> directive in a chat message with a
/// generated image and print the result.
#[derive(Parser, Debug)]
#[command(name = "imgsplice", version, about)]
#[command(group(ArgGroup::new("mode").args(["manual", "smart", "test"])))]
struct Cli {
    /// Append one image generated from the whole message
    #[arg(long)]
    manual: bool,

    /// Like --manual, but summarise the message with the model first
    #[arg(long)]
    smart: bool,

    /// Send a test prompt and print the image reference
    #[arg(long)]
    test: bool,

    /// Embed images as HTML instead of markdown
    #[arg(long)]
    html: bool,

    /// Write inline (data URI) images into this directory
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Also append log lines to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log JSON lines instead of formatted text
    #[arg(long)]
    log_json: bool,

    /// Message file; reads stdin when omitted
    input: Option<PathBuf>,
}

impl Cli {
    fn logger_config(&self) -> LoggerConfig {
        let level = if self.verbose { LogLevel::Debug } else { LogLevel::Info };
        let mut config = LoggerConfig::default()
            .with_level(level)
            .with_json_output(self.log_json);
        if let Some(path) = &self.log_file {
            config = config.with_file_output(&path.to_string_lossy());
        }
        config
    }
}

fn read_message(input: Option<&Path>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn save_inline_images(dir: &Path, images: &[ImageRef]) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    for (index, image) in images.iter().filter(|i| i.is_data_uri()).enumerate() {
        let extension = image
            .media_type()
            .and_then(|m| m.strip_prefix("image/"))
            .unwrap_or("png");
        let path = dir.join(format!("image-{}.{}", index + 1, extension));
        fs::write(&path, image.decode_inline()?)?;
        log::info!("💾 Saved {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init_with_config(cli.logger_config())?;
    if !dotenv_loaded {
        log::debug!("No .env file found, using process environment");
    }

    let mut config = GeneratorConfig::from_env();
    if cli.html {
        config = config.with_embed_style(EmbedStyle::Html);
    }
    config.validate()?;
    logger::log_config_info(&config);

    if config.api_key.is_empty() {
        log::warn!("⚠️  IMGSPLICE_API_KEY is not set, requests will likely be rejected");
    }

    let client = CompletionsClient::new(config);
    let style = client.config().embed_style;

    if cli.test {
        log::info!("🔄 Sending test request...");
        let image = client.image().generate_image(imgsplice::host::TEST_PROMPT).await?;
        log::info!("✅ Test successful");
        if let Some(dir) = &cli.save {
            save_inline_images(dir, std::slice::from_ref(&image))?;
        }
        println!("{}", image);
        return Ok(());
    }

    let message = read_message(cli.input.as_deref())?;

    let text = if cli.manual || cli.smart {
        let prompt = if cli.smart {
            extract_smart_prompt(&message, client.chat()).await
        } else {
            extract_direct_prompt(&message)
        };
        if prompt.is_empty() {
            return Err(imgsplice::GenerationError::ExtractionFailed.into());
        }
        log::info!("📝 Prompt: {}", prompt);
        let image = client.image().generate_image(&prompt).await?;
        append_image(&message, &prompt, &image, style)
    } else {
        let outcome = rewrite_message(&message, client.image(), style).await;
        for (directive, e) in &outcome.failures {
            log::error!("❌ '{}': {}", directive.prompt, e);
        }
        if !outcome.modified {
            log::info!("No images were added");
        }
        outcome.text
    };

    if let Some(dir) = &cli.save {
        save_inline_images(dir, &embedded_images(&text))?;
    }

    print!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_flags_and_input() {
        let cli = Cli::try_parse_from([
            "imgsplice", "--smart", "--html", "--save", "out", "--log-file", "run.log", "msg.txt",
        ])
        .unwrap();
        assert!(cli.smart && cli.html);
        assert!(!cli.manual && !cli.test);
        assert_eq!(cli.save, Some(PathBuf::from("out")));
        assert_eq!(cli.input, Some(PathBuf::from("msg.txt")));

        let logging = cli.logger_config();
        assert_eq!(logging.min_level, LogLevel::Info);
        assert_eq!(logging.log_file_path.as_deref(), Some("run.log"));
        assert!(!logging.output_json);
    }

    #[test]
    fn test_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["imgsplice", "--manual", "--smart"]).is_err());
        assert!(Cli::try_parse_from(["imgsplice", "--test", "--manual"]).is_err());
    }

    #[test]
    fn test_verbose_json_logging() {
        let cli = Cli::try_parse_from(["imgsplice", "-v", "--log-json"]).unwrap();
        let logging = cli.logger_config();
        assert_eq!(logging.min_level, LogLevel::Debug);
        assert!(logging.output_json);
        assert_eq!(cli.input, None);
    }
}
