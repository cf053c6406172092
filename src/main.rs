//! contentgen - generate a blog post, short-video script or micro-post
//! from the command line.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use contentgen::sink::{NotificationChannel, Outcome, WriterSink};
use contentgen::{
  BackendState, Configuration, ContentKind, ErrorKind, GenerationBackend
, GenerationPipeline, GenerationResult, OptionSet
};

/// Configuration or usage failure
const EXIT_USAGE: i32 = 2;
/// The request was made and failed
const EXIT_GENERATION: i32 = 1;

/// Generate content with a chat-completion model
#[derive(Parser)]
#[command(name = "contentgen")]
#[command(about = "Generate blog posts, TikTok scripts and tweets")]
#[command(long_about = r#"
Generate blog posts, TikTok scripts and tweets

The API key is read from CONTENTGEN_API_KEY unless a --config file
provides one. CONTENTGEN_API_BASE, CONTENTGEN_MODEL and
CONTENTGEN_TIMEOUT_SECS override the defaults.

Examples:
  contentgen article --tone casual --length short home composting
  contentgen script --duration 60 --style tutorial latte art
  contentgen post --hashtags false --goal discussion remote work
"#)]
struct Cli
{   /// JSON configuration file (defaults to environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>

  , /// Retry transport failures with exponential backoff
    #[arg(long, global = true)]
    retry: bool

  , #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command
{   /// Long-form markdown blog post
    Article
    {   /// professional | casual | humorous | formal | enthusiastic
        #[arg(long)]
        tone: Option<String>
      , /// general | technical | business | academic | beginners
        #[arg(long)]
        audience: Option<String>
      , /// short | medium | long | detailed
        #[arg(long)]
        length: Option<String>
      , /// What to write about
        #[arg(required = true)]
        topic: Vec<String>
    }
  , /// Short-video script
    Script
    {   /// 15 | 30 | 60
        #[arg(long)]
        duration: Option<String>
      , /// trendy | educational | storytelling | comedy | tutorial
        #[arg(long)]
        style: Option<String>
      , /// gen-z | millennials | professionals | students | general
        #[arg(long)]
        target: Option<String>
      , #[arg(required = true)]
        topic: Vec<String>
    }
  , /// Micro-post within 280 characters
    Post
    {   /// viral | professional | humorous | controversial | informative
        #[arg(long)]
        style: Option<String>
      , /// engagement | clicks | followers | awareness | discussion
        #[arg(long)]
        goal: Option<String>
      , /// true | false
        #[arg(long)]
        hashtags: Option<String>
      , #[arg(required = true)]
        topic: Vec<String>
    }
}

impl Command
{   /// Kind, raw option pairs and topic, as a form would submit them
    fn into_submission(self)
      -> (ContentKind, Vec<(&'static str, String)>, String)
    {   fn pairs(
          named: [(&'static str, Option<String>); 3]
        ) -> Vec<(&'static str, String)>
        {   named.into_iter()
              .filter_map(|(name, value)| value.map(|v| (name, v)))
              .collect()
        }

        match self
        {   Command::Article { tone, audience, length, topic } => (
              ContentKind::Article
            , pairs([
                ("tone", tone)
              , ("audience", audience)
              , ("length", length)
              ])
            , topic.join(" ")
            )
          , Command::Script { duration, style, target, topic } => (
              ContentKind::ShortVideoScript
            , pairs([
                ("duration", duration)
              , ("style", style)
              , ("target", target)
              ])
            , topic.join(" ")
            )
          , Command::Post { style, goal, hashtags, topic } => (
              ContentKind::MicroPost
            , pairs([
                ("style", style)
              , ("goal", goal)
              , ("hashtags", hashtags)
              ])
            , topic.join(" ")
            )
        }
    }
}

/// Process exit code for a finished submission
fn exit_code(result: &GenerationResult) -> i32
{   match result
    {   Ok(_) => 0
      , Err(e) => match e.kind()
        {   ErrorKind::ConfigurationMissing
          | ErrorKind::InvalidInput => EXIT_USAGE
          , ErrorKind::TransportFailure
          | ErrorKind::EmptyResponse
          | ErrorKind::Timeout => EXIT_GENERATION
        }
    }
}

/// Terminal stand-in for toast notifications
struct ConsoleNotifier;

impl NotificationChannel for ConsoleNotifier
{   fn notify(&self, outcome: Outcome, message: &str)
    {   match outcome
        {   Outcome::Success => eprintln!("✓ {}", message)
          , Outcome::Failure => eprintln!("✗ {}", message)
        }
    }
}

#[tokio::main]
async fn main()
{   env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config
    {   Some(path) => Configuration::from_json_file(path)
      , None => Configuration::from_env()
    };
    let mut config = match config
    {   Ok(config) => config
      , Err(e) => {
          eprintln!("Error: {}", e);
          process::exit(EXIT_USAGE);
        }
    };
    if cli.retry
    {   config.retry.enabled = true;
    }

    let (kind, pairs, topic) = cli.command.into_submission();
    let options = match OptionSet::from_pairs(kind, pairs)
    {   Ok(options) => options
      , Err(e) => {
          eprintln!("Error: {}", e);
          process::exit(EXIT_USAGE);
        }
    };

    let pipeline = GenerationPipeline::openai(Arc::new(config));
    let backend = GenerationBackend::new(BackendState::new(
      pipeline
    , Arc::new(WriterSink::new(std::io::stdout()))
    , Arc::new(ConsoleNotifier)
    ));

    let result = backend.generate(kind, options, topic).await;
    let _ = backend.shutdown().await;

    if let Err(e) = &result
    {   log::debug!("Generation failed: {:?}", e);
    }
    process::exit(exit_code(&result));
}
