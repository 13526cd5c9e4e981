pub mod config;
pub mod lint;
pub mod loader;
pub mod math;
pub mod session;

use anyhow::Context;
use quiz_core::{QuizPage, RenderEnv};
use thiserror::Error;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::loader::{FragmentFetcher, Location};
use crate::math::TerminalMath;
use crate::session::Session;

/// What to do with the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cli {
    Play(String),
    Lint(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("usage: quizdeck <play|lint> <page-path-or-url>")]
pub struct UsageError;

impl Cli {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, UsageError> {
        let mut args = args.into_iter();
        let (Some(command), Some(page), None) = (args.next(), args.next(), args.next()) else {
            return Err(UsageError);
        };
        match command.as_str() {
            "play" => Ok(Self::Play(page)),
            "lint" => Ok(Self::Lint(page)),
            _ => Err(UsageError),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse(std::env::args().skip(1))?;
    let math = TerminalMath;
    let env = RenderEnv::detached().with_math(&math);

    match cli {
        Cli::Play(page) => {
            let page = open_page(&page, &config, &env).await?;
            let mut session = Session::new(page);
            session::run(
                &mut session,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                &env,
            )
            .await?;
        }
        Cli::Lint(page) => {
            let page = open_page(&page, &config, &env).await?;
            let report = lint::lint(&page);
            for line in &report.lines {
                println!("{line}");
            }
            if !report.is_clean() {
                anyhow::bail!("{} problem(s) found", report.problems);
            }
        }
    }

    Ok(())
}

/// Load a page, then fetch and wire all its quizzes.
pub async fn open_page(
    page: &str,
    config: &Config,
    env: &RenderEnv<'_>,
) -> anyhow::Result<QuizPage> {
    let fetcher = FragmentFetcher::new(Location::parse(page), config.base_url.clone());
    let html = fetcher
        .load_page()
        .await
        .with_context(|| format!("failed to load page {}", fetcher.page()))?;

    let mut quiz = QuizPage::parse(&html);
    quiz.initialize(&fetcher, config.widget.reselection, env).await;
    tracing::info!(
        page,
        decks = quiz.decks().len(),
        cards = quiz.cards().len(),
        "quiz page ready"
    );
    Ok(quiz)
}
