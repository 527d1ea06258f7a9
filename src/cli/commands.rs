//! Command implementations for the newsfind CLI.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::NewsfindConfig;
use crate::document::jsonl::load_articles;
use crate::query::planner::QueryOptions;
use crate::search::result::SearchRequest;

/// Execute a CLI command.
pub async fn execute_command(args: NewsfindArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match &args.command {
        Command::Search(search_args) => search(search_args, &config, &args).await,
        Command::Index(index_args) => index(index_args, &config, &args).await,
        Command::Correct(correct_args) => correct(correct_args, &config, &args),
        Command::Plan(plan_args) => plan(plan_args, &config, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<NewsfindConfig> {
    match path {
        Some(path) => NewsfindConfig::load_from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(NewsfindConfig::default()),
    }
}

/// Search through every configured tier.
async fn search(args: &SearchArgs, config: &NewsfindConfig, cli_args: &NewsfindArgs) -> Result<()> {
    let mut orchestrator = config.build_orchestrator()?;
    if let Some(corpus) = &args.corpus {
        let articles = load_articles(corpus)
            .with_context(|| format!("failed to read corpus {}", corpus.display()))?;
        log::info!("loaded {} local articles from {}", articles.len(), corpus.display());
        orchestrator = orchestrator.with_corpus(articles);
    }

    let mut request = SearchRequest::new(args.query.as_str()).spell_check(!args.no_spell_check);
    if let Some(category) = &args.category {
        request = request.category(category.as_str());
    }
    if let Some(size) = args.size {
        request = request.size(size);
    }

    let response = orchestrator.search(&request).await;
    output_search_response(&response, cli_args)?;
    Ok(())
}

/// Map and upsert every article of a JSONL file.
async fn index(args: &IndexArgs, config: &NewsfindConfig, cli_args: &NewsfindArgs) -> Result<()> {
    if config.backend.url.is_none() {
        anyhow::bail!("indexing needs backend.url in the configuration");
    }
    let orchestrator = config.build_orchestrator()?;

    let start_time = Instant::now();
    let articles = load_articles(&args.article_file)
        .with_context(|| format!("failed to read {}", args.article_file.display()))?;
    if cli_args.verbosity() > 1 {
        println!(
            "Indexing {} articles from: {}",
            articles.len(),
            args.article_file.display()
        );
    }

    if !args.no_create {
        orchestrator
            .create_index()
            .await
            .context("failed to create the index")?;
    }

    let flags = orchestrator.index_articles(&articles).await;
    let indexed = flags.iter().filter(|ok| **ok).count();

    output_result(
        "Articles indexed",
        &IndexingSummary {
            file: args.article_file.to_string_lossy().to_string(),
            articles_read: articles.len(),
            indexed,
            rejected: articles.len() - indexed,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )?;
    Ok(())
}

/// Correct a query with the configured dictionary.
fn correct(args: &CorrectArgs, config: &NewsfindConfig, cli_args: &NewsfindArgs) -> Result<()> {
    let orchestrator = config.build_orchestrator()?;
    let correction = orchestrator.corrector().correct_query(&args.query);
    output_correction(&correction, cli_args)?;
    Ok(())
}

/// Print the backend query body.
fn plan(args: &PlanArgs, config: &NewsfindConfig, cli_args: &NewsfindArgs) -> Result<()> {
    let orchestrator = config.build_orchestrator()?;
    let mut options = QueryOptions::default()
        .size(args.size)
        .spell_check(!args.no_spell_check);
    if let Some(category) = &args.category {
        options = options.category(category.as_str());
    }

    let query = orchestrator.planner().build_query(&args.query, &options)?;
    let body = query.to_json();
    let json = if cli_args.pretty || cli_args.output_format == OutputFormat::Human {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config, NewsfindConfig::default());
    }

    #[test]
    fn test_load_config_error_names_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load configuration"));
    }

    #[tokio::test]
    async fn test_index_requires_backend() {
        let args = NewsfindArgs::parse_from(["newsfind", "-q", "index", "articles.jsonl"]);
        let err = execute_command(args).await.unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }

    #[tokio::test]
    async fn test_local_search_command() {
        let mut corpus = NamedTempFile::new().unwrap();
        writeln!(
            corpus,
            r#"{{"id": "1", "title": "OpenAI releases new model", "category": "technology"}}"#
        )
        .unwrap();
        let path = corpus.path().to_string_lossy().to_string();
        let args = NewsfindArgs::parse_from([
            "newsfind", "-q", "-f", "json", "search", "OpenAl", "--corpus", path.as_str(),
        ]);
        assert!(execute_command(args).await.is_ok());
    }

    #[test]
    fn test_plan_rejects_blank_query() {
        let args = NewsfindArgs::parse_from(["newsfind", "plan", " "]);
        let Command::Plan(plan_args) = &args.command else {
            panic!("expected plan");
        };
        assert!(plan(plan_args, &NewsfindConfig::default(), &args).is_err());
    }
}
