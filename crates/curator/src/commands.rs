//! Command handlers for the curator CLI.

use anyhow::{bail, Result};
use curator::recommend::RecommendOutcome;
use curator::repl::{self, ReplCommand};
use curator::search::SearchOutcome;
use curator::synthesize::SynthesisOutcome;
use curator::{Config, HttpClient, Session, StateFile};
use curator_common::{
    AccessFilter, Badge, CitationFormat, KindFilter, SynthesisKind, SynthesisSize,
};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::output;
use crate::FilterArgs;

/// Session wired to the HTTP backend. With `persist`, the history and saved
/// list are restored from (and later written back to) the state file.
async fn open_session(config: &Config, persist: bool) -> (Session, Option<StateFile>) {
    let http = Arc::new(HttpClient::new(&config.service));
    info!("using backend {}", http.base_url());
    let session = Session::new(config, http.clone(), http);

    let state_file = config
        .storage
        .state_path()
        .filter(|_| persist)
        .map(StateFile::new);
    if let Some(file) = &state_file {
        session.restore(file.load()).await;
    }
    (session, state_file)
}

async fn close_session(session: &Session, state_file: Option<StateFile>) {
    if let Some(file) = state_file {
        if let Err(e) = file.save(&session.persisted().await) {
            warn!("could not save state: {:#}", e);
        }
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Drive `work` while a spinner shows `message()`
async fn with_spinner<F, M, MF>(work: F, message: M) -> F::Output
where
    F: Future,
    M: Fn() -> MF,
    MF: Future<Output = String>,
{
    let spinner = spinner();
    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let output = loop {
        tokio::select! {
            out = &mut work => break out,
            _ = ticker.tick() => spinner.set_message(message().await),
        }
    };
    spinner.finish_and_clear();
    output
}

async fn run_search(session: &Session, query: &str) -> Result<()> {
    let outcome = with_spinner(session.search(query), || async move {
        format!("Buscando \"{}\"...", query)
    })
    .await;
    if let Some(notice) = session.notice().await {
        output::notice(&notice);
    }
    match outcome {
        SearchOutcome::Applied { .. } => Ok(()),
        SearchOutcome::Skipped => bail!("empty search term"),
        SearchOutcome::Failed | SearchOutcome::Discarded => bail!("search failed"),
    }
}

async fn apply_filter_args(session: &Session, args: &FilterArgs) -> Result<()> {
    let kind = match args.kind.as_deref() {
        None => KindFilter::All,
        Some(label) => match Badge::from_label(label) {
            Some(badge) if badge.is_kind() => KindFilter::Only(badge),
            _ => bail!("unknown kind: {}", label),
        },
    };
    let access = if args.open_access {
        AccessFilter::Open
    } else if args.closed {
        AccessFilter::Closed
    } else {
        AccessFilter::All
    };
    session
        .edit_filters(|c| {
            c.kind = kind;
            c.access = access;
            c.journal = args.journal.clone().unwrap_or_default();
            c.author = args.author.clone().unwrap_or_default();
            c.year_min = args.year_min;
            c.year_max = args.year_max;
        })
        .await;
    Ok(())
}

async fn print_visible(session: &Session) {
    let visible = session.visible().await;
    let total = session.articles().await.len();
    let criteria = session.criteria().await;
    let reasons = session.store().filters().read().await.ai_reasons.clone();
    output::article_list(&visible, total, |id| {
        if criteria.ai_ids.contains(&id) {
            reasons.get(&id).cloned()
        } else {
            None
        }
    });
}

async fn print_recommendation(session: &Session, instruction: &str) {
    let outcome = with_spinner(session.recommend(instruction), || async move {
        session.assistant_status().await.stage
    })
    .await;
    if outcome == RecommendOutcome::Skipped {
        println!("{}", "Nada a analisar: pedido vazio ou sem resultados.".yellow());
        return;
    }
    output::assistant_status(&session.assistant_status().await);
    println!();
    print_visible(session).await;
}

async fn print_synthesis(session: &Session, kind: SynthesisKind, size: SynthesisSize) {
    let outcome = with_spinner(session.synthesize_saved(kind, size), || async move {
        "Gerando síntese...".to_string()
    })
    .await;
    match outcome {
        SynthesisOutcome::Skipped => {
            println!("{}", "Salve ao menos 2 artigos para gerar a síntese.".yellow())
        }
        _ => {
            if let Some(report) = session.synthesis_report().await {
                output::synthesis(&report);
            }
        }
    }
}

/// Handle `search`
pub async fn search(config: &Config, query: &str, filters: &FilterArgs) -> Result<()> {
    let (session, state_file) = open_session(config, true).await;
    let result = run_search(&session, query).await;
    if result.is_ok() {
        apply_filter_args(&session, filters).await?;
        print_visible(&session).await;
    }
    close_session(&session, state_file).await;
    result
}

/// Handle `recommend`
pub async fn recommend(config: &Config, query: &str, instruction: &str) -> Result<()> {
    let (session, state_file) = open_session(config, true).await;
    let result = run_search(&session, query).await;
    if result.is_ok() {
        print_recommendation(&session, instruction).await;
    }
    close_session(&session, state_file).await;
    result
}

/// Handle `synthesize`
pub async fn synthesize(
    config: &Config,
    query: &str,
    ids: &[u64],
    kind: SynthesisKind,
    size: SynthesisSize,
) -> Result<()> {
    // only the given ids take part, so the stored saved list stays out of it
    let (session, state_file) = open_session(config, false).await;
    let result = run_search(&session, query).await;
    if result.is_ok() {
        for id in ids {
            if let Err(e) = session.save(*id).await {
                eprintln!("{}", e.to_string().bright_red());
            }
        }
        print_synthesis(&session, kind, size).await;
    }
    close_session(&session, state_file).await;
    result
}

/// Handle `export`
pub async fn export(
    config: &Config,
    query: &str,
    format: CitationFormat,
    filters: &FilterArgs,
) -> Result<()> {
    let (session, state_file) = open_session(config, true).await;
    let result = run_search(&session, query).await;
    if result.is_ok() {
        apply_filter_args(&session, filters).await?;
        println!("{}", session.export_visible(format).await);
    }
    close_session(&session, state_file).await;
    result
}

/// Handle `repl`
pub async fn repl(config: &Config) -> Result<()> {
    let (session, state_file) = open_session(config, true).await;
    println!(
        "{} {}",
        format!("curator v{}", curator::VERSION).bold(),
        "(digite 'help' para comandos)".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".bright_cyan());
        use std::io::Write;
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match repl::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e.bright_red());
                continue;
            }
        };
        if command == ReplCommand::Quit {
            break;
        }
        if let Err(e) = run_repl_command(&session, command).await {
            eprintln!("{}", format!("{:#}", e).bright_red());
        }
    }

    close_session(&session, state_file).await;
    Ok(())
}

async fn run_repl_command(session: &Session, command: ReplCommand) -> Result<()> {
    match command {
        ReplCommand::Search(term) => {
            run_search(session, &term).await?;
            print_visible(session).await;
        }
        ReplCommand::List => print_visible(session).await,
        ReplCommand::Kind(kind) => {
            session.edit_filters(|c| c.kind = kind).await;
            print_visible(session).await;
        }
        ReplCommand::Access(access) => {
            session.edit_filters(|c| c.access = access).await;
            print_visible(session).await;
        }
        ReplCommand::Journal(text) => {
            session.edit_filters(|c| c.journal = text).await;
            print_visible(session).await;
        }
        ReplCommand::Author(text) => {
            session.edit_filters(|c| c.author = text).await;
            print_visible(session).await;
        }
        ReplCommand::Years(min, max) => {
            session
                .edit_filters(|c| {
                    c.year_min = min;
                    c.year_max = max;
                })
                .await;
            if let Some(span) = session.effective_years().await {
                println!("{}", format!("Anos: {} - {}", span.min, span.max).dimmed());
            }
            print_visible(session).await;
        }
        ReplCommand::Clear => {
            session.clear_filters().await;
            output::assistant_status(&session.assistant_status().await);
        }
        ReplCommand::Recommend(instruction) => print_recommendation(session, &instruction).await,
        ReplCommand::Save(id) => {
            if session.save(id).await? {
                println!("{}", curator_common::messages::ARTICLE_SAVED.bright_green());
            }
        }
        ReplCommand::Remove(id) => {
            if session.remove(id).await {
                println!("{}", curator_common::messages::ARTICLE_REMOVED.bright_green());
            }
        }
        ReplCommand::Note(id, text) => session.update_note(id, &text).await?,
        ReplCommand::Saved => output::saved(&session.saved_articles().await),
        ReplCommand::Synthesize(kind, size) => print_synthesis(session, kind, size).await,
        ReplCommand::Ask(id, question) => {
            let answer = with_spinner(session.ask(id, &question), || async move {
                "Consultando modelo LLM...".to_string()
            })
            .await?;
            match answer {
                Some(answer) => output::answer(&answer),
                None => println!("{}", "Pergunta vazia.".yellow()),
            }
        }
        ReplCommand::Summary(id) => {
            let summary = with_spinner(session.quick_summary(id), || async move {
                "Gerando resumo rapido...".to_string()
            })
            .await?;
            output::summary(&summary);
        }
        ReplCommand::History => {
            for (i, term) in session.history().await.iter().enumerate() {
                println!("{:>2}. {}", i + 1, term);
            }
        }
        ReplCommand::Collections => output::collections(&session.collections().await?),
        ReplCommand::NewCollection(name) => {
            let collection = session.create_collection(&name).await?;
            println!("{} {}", "Coleção criada:".bright_green(), collection.name);
        }
        ReplCommand::Collect(id, name) => {
            let saved = session.collect(id, &name).await?;
            println!("{} {}", "Adicionado à coleção:".bright_green(), saved.title);
        }
        ReplCommand::Shelf(name) => output::shelf(&session.collection_articles(&name).await?),
        ReplCommand::Comment(id, text) => {
            session.comment(id, &text).await?;
            output::comments(&session.comments(id).await?);
        }
        ReplCommand::Comments(id) => output::comments(&session.comments(id).await?),
        ReplCommand::Export(format) => println!("{}", session.export_visible(format).await),
        ReplCommand::Help => println!("{}", repl::HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}
