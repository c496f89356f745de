//! Terminal rendering for articles, assistant status and synthesis.

use curator::collections::{Collection, Comment, SavedArticle};
use curator::session::{AssistantStatus, SavedView};
use curator::state::Notice;
use curator_common::citation::apa_short;
use curator_common::{AnswerOrigin, Article, ArticleAnswer, Badge, StructuredSummary, SynthesisReport};
use owo_colors::OwoColorize;

fn badge_tag(badge: Badge) -> String {
    let tag = format!("[{}]", badge.label());
    match badge {
        Badge::Review => tag.bright_magenta().to_string(),
        Badge::Essay => tag.bright_yellow().to_string(),
        Badge::Article => tag.bright_blue().to_string(),
        Badge::OpenAccess => tag.bright_green().to_string(),
    }
}

pub fn notice(notice: &Notice) {
    if notice.is_error {
        eprintln!("{}", notice.text.bright_red());
    } else {
        println!("{}", notice.text.dimmed());
    }
}

/// One result card
pub fn article(article: &Article, reason: Option<&str>) {
    let badges: Vec<String> = article.badges.iter().map(|b| badge_tag(*b)).collect();
    let authors = if article.authors.is_empty() {
        "Autores não informados".to_string()
    } else {
        article.authors.join(", ")
    };

    println!(
        "{} {} {}",
        format!("#{:<3}", article.id).bright_cyan(),
        article.title.bold(),
        badges.join(" ")
    );
    println!("     {} • {} • {}", authors, article.year, article.journal.dimmed());
    println!("     {}", article.short_abstract);
    if let Some(reason) = reason {
        println!("     {} {}", "Sugestão IA:".bright_magenta(), reason);
    }
    println!("     {}", apa_short(article).dimmed());
}

pub fn article_list(articles: &[Article], total: usize, reason: impl Fn(u64) -> Option<String>) {
    if total == 0 {
        println!("{}", "Nenhum resultado.".yellow());
        return;
    }
    for a in articles {
        article(a, reason(a.id).as_deref());
        println!();
    }
    println!("{}", format!("{} de {} artigos visiveis", articles.len(), total).dimmed());
}

pub fn assistant_status(status: &AssistantStatus) {
    if !status.summary.is_empty() {
        println!("{}", status.summary.bright_magenta());
    }
    if let Some(message) = &status.update_message {
        match &status.updated_at {
            Some(at) => println!("{} {}", message.bold(), format!("(atualizado às {})", at).dimmed()),
            None => println!("{}", message.bold()),
        }
    }
}

pub fn saved(views: &[SavedView]) {
    if views.is_empty() {
        println!("{}", "Nenhum artigo salvo neste conjunto de resultados.".yellow());
        return;
    }
    for view in views {
        println!(
            "{} {} {}",
            format!("#{:<3}", view.article.id).bright_cyan(),
            view.article.title.bold(),
            view.saved_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        if !view.note.is_empty() {
            println!("     {} {}", "Nota:".bright_yellow(), view.note);
        }
    }
}

pub fn collections(collections: &[Collection]) {
    if collections.is_empty() {
        println!("{}", "Nenhuma coleção criada.".yellow());
        return;
    }
    for collection in collections {
        println!(
            "{} {}",
            collection.name.bold(),
            collection.created_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }
}

pub fn shelf(articles: &[SavedArticle]) {
    if articles.is_empty() {
        println!("{}", "Coleção vazia.".yellow());
        return;
    }
    for saved in articles {
        let year = if saved.year > 0 { saved.year.to_string() } else { "s.d.".to_string() };
        println!("- {} {}", saved.title.bold(), format!("({})", year).dimmed());
        if !saved.doi.is_empty() {
            println!("  {}", format!("doi:{}", saved.doi).dimmed());
        }
    }
}

pub fn comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("{}", "Sem comentários.".dimmed());
        return;
    }
    for comment in comments {
        println!(
            "{} {} {}",
            comment.author_name.bright_cyan(),
            comment.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            comment.content
        );
    }
}

pub fn synthesis(report: &SynthesisReport) {
    if report.is_fallback() {
        println!("{}", "[conteúdo padrão: síntese por IA indisponível]".bright_yellow());
    }
    for (label, text) in report.sections() {
        println!("{}", label.bold().bright_cyan());
        println!("{}\n", text);
    }
    println!("{}", "Referencias".bold().bright_cyan());
    for reference in &report.references {
        println!("  - {}", reference);
    }
}

pub fn answer(answer: &ArticleAnswer) {
    if answer.origin == AnswerOrigin::Fallback {
        println!("{}", answer.display_text().bright_yellow());
    } else {
        println!("{}", answer.display_text());
    }
}

pub fn summary(summary: &StructuredSummary) {
    if summary.origin == AnswerOrigin::Fallback {
        println!("{}", "[resumo local]".bright_yellow());
    }
    let rows = [
        ("Objetivo", &summary.objective),
        ("Metodologia", &summary.methodology),
        ("Principais achados", &summary.findings),
        ("Limitacoes", &summary.limitations),
        ("Implicacoes praticas", &summary.implications),
    ];
    for (label, text) in rows {
        println!("{} {}", format!("{}:", label).bold(), text);
    }
}
