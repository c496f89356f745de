//! Interactive command parsing.

use curator_common::{AccessFilter, Badge, CitationFormat, KindFilter, SynthesisKind, SynthesisSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    List,
    Kind(KindFilter),
    Access(AccessFilter),
    Journal(String),
    Author(String),
    /// `None` resets the bound to the observed extreme
    Years(Option<i32>, Option<i32>),
    Clear,
    Recommend(String),
    Save(u64),
    Remove(u64),
    Note(u64, String),
    Saved,
    Synthesize(SynthesisKind, SynthesisSize),
    Ask(u64, String),
    Summary(u64),
    History,
    Collections,
    NewCollection(String),
    /// Article id, collection name
    Collect(u64, String),
    Shelf(String),
    Comment(u64, String),
    Comments(u64),
    Export(CitationFormat),
    Help,
    Quit,
}

pub const HELP: &str = "\
search <termo>            buscar artigos
list                      listar resultados visiveis
kind <tipo|all>           filtrar por tipo (revisao, ensaio, artigo)
access <all|open|closed>  filtrar por acesso
journal <texto>           filtrar por periodico (vazio limpa)
author <texto>            filtrar por autor (vazio limpa)
years <min|-> <max|->     faixa de anos
clear                     limpar filtros e recomendacoes
recommend <pedido>        selecionar artigos com IA
save <id> | remove <id>   salvar / remover artigo
note <id> <texto>         nota no artigo salvo
saved                     listar salvos
synth [tipo] [tamanho]    sintese dos salvos
ask <id> <pergunta>       perguntar sobre um artigo
summary <id>              resumo rapido
history                   buscas recentes
collections               listar colecoes
collection <nome>         criar colecao
collect <id> <colecao>    copiar artigo para a colecao
shelf <colecao>           artigos da colecao
comment <id> <texto>      comentar um artigo
comments <id>             comentarios do artigo
export <apa|abnt|bibtex>  exportar referencias visiveis
quit                      sair";

fn parse_id(text: &str) -> Result<u64, String> {
    text.trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid article id: {}", text.trim()))
}

fn parse_bound(text: Option<&str>) -> Result<Option<i32>, String> {
    match text.map(str::trim) {
        None | Some("") | Some("-") => Ok(None),
        Some(year) => year
            .parse::<i32>()
            .map(Some)
            .map_err(|_| format!("invalid year: {}", year)),
    }
}

fn split_id_and_text(rest: &str) -> Result<(u64, String), String> {
    let rest = rest.trim();
    let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((parse_id(id)?, text.trim().to_string()))
}

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_lowercase().as_str() {
        "search" | "s" => ReplCommand::Search(rest.to_string()),
        "list" | "ls" => ReplCommand::List,
        "kind" | "type" => {
            if rest.is_empty() || rest.eq_ignore_ascii_case("all") || rest.eq_ignore_ascii_case("todos") {
                ReplCommand::Kind(KindFilter::All)
            } else {
                match Badge::from_label(rest) {
                    Some(badge) if badge.is_kind() => ReplCommand::Kind(KindFilter::Only(badge)),
                    _ => return Err(format!("unknown kind: {}", rest)),
                }
            }
        }
        "access" | "oa" => match rest.to_lowercase().as_str() {
            "" | "all" | "todos" => ReplCommand::Access(AccessFilter::All),
            "open" => ReplCommand::Access(AccessFilter::Open),
            "closed" | "fechado" => ReplCommand::Access(AccessFilter::Closed),
            other => return Err(format!("unknown access filter: {}", other)),
        },
        "journal" => ReplCommand::Journal(rest.to_string()),
        "author" => ReplCommand::Author(rest.to_string()),
        "years" => {
            let mut parts = rest.split_whitespace();
            ReplCommand::Years(parse_bound(parts.next())?, parse_bound(parts.next())?)
        }
        "clear" => ReplCommand::Clear,
        "recommend" | "ai" => ReplCommand::Recommend(rest.to_string()),
        "save" => ReplCommand::Save(parse_id(rest)?),
        "remove" | "rm" => ReplCommand::Remove(parse_id(rest)?),
        "note" => {
            let (id, text) = split_id_and_text(rest)?;
            ReplCommand::Note(id, text)
        }
        "saved" => ReplCommand::Saved,
        "synth" | "synthesize" => {
            let mut parts = rest.split_whitespace();
            let kind = match parts.next() {
                Some(k) => k.parse::<SynthesisKind>()?,
                None => SynthesisKind::default(),
            };
            let size = match parts.next() {
                Some(s) => s.parse::<SynthesisSize>()?,
                None => SynthesisSize::default(),
            };
            ReplCommand::Synthesize(kind, size)
        }
        "ask" => {
            let (id, text) = split_id_and_text(rest)?;
            ReplCommand::Ask(id, text)
        }
        "summary" => ReplCommand::Summary(parse_id(rest)?),
        "history" => ReplCommand::History,
        "collections" => ReplCommand::Collections,
        "collection" => {
            if rest.is_empty() {
                return Err("collection name is empty".to_string());
            }
            ReplCommand::NewCollection(rest.to_string())
        }
        "collect" => {
            let (id, name) = split_id_and_text(rest)?;
            if name.is_empty() {
                return Err("collection name is empty".to_string());
            }
            ReplCommand::Collect(id, name)
        }
        "shelf" => ReplCommand::Shelf(rest.to_string()),
        "comment" => {
            let (id, text) = split_id_and_text(rest)?;
            ReplCommand::Comment(id, text)
        }
        "comments" => ReplCommand::Comments(parse_id(rest)?),
        "export" => {
            let format = if rest.is_empty() { "apa" } else { rest };
            ReplCommand::Export(format.parse::<CitationFormat>()?)
        }
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {} (try 'help')", other)),
    };
    Ok(Some(command))
}
