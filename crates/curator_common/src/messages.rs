//! User-facing text (pt-BR, the language the product ships in).

// Normalizer placeholders
pub const UNTITLED: &str = "Sem título";
pub const JOURNAL_MISSING: &str = "Periódico não informado";
pub const SHORT_ABSTRACT_MISSING: &str = "Resumo não disponível na fonte.";
pub const ABSTRACT_MISSING: &str = "Abstract não disponível.";
pub const METHODOLOGY_PENDING: &str =
    "Informação metodológica não estruturada nesta fonte. Use o resumo rápido para apoio.";
pub const CONCLUSIONS_PENDING: &str =
    "Conclusões não estruturadas automaticamente para este registro.";
pub const LIMITATIONS_PENDING: &str =
    "Limitações não informadas diretamente pelo endpoint de busca.";

// Search
pub const SEARCH_FAILED: &str = "Erro ao buscar dados reais. Verifique backend/CORS.";

pub fn search_succeeded(count: usize) -> String {
    format!("{} artigos recuperados", count)
}

// Recommendation
pub const STAGE_PREPARING: &str = "Preparando contexto dos artigos...";
pub const STAGE_QUERYING: &str = "Consultando modelo LLM...";
pub const STAGE_APPLYING: &str = "Interpretando resposta e aplicando seleção...";
pub const STAGE_IDLE: &str = "Processando sua solicitação...";
pub const RECOMMEND_STARTED: &str = "Analisando correspondência entre seu pedido e os artigos.";
pub const RECOMMEND_FAILED: &str =
    "Não foi possível analisar com IA agora. Tente novamente em alguns segundos.";
pub const RECOMMEND_NOT_APPLIED: &str =
    "Falha na atualização por IA. Nenhuma alteração foi aplicada.";
pub const RECOMMEND_NONE_SELECTED: &str =
    "Nenhum artigo do conjunto atual foi recomendado; a lista completa continua visível.";
pub const DEFAULT_REASON: &str = "Aderente ao pedido.";
pub const FILTERS_CLEARED: &str = "Filtros e recomendações limpos.";

pub fn recommend_summary(count: usize) -> String {
    format!("A IA selecionou {} artigos relevantes.", count)
}

pub fn recommend_applied(count: usize) -> String {
    format!(
        "Atualização concluída: {} artigos recomendados e filtros ajustados.",
        count
    )
}

// Article assistant
pub const ANSWER_FAILED: &str =
    "Não foi possível gerar resposta LLM agora. Verifique OPENROUTER_API_KEY e tente novamente.";
pub const SUMMARY_FALLBACK_IMPLICATIONS: &str =
    "Não foi possível usar o LLM agora. Resultado exibido em fallback local.";

// Saved articles
pub const ARTICLE_SAVED: &str = "Artigo salvo com sucesso";
pub const ARTICLE_REMOVED: &str = "Artigo removido da coleção";

// Comments
pub const ANONYMOUS_AUTHOR: &str = "Usuário";
