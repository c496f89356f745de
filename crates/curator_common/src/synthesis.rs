//! Cross-article synthesis model and its static fallback content.

use serde::{Deserialize, Serialize};

/// Fallback narrative sections, used when generation is unavailable.
pub mod template {
    pub const INTRODUCTION: &str = "A literatura recuperada indica potencial de impacto clínico e educacional quando a intervenção é estruturada e acompanhada longitudinalmente.";
    pub const CONVERGENCES: &str = "Há convergência sobre benefícios em funcionalidade, regulação e participação quando há protocolo definido.";
    pub const DIVERGENCES: &str = "Persistem divergências sobre dosagem ideal, instrumentos de avaliação e comparabilidade entre contextos.";
    pub const GAPS: &str = "Ainda faltam estudos com maior robustez metodológica, seguimento longo e diversidade geográfica.";
    pub const RECOMMENDATIONS: &str = "Priorizar protocolos replicáveis, integração multiprofissional e métricas padronizadas de desfecho.";
    pub const REFERENCE_UNAVAILABLE: &str =
        "Não foi possível gerar referências com LLM neste momento.";
}

/// Minimum number of articles a synthesis needs
pub const MIN_SYNTHESIS_ARTICLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SynthesisKind {
    #[default]
    #[serde(rename = "Revisao comparativa")]
    ComparativeReview,
    #[serde(rename = "Mapa de evidencias")]
    EvidenceMap,
    #[serde(rename = "Aplicacao clinica")]
    ClinicalApplication,
}

impl SynthesisKind {
    pub fn label(&self) -> &'static str {
        match self {
            SynthesisKind::ComparativeReview => "Revisao comparativa",
            SynthesisKind::EvidenceMap => "Mapa de evidencias",
            SynthesisKind::ClinicalApplication => "Aplicacao clinica",
        }
    }
}

impl std::str::FromStr for SynthesisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comparative" | "revisao comparativa" => Ok(SynthesisKind::ComparativeReview),
            "evidence-map" | "mapa de evidencias" => Ok(SynthesisKind::EvidenceMap),
            "clinical" | "aplicacao clinica" => Ok(SynthesisKind::ClinicalApplication),
            other => Err(format!("unknown synthesis kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SynthesisSize {
    #[serde(rename = "Curto")]
    Short,
    #[default]
    #[serde(rename = "Medio")]
    Medium,
    #[serde(rename = "Longo")]
    Long,
}

impl SynthesisSize {
    pub fn label(&self) -> &'static str {
        match self {
            SynthesisSize::Short => "Curto",
            SynthesisSize::Medium => "Medio",
            SynthesisSize::Long => "Longo",
        }
    }
}

impl std::str::FromStr for SynthesisSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "curto" => Ok(SynthesisSize::Short),
            "medium" | "medio" => Ok(SynthesisSize::Medium),
            "long" | "longo" => Ok(SynthesisSize::Long),
            other => Err(format!("unknown synthesis size: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisOrigin {
    #[default]
    Generated,
    Fallback,
}

/// Structured synthesis. Wire names follow the service contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisReport {
    #[serde(rename = "introducao", default)]
    pub introduction: String,
    #[serde(rename = "convergencias", default)]
    pub convergences: String,
    #[serde(rename = "divergencias", default)]
    pub divergences: String,
    #[serde(rename = "lacunas", default)]
    pub gaps: String,
    #[serde(rename = "recomendacoes", default)]
    pub recommendations: String,
    #[serde(rename = "referencias_apa", default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub origin: SynthesisOrigin,
}

impl SynthesisReport {
    /// Fixed canned content; does not depend on the input articles.
    pub fn fallback() -> Self {
        Self {
            introduction: template::INTRODUCTION.to_string(),
            convergences: template::CONVERGENCES.to_string(),
            divergences: template::DIVERGENCES.to_string(),
            gaps: template::GAPS.to_string(),
            recommendations: template::RECOMMENDATIONS.to_string(),
            references: vec![template::REFERENCE_UNAVAILABLE.to_string()],
            origin: SynthesisOrigin::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == SynthesisOrigin::Fallback
    }

    /// Sections in display order, labelled.
    pub fn sections(&self) -> [(&'static str, &str); 5] {
        [
            ("Introducao", self.introduction.as_str()),
            ("Convergencias", self.convergences.as_str()),
            ("Divergencias", self.divergences.as_str()),
            ("Lacunas", self.gaps.as_str()),
            ("Recomendacoes", self.recommendations.as_str()),
        ]
    }
}
