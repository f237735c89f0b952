//! Article text: drafts, title extraction, and the local template fallback.

use crate::config::GenerationRequest;

/// A generated (or templated) article body plus its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDraft {
    pub title: String,
    pub body: String,
}

impl TextDraft {
    /// Build a draft from a Markdown body, deriving the title from the first
    /// top-level heading. Falls back to the topic when the body has none.
    pub fn from_body(topic: &str, body: String) -> Self {
        let title = extract_title(topic, &body);
        Self { title, body }
    }
}

/// First `# ` heading of the body, marker stripped and trimmed; else the
/// topic verbatim.
pub fn extract_title(topic: &str, body: &str) -> String {
    for line in body.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("# ") {
            let heading = rest.trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }
    topic.to_string()
}

/// Deterministic local article used when every text adapter fails. Plain
/// string assembly over fixed sections, so it cannot fail.
pub fn template_article(request: &GenerationRequest) -> TextDraft {
    let topic = request.topic.trim();
    let category = request
        .category
        .as_deref()
        .unwrap_or("General")
        .trim()
        .to_string();

    let body = format!(
        "# {topic}\n\
         \n\
         ## Introducción\n\
         \n\
         {topic} es un tema cada vez más relevante dentro del ámbito de {category}. \
         En este artículo repasamos qué es, por qué importa y cómo abordarlo de forma práctica.\n\
         \n\
         ## Puntos clave\n\
         \n\
         - Qué problemas resuelve {topic} y en qué contextos aporta más valor.\n\
         - Criterios para evaluar soluciones y proveedores.\n\
         - Errores habituales al empezar y cómo evitarlos.\n\
         \n\
         ## Implementación\n\
         \n\
         Una puesta en marcha ordenada empieza por un análisis de necesidades, sigue con una \
         prueba acotada y termina con un despliegue gradual. Documentar cada fase facilita el \
         mantenimiento posterior y la formación del equipo.\n\
         \n\
         ## Mantenimiento\n\
         \n\
         Revisa periódicamente el estado del sistema, aplica actualizaciones y registra las \
         incidencias. Un calendario de revisiones sencillo evita la mayoría de los problemas \
         antes de que afecten al servicio.\n\
         \n\
         ## Conclusión\n\
         \n\
         {topic} bien planteado aporta resultados medibles sin grandes riesgos. Empieza con un \
         alcance pequeño, mide y amplía a partir de datos reales.\n"
    );

    TextDraft::from_body(topic, body)
}
