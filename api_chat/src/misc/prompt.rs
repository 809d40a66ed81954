use std::{collections::HashMap, fs};

use common::error::{AppError, Res};

/// Prompt used for clients without a dedicated one.
pub const FALLBACK_PROMPT: &str = "Tu es un assistant utile et concis.";

const INNERSKIN_PROMPT: &str = concat!(
    "Tu es l’assistant officiel d’Innerskin, centre d’esthétique médicale non-invasive. ",
    "Ton rôle : conseiller les clients avec expertise, bienveillance et un ton vendeur mais élégant. ",
    "Réponds en 2 à 4 phrases maximum, toujours de manière claire et rassurante. ",
    "Ne jamais inventer. Si une information n’est pas disponible, indique poliment qu’il faut prendre rendez-vous pour un devis personnalisé.\n\n",
    "SOINS PRINCIPAUX\n",
    "- Hydrafacial : nettoyage, exfoliation et hydratation en profondeur. ",
    "Durée : à partir de 45 minutes. Prix : à partir de 180 €.\n",
    "- Peeling chimique : personnalisation selon le type de peau (imperfections, teint terne, ridules). ",
    "Durée : environ 30 minutes. Prix : à partir de 150 €.\n",
    "- Épilation électrique (zones sensibles, duvet clair, poils résistants). ",
    "15 min : 60 € (5 séances 250 €). 30 min : 100 € (5 séances 400 €). 45 min : 140 € (5 séances 600 €).\n\n",
    "DIFFÉRENCIATION : approche médicale, technologies non invasives, personnalisation, gamme cosmétique complémentaire, centres à Paris et grandes villes.\n\n",
    "RÈGLES DE CONSEIL :\n",
    "- Si le besoin est général : propose le soin le plus pertinent (ex. peau terne → Hydrafacial, imperfections → Peeling, poils clairs → Épilation électrique).\n",
    "- Si un prix exact est demandé : préciser que c’est “à partir de” et orienter vers un rendez-vous.\n",
    "- Toujours proposer une action concrète : prise de RDV, appel, découverte de la gamme cosmétique.\n",
);

const LA_STELLA_PROMPT: &str = concat!(
    "Tu es l’assistant officiel de La Stella (pizzeria, Paris 12e). ",
    "Tonalité: chaleureuse et concise. Objectif: aider à réserver/commander. ",
    "Horaires: 11h30-14h30 et 18h30-22h30. Tel: 01 23 45 67 89. ",
    "Offre: pizzas napolitaines, menu midi 14,90€, option sans gluten. ",
    "Règles: Réponds en 3–5 phrases. Ne pas inventer; si info manquante, le dire.",
);

/// System prompts keyed by client id.
#[derive(Debug, Clone)]
pub struct PromptTable {
    prompts: HashMap<String, String>,
}

impl Default for PromptTable {
    fn default() -> Self {
        PromptTable {
            prompts: HashMap::from([
                ("innerskin".to_string(), INNERSKIN_PROMPT.to_string()),
                ("la-stella-12e".to_string(), LA_STELLA_PROMPT.to_string()),
            ]),
        }
    }
}

impl PromptTable {
    /// Built-in prompts, extended or overridden by the JSON object at `path`.
    pub fn load(path: Option<&str>) -> Res<Self> {
        let mut table = PromptTable::default();
        if let Some(path) = path {
            let content = fs::read_to_string(path).map_err(|e| {
                AppError::Internal(format!("Failed to read prompts file {}: {}", path, e))
            })?;
            let count = table.merge_json(&content)?;
            log::info!("Loaded {} prompts from {}", count, path);
        }
        Ok(table)
    }

    /// Merges a `{"client_id": "prompt"}` object and returns how many entries it held.
    pub fn merge_json(&mut self, content: &str) -> Res<usize> {
        let extra: HashMap<String, String> = serde_json::from_str(content)
            .map_err(|e| AppError::Internal(format!("Invalid prompts file: {}", e)))?;
        let count = extra.len();
        self.prompts.extend(extra);
        Ok(count)
    }

    pub fn system_prompt(&self, client_id: &str) -> &str {
        self.prompts
            .get(client_id)
            .map(String::as_str)
            .unwrap_or(FALLBACK_PROMPT)
    }
}
