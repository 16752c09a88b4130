//! Prompt texts. ChefBot speaks French.

pub const CHEF_SYSTEM: &str = "Tu es un chef cuisinier français spécialisé en cuisine de saison";

pub const LUNCH_QUESTION: &str = "Que proposez-vous comme repas pour ce midi ?";

pub const DEMO_TEMPERATURES: [f32; 3] = [0.1, 0.7, 1.2];

pub const PLANNER_SYSTEM: &str = "Tu es un planificateur. Réponds UNIQUEMENT en JSON valide.";

pub const PLANNER_STRICT_SYSTEM: &str =
    "Tu dois produire UNIQUEMENT un JSON valide. Aucun texte. Aucun backtick.";

pub const STEP_SYSTEM: &str = "Tu es ChefBot en mode exécution. \
     Tu appliques l'étape et tu renvoies une sortie concise réutilisable.";

pub const SYNTHESIS_SYSTEM: &str = "Tu es ChefBot, chef cuisinier français de saison. \
     Réponds UNIQUEMENT en JSON valide.";

pub const WEEKLY_CONSTRAINTS: &str = "Menu pour 2 personnes, budget moyen, cuisine de saison, \
     sans porc, 2 repas végétariens, rapide en semaine.";

const STEPS_SHAPE: &str = r#"{
  "steps": [
    {"id": 1, "title": "...", "prompt": "..."}
  ]
}"#;

pub fn plan_user(constraints: &str) -> String {
    format!(
        "\nContraintes:\n{}\n\nRetourne un JSON EXACT:\n{}\n",
        constraints, STEPS_SHAPE
    )
}

pub fn plan_retry_user(constraints: &str) -> String {
    format!(
        "\nContraintes:\n{}\n\nRetourne EXACTEMENT:\n{}\n",
        constraints, STEPS_SHAPE
    )
}

pub fn step_user(title: &str, context_json: &str, prompt: &str) -> String {
    format!(
        "\nÉtape: {}\n\nContexte (JSON):\n{}\n\nConsigne:\n{}\n",
        title, context_json, prompt
    )
}

pub fn synthesis_user(constraints: &str, plan_json: &str, outputs_json: &str) -> String {
    format!(
        "\nContraintes:\n{}\n\nPlan:\n{}\n\nRésultats:\n{}\n\nRetourne:\n{}\n",
        constraints,
        plan_json,
        outputs_json,
        r#"{
  "weekly_menu": [
    {"day":"Lundi","lunch":"...","dinner":"...","notes":"..."}
  ]
}"#
    )
}

pub const EVAL_PLANNER_SYSTEM: &str = "Tu es ChefBot. Propose un menu/recette en français qui \
     respecte STRICTEMENT les contraintes.\n\
     Réponds en texte clair, avec: titre(s), ingrédients, étapes courtes. \
     Évite de mentionner des ingrédients interdits.";

pub const JUDGE_SYSTEM: &str = r#"Tu es un juge impartial qui évalue une réponse de ChefBot.

Tu reçois:
- question: les contraintes utilisateur
- output: la réponse produite
- expected: les critères attendus (must_avoid/must_include + autres champs potentiels)

Note chaque critère entre 0.0 et 1.0:
1) pertinence: respect des contraintes (dont must_avoid/must_include)
2) creativite: variété/originalité des recettes (sans trahir les contraintes)
3) praticite: faisable par un non-professionnel (ingrédients accessibles, étapes réalistes)

Réponds UNIQUEMENT en JSON strict:
{
  "pertinence": 0.0,
  "creativite": 0.0,
  "praticite": 0.0,
  "explanation": "une phrase courte"
}
Aucun texte hors JSON.
"#;

pub fn judge_user(question: &str, output: &str, expected_json: &str) -> String {
    format!(
        "question:\n{}\n\noutput:\n{}\n\nexpected:\n{}",
        question, output, expected_json
    )
}

pub const KITCHEN_AGENT_SYSTEM: &str = "Tu es ChefBot. Tu as accès à des outils via le mécanisme \
     officiel de tool calling.\n\
     RÈGLE ABSOLUE :\n\
     - N'écris JAMAIS de balises ou texte du style <function=...>.\n\
     - Si tu veux appeler un outil, tu dois UNIQUEMENT utiliser un tool_call structuré.\n\
     - Après avoir reçu les résultats des outils, tu donnes une réponse finale claire.\n\
     Objectif : respecter la question, utiliser les outils quand nécessaire.";

pub const FRAMEWORK_AGENT_SYSTEM: &str = "Tu es ChefBot, assistant de cuisine. Utilise les outils \
     check_fridge, get_recipe et check_dietary_info pour fonder ta réponse, puis réponds en \
     français de façon claire et structurée.";

pub const DINNER_QUESTION: &str = "Je veux un dîner pour 2 personnes, rapide (<= 25 min), \
     sans arachides, et idéalement riche en protéines. Regarde d'abord ce qu'il y a dans le \
     frigo, puis propose 2 options et donne une recette détaillée pour celle que tu recommandes.";

pub const DINNER_QUESTION_RECIPE_HINT: &str =
    "Important : tu dois appeler get_recipe pour la recette finale que tu recommandes.";

pub const WAITER_INSTRUCTIONS: &str = "Tu es serveur.\n\
     Propose menu 3 pers: entrée + plat + dessert.\n\
     - Végétarien (tag 'vegetarien')\n\
     - Sans gluten (exclude 'gluten')\n\
     - Sans contrainte\n\
     Budget 60€. Utilise menu_database et calculate.\n";

pub const GROUP_MENU_QUESTION: &str = "On est 3. Un vegetarien, un sans gluten, et moi je mange \
     de tout. Budget max 60 euros pour le groupe. Proposez-nous un menu complet.";

pub const CONVERSATION_TURNS: [&str; 3] = [
    "Bonsoir ! On est 3 (1 végétarien, 1 sans gluten, 1 sans contrainte). Tu nous suggères quoi ?",
    "Finalement le végétarien ne veut pas de risotto. Tu remplaces son plat par autre chose.",
    "Ok, maintenant fais l'addition détaillée finale pour les 3.",
];

pub const NUTRITIONIST_INSTRUCTIONS: &str = "Nutritionist.\n\
     Vérifie: pas gluten, pas fruits_a_coque, pas arachide.\n\
     OK ou fixes nécessaires?";

pub const CHEF_INSTRUCTIONS: &str = "Chef.\n\
     2 idées/service: apéro, entrée, plat, dessert.\n\
     Tout le monde mange chaque service (vegan/sans gluten).\n\
     JSON: {aperitif:[...], entree:[...], plat:[...], dessert:[...]}.";

pub const BUDGET_INSTRUCTIONS: &str = "Budget.\n\
     Menu 8 pers, 120€ max.\n\
     Exclure: gluten, fruits_a_coque, arachide.\n\
     Tag: vegan + sans_gluten si possible.\n\
     JSON: {menu:{...}, total_eur:...}.";

pub const MANAGER_INSTRUCTIONS: &str = "Manager synthétise final.\nMenu + vérif contraintes + budget.";

pub const PARTY_REQUEST: &str = "Je reçois 8 personnes samedi soir. Parmi eux : 2 vegetariens, \
     1 intolerant au gluten, 1 allergique aux fruits a coque. Budget total : 120 euros. \
     Je veux un aperitif, une entree, un plat principal et un dessert. \
     Il faut que tout le monde puisse manger chaque service.";

pub fn chef_prompt(request: &str) -> String {
    format!(
        "{}\n\n\
         Donne 2 idées par service (apéro, entrée, plat, dessert) compatibles avec toutes les contraintes.\n\
         Réponds en JSON strict: {{aperitif:[...], entree:[...], plat:[...], dessert:[...]}}.",
        request
    )
}

pub fn budget_prompt(request: &str) -> String {
    format!(
        "{}\n\n\
         Construis un menu complet via menu_database.\n\
         Hypothèse simple: on prend 8 portions par service (une par personne).\n\
         Exclus gluten + fruits_a_coque + arachide.\n\
         Utilise include_tags=['vegan','sans_gluten'] si nécessaire.\n\
         Calcule total = somme(prix_plat * 8) pour chaque service.\n\
         Réponds en JSON strict: {{menu:{{aperitif:..., entree:..., plat:..., dessert:...}}, \
         breakdown:{{...}}, total_eur:..., margin_eur:...}}.",
        request
    )
}

pub fn nutrition_prompt(request: &str, chef_out: &str, budget_out: &str) -> String {
    format!(
        "{}\n\n\
         Propositions chef: {}\n\
         Menu budget: {}\n\n\
         Valide strictement: pas de gluten, pas de fruits à coque/arachide.\n\
         Tout doit convenir aux végétariens (donc pas de viande/poisson).\n\
         Réponds en JSON strict: {{ok: true/false, issues:[...], fixes:[...], notes:[...]}}.",
        request, chef_out, budget_out
    )
}

pub fn manager_prompt(request: &str, chef_out: &str, budget_out: &str, nutri_out: &str) -> String {
    format!(
        "Synthétise une proposition finale au client.\n\n\
         DEMANDE:\n{}\n\n\
         CHEF:\n{}\n\n\
         BUDGET:\n{}\n\n\
         NUTRITION:\n{}\n\n\
         Réponse finale en français, structurée:\n\
         1) Menu final (apéro/entrée/plat/dessert)\n\
         2) Compatibilité contraintes\n\
         3) Budget (total + marge)\n\
         4) Option(s) faciles si besoin\n",
        request, chef_out, budget_out, nutri_out
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompts_embed_constraints() {
        let user = plan_user("sans porc");
        assert!(user.contains("Contraintes:\nsans porc"));
        assert!(user.contains("Retourne un JSON EXACT"));
        assert!(user.contains(r#""steps""#));

        let retry = plan_retry_user("sans porc");
        assert!(retry.contains("Retourne EXACTEMENT"));
    }

    #[test]
    fn test_party_prompts_keep_literal_braces() {
        let chef = chef_prompt("8 personnes");
        assert!(chef.starts_with("8 personnes\n\n"));
        assert!(chef.ends_with("{aperitif:[...], entree:[...], plat:[...], dessert:[...]}."));

        let manager = manager_prompt("R", "C", "B", "N");
        assert!(manager.contains("DEMANDE:\nR\n\nCHEF:\nC\n\nBUDGET:\nB\n\nNUTRITION:\nN"));
    }

    #[test]
    fn test_line_continuations_keep_words_apart() {
        assert!(KITCHEN_AGENT_SYSTEM.contains("mécanisme officiel"));
        assert!(WAITER_INSTRUCTIONS.starts_with("Tu es serveur.\nPropose menu 3 pers"));
        assert!(STEP_SYSTEM.contains("exécution. Tu appliques"));
    }
}
