

pub const SYSTEM_PROMPT: &str = "You extract skill keywords from expert biographies. \
Answer with a single comma-separated list and nothing else.";

const EXAMPLE_DOCUMENT: &str = "J'ai complété une maîtrise en santé publique à l'Université McGill en mai 2021, \
et je travaille depuis dans le domaine de la télémédecine. Je m'intéresse aux enjeux du numérique dans le réseau \
de la santé, ainsi qu'à l'application de l'apprentissage machine et de l'IA dans ces technologies.";

const EXAMPLE_ANSWER: &str =
    "santé publique, télémédecine, technologie numérique dans le réseau de santé, apprentissage machine, IA";


pub fn build_keywords_prompt(paragraph: &str) -> String {
    format!(
        r#"Document describing the skills of an expert:
"{EXAMPLE_DOCUMENT}"

Extract the keywords that best describe the expert's skills. Only extract keywords that appear in the text.
Return only the keywords, separated by commas.
{EXAMPLE_ANSWER}

Document describing the skills of an expert:
"{paragraph}"

Extract the keywords that best describe the expert's skills. Only extract keywords that appear in the text.
Return only the keywords, separated by commas."#
    )
}
