

use std::fmt::Write;

use lazy_static::lazy_static;


pub const SYSTEM_PROMPT: &str = r#"You help a healthcare artificial-intelligence research network staff new projects.
Given a project description, you list the generic expert profiles the project needs.
Always respond with valid JSON."#;


pub struct WorkedExample {
    pub question: &'static str,
    pub profiles: &'static [&'static str],
}


pub const WORKED_EXAMPLES: &[WorkedExample] = &[
    WorkedExample {
        question: "I want to develop a tool to predict the occupancy rate of emergency beds?",
        profiles: &[
            "Researcher in operational mathematics",
            "Specialist in modeling and machine learning",
            "Process and optimization engineer",
            "Project manager for clinical needs analysis",
            "Data security and privacy expert",
            "Software developer for system integration",
            "Implementation and clinical validation specialist",
        ],
    },
    WorkedExample {
        question: "I want to optimize the care of individuals born prematurely: better screening, better intervention?",
        profiles: &[
            "Researcher in obstetric medicine",
            "Epidemiology researcher",
            "Screening algorithms developer",
            "Researcher in neonatal medicine and pediatrics",
            "Specialist in artificial intelligence and data analysis",
            "Researcher in public health and health policies",
            "Specialist in medical ethics and data confidentiality",
        ],
    },
    WorkedExample {
        question: "I am looking for an AI expert to work on the personalization of radiopeptide therapy for patients with neuroendocrine tumors?",
        profiles: &[
            "Oncologist specializing in neuroendocrine tumors",
            "Expert in artificial intelligence applied to medicine",
            "Medical physicist",
            "Expert in medical image processing",
            "Health data scientist",
            "Data security and privacy expert",
        ],
    },
    WorkedExample {
        question: "I work in rehabilitation and I am looking for a developer who could add a chatbot to one of my software tools available online.",
        profiles: &[
            "Software developer specializing in health",
            "Natural language processing specialist",
            "Data security and compliance specialist",
            "Systems integration specialist",
            "Chatbot developer specializing in user experience",
        ],
    },
    WorkedExample {
        question: "I am a cardiologist and I am looking to collaborate to develop an ML/AI algorithm to help me quantify cardiac fibrosis in MRI imaging.",
        profiles: &[
            "Cardiologist specializing in cardiac imaging",
            "Medical image processing engineer",
            "Expert in machine learning and artificial intelligence",
            "Health data scientist",
            "Data security and privacy expert",
        ],
    },
];

lazy_static! {
    static ref PREAMBLE: String = build_preamble(WORKED_EXAMPLES);
}


fn build_preamble(examples: &[WorkedExample]) -> String {
    let mut out = String::new();
    for example in examples {
        let _ = writeln!(out, "Question: {}", example.question);
        let _ = writeln!(out, "Are follow up questions needed here: Yes.");
        for profile in example.profiles {
            let _ = writeln!(out, "Follow up: Is a {profile} important for the project?");
            let _ = writeln!(out, "Intermediate answer: Yes.");
        }
        let answer = serde_json::json!({ "profiles": example.profiles });
        let _ = writeln!(out, "So the final answer is: {answer}");
        out.push('\n');
    }
    out
}


pub fn build_profiles_prompt(question: &str) -> String {
    format!(
        r#"{preamble}The examples above show how to answer. For the question below, think about the needs of the project and suggest the key experts that fulfil them.
Make sure every expert profile you suggest is important and relevant to the question.
Return only the final answer as a JSON object of the form {{"profiles": ["profile 1", "profile 2"]}} and nothing else.

Question: {question}"#,
        preamble = PREAMBLE.as_str(),
        question = question.trim(),
    )
}
