//! Built-in technical vocabulary and synonym groups.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Terms scanned for anywhere in job descriptions, lowercase. None of them
/// is an ordinary English word.
pub const VOCABULARY: &[&str] = &[
    // languages
    "python", "java", "javascript", "typescript", "golang", "rust", "c++", "c#", "ruby",
    "php", "scala", "kotlin", "powershell", "sql",
    // web and frameworks
    "angular", "vue", "node.js", "django", "fastapi", "spring boot", "graphql", "grpc",
    // data stores
    "postgresql", "postgres", "mysql", "mongodb", "redis", "elasticsearch", "kafka", "dynamodb",
    "airflow",
    // cloud and infrastructure
    "aws", "azure", "gcp", "docker", "kubernetes", "k8s", "terraform", "ansible",
    "linux", "ci/cd", "jenkins", "github actions", "prometheus", "grafana", "serverless",
    // data and ml
    "machine learning", "deep learning", "pytorch", "tensorflow", "pandas", "nlp",
    "computer vision", "llm",
    // security
    "penetration testing", "pentest", "siem", "splunk", "incident response", "threat modeling",
    "vulnerability management", "owasp", "iam", "soc 2", "cryptography",
    // practice
    "microservices", "distributed systems",
];

/// Skills that are also everyday words ("the rest of the team", "ready to
/// go"). Outside marker sections they only count when written with one of
/// the listed spellings, and not as the first word of a sentence.
pub const AMBIGUOUS_TERMS: &[(&str, &[&str])] = &[
    ("go", &["Go"]),
    ("rest", &["REST"]),
    ("spring", &["Spring"]),
    ("swift", &["Swift"]),
    ("spark", &["Spark", "PySpark"]),
    ("helm", &["Helm"]),
    ("agile", &["Agile"]),
    ("git", &["Git", "GIT"]),
    ("rails", &["Rails"]),
    ("flask", &["Flask"]),
    ("react", &["React"]),
    ("bash", &["Bash"]),
    ("snowflake", &["Snowflake"]),
];

/// Equivalence groups; every member matches every other member.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript"],
    &["typescript", "ts"],
    &["kubernetes", "k8s"],
    &["penetration testing", "pentest", "pentesting", "pen testing"],
    &["postgresql", "postgres", "psql"],
    &["aws", "amazon web services"],
    &["gcp", "google cloud", "google cloud platform"],
    &["azure", "microsoft azure"],
    &["machine learning", "ml"],
    &["artificial intelligence", "ai"],
    &["go", "golang"],
    &["node.js", "nodejs", "node"],
    &["react", "react.js", "reactjs"],
    &["vue", "vue.js", "vuejs"],
    &["c#", "csharp"],
    &["c++", "cpp"],
    &["ci/cd", "cicd", "continuous integration"],
    &["infrastructure as code", "iac"],
    &["nlp", "natural language processing"],
    &["mongodb", "mongo"],
    &["elasticsearch", "elastic search"],
    &["python", "python3"],
    &["large language models", "llm", "llms"],
    &["siem", "security information and event management"],
];

fn group_index() -> &'static HashMap<&'static str, usize> {
    static INDEX: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for (group, members) in SYNONYM_GROUPS.iter().enumerate() {
            for member in members.iter() {
                index.insert(*member, group);
            }
        }
        index
    })
}

/// Synonym group of a lowercase skill, if it belongs to one.
pub fn synonym_group(skill: &str) -> Option<usize> {
    group_index().get(skill).copied()
}

/// The name every member of a synonym group is reported under (the group's
/// first member). Skills outside any group are returned unchanged.
pub fn canonical_skill(skill: &str) -> &str {
    synonym_group(skill)
        .and_then(|group| SYNONYM_GROUPS[group].first().copied())
        .unwrap_or(skill)
}

/// True when `a` and `b` are distinct members of the same synonym group.
pub fn are_synonyms(a: &str, b: &str) -> bool {
    a != b
        && match (synonym_group(a), synonym_group(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
}
