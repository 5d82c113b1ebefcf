//! The `quizforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("quizforge.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("bank")?;
    write_if_missing(Path::new("bank/sample.toml"), SAMPLE_BANK)?;
    write_if_missing(Path::new("matrix.toml"), SAMPLE_MATRIX)?;

    println!("\nNext steps:");
    println!("  1. Run: quizforge validate --bank bank --matrix matrix.toml");
    println!("  2. Run: quizforge generate --matrix matrix.toml --output paper.json");
    println!("  3. Run: quizforge score --paper paper.json --answers answers.json");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

# Exam service endpoint, used by `generate --exam` and `score --submit`.
# endpoint = "https://script.example.com/exec"
# api_key = "${QUIZFORGE_API_KEY}"

bank = "bank"
output_dir = "./quizforge-output"
timeout_secs = 30
"#;

const SAMPLE_MATRIX: &str = r#"# Each section is "[points]; grade.topic.count; ..."
multiple_choice = "[6]; 10.1.2; 10.2.1"
true_false = "[2]; 10.1.1"
short_answer = "[2]; 10.2.1"

# Tier quotas: "<M|T|S>grade.topic.count; ..."
tier3 = "M10.1.1"
tier4 = ""

duration_minutes = 20
"#;

const SAMPLE_BANK: &str = r#"[bank]
name = "Sample Grade 10"

[[questions]]
id = 1
class = "10.1.1"
type = "multiple-choice"
prompt = "What is 2 + 2?"
options = ["3", "4", "5", "22"]
answer = "4"

[[questions]]
id = 2
class = "10.1.3"
type = "multiple-choice"
prompt = "Which number is prime?"
options = ["21", "27", "29", "33"]
answer = "29"

[[questions]]
id = 3
class = "10.1.2"
type = "multiple-choice"
prompt = "What is 7 x 8?"
options = ["54", "56", "58", "64"]
answer = "56"

[[questions]]
id = 4
class = "10.2.1"
type = "multiple-choice"
prompt = "How many degrees are in a right angle?"
options = ["45", "90", "180", "360"]
answer = "90"

[[questions]]
id = 5
class = "10.1.2"
type = "true-false-set"
prompt = "Decide whether each statement is true."
statements = [
    { text = "Every even number greater than 2 is composite.", is_true = true },
    { text = "1 is a prime number.", is_true = false },
    { text = "0 is an even number.", is_true = true },
    { text = "The sum of two odd numbers is odd.", is_true = false },
]

[[questions]]
id = 6
class = "10.2.1"
type = "short-answer"
prompt = "How many sides does a hexagon have?"
answer = "6"
"#;
