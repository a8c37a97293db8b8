//! Initialize a new LinkLang project

use anyhow::Result;
use std::path::Path;
use tokio::fs;

use linklang_core::config::CONFIG_FILE;

const EXAMPLE_CHAIN: &str = r#"// Example chain: answer a question with a tool-enabled model

schema Answer {
    summary: string,
    confidence: number
}

def WeatherTool = Tool(
    name="get_weather",
    desc="Look up the current weather for a city",
    func=getWeather,
    schema={ type: "object", properties: { city: { type: "string" } }, required: ["city"] }
)

def llm = Model(model_name="qwen2.5")
def agent = llm @ bind(tools=[WeatherTool])
def ask = Prompt("Answer the question: {{ question }}")

chain Main = Input >> ask >> agent >> StringOutput
"#;

/// Run the init command
pub async fn run(path: &str, name: Option<&str>) -> Result<()> {
    let project_dir = Path::new(path);

    // Create directory if it doesn't exist
    if !project_dir.exists() {
        fs::create_dir_all(project_dir).await?;
    }

    // Get absolute path for deriving name
    let abs_path = fs::canonicalize(project_dir).await?;

    // Derive project name from directory name if not provided
    let project_name = match name {
        Some(n) => n.to_string(),
        None => abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine project name from path"))?,
    };

    // Check if already initialized
    if project_dir.join(CONFIG_FILE).exists() {
        anyhow::bail!(
            "Directory '{}' already contains a {}",
            project_dir.display(),
            CONFIG_FILE
        );
    }

    tracing::info!("Creating new LinkLang project: {}", project_name);

    fs::create_dir_all(project_dir.join("chains")).await?;

    let config = format!(
        r#"# LinkLang Project Configuration
name: {project_name}
version: "0.1.0"

# Where .chain sources live and where generated modules go
sources: chains
output: dist

target:
  runtime_module: "../dist/tinychain.esm.js"
  invoke_method: async_invoke
"#
    );
    fs::write(project_dir.join(CONFIG_FILE), config).await?;
    fs::write(project_dir.join("chains/example.chain"), EXAMPLE_CHAIN).await?;

    let gitignore = r#"# Generated modules
dist/

# IDE
.idea/
.vscode/
*.swp
"#;
    fs::write(project_dir.join(".gitignore"), gitignore).await?;

    tracing::info!("✓ Project initialized at {}", abs_path.display());
    tracing::info!("  Next: linklang --config {} compile", project_dir.join(CONFIG_FILE).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_chain_compiles() {
        let module = linklang_codegen::compile_str("example.chain", EXAMPLE_CHAIN).unwrap();
        assert!(module.code.contains("export async function run_Main"));
    }

    #[tokio::test]
    async fn test_init_refuses_existing_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        run(path, Some("demo")).await.unwrap();

        let err = run(path, Some("demo")).await.unwrap_err();
        assert!(err.to_string().contains("already contains"));
    }

    #[tokio::test]
    async fn test_init_derives_name_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("weather-bot");
        run(project.to_str().unwrap(), None).await.unwrap();

        let config = linklang_core::Config::load(&project).unwrap();
        assert_eq!(config.project.name, "weather-bot");
        assert!(project.join("chains/example.chain").exists());
    }
}
