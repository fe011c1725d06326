// CLI command handlers

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use dialoguer::Editor;
use std::io::Write;
use std::path::Path;

use crate::client::ConfigClient;
use crate::config::{
    ApplyArgs, ApplyResource, CliArgs, Command, DeleteResource, EditResource, GetResource,
};
use crate::models::{tenant_display, ConfigId, ConfigListItem, DEFAULT_GROUP};

/// Type used when nothing better is known
const FALLBACK_TYPE: &str = "text";

/// Namespace and group shared by every command
#[derive(Debug, Clone)]
pub struct Scope {
    pub namespace: String,
    pub group: Option<String>,
}

impl Scope {
    fn group(&self) -> &str {
        self.group.as_deref().unwrap_or(DEFAULT_GROUP)
    }

    fn config_id(&self, data_id: &str) -> ConfigId {
        ConfigId::new(&self.namespace, self.group(), data_id)
    }
}

/// Run a parsed command
pub async fn execute(client: &ConfigClient, scope: &Scope, command: &Command) -> Result<()> {
    match command {
        Command::Get {
            resource: GetResource::Config { data_id, all },
        } => {
            if *all {
                let items = client
                    .all_config(&scope.namespace, scope.group.as_deref())
                    .await
                    .context("Failed to list configs")?;
                print!("{}", render_table(&items));
                return Ok(());
            }

            let data_id = data_id
                .as_deref()
                .context("Please specify a dataId, or use --all to list configs")?;
            let detail = client
                .get(&scope.config_id(data_id))
                .await
                .with_context(|| format!("Failed to get config '{}'", data_id))?;
            println!("{}", detail.content);
            Ok(())
        }

        Command::Apply {
            resource: ApplyResource::Config(args),
        } => apply(client, scope, args).await,

        Command::Edit {
            resource: EditResource::Config {
                data_id,
                config_type,
            },
        } => edit(client, scope, data_id, config_type.as_deref()).await,

        Command::Delete {
            resource: DeleteResource::Config { data_id },
        } => {
            client
                .delete_config(&scope.config_id(data_id))
                .await
                .with_context(|| format!("Failed to delete config '{}'", data_id))?;
            println!("Config '{}' deleted", data_id);
            Ok(())
        }

        Command::Completion { shell } => write_completion(*shell, &mut std::io::stdout()),

        Command::CompleteDataIds { prefix } => {
            for data_id in complete_data_ids(client, scope, prefix).await {
                println!("{}", data_id);
            }
            Ok(())
        }
    }
}

/// Write the completion script for `shell`
pub fn write_completion(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut command = CliArgs::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
    Ok(())
}

/// DataIds in the scope starting with `prefix`.
/// Lookup failures yield no candidates; completion must never error out.
pub async fn complete_data_ids(client: &ConfigClient, scope: &Scope, prefix: &str) -> Vec<String> {
    match client
        .all_config(&scope.namespace, scope.group.as_deref())
        .await
    {
        Ok(items) => items
            .into_iter()
            .map(|item| item.data_id)
            .filter(|data_id| data_id.starts_with(prefix))
            .collect(),
        Err(e) => {
            tracing::debug!("DataId completion lookup failed: {}", e);
            Vec::new()
        }
    }
}

async fn apply(client: &ConfigClient, scope: &Scope, args: &ApplyArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let data_id = match args.data_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => args
            .file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .with_context(|| format!("Cannot derive dataId from {}", args.file.display()))?,
    };

    let config_type = match args.config_type.as_deref() {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => detect_config_type(&args.file).to_string(),
    };

    client
        .edit(&scope.config_id(&data_id), &content, &config_type)
        .await
        .with_context(|| format!("Failed to apply config '{}'", data_id))?;

    println!("Config '{}' applied", data_id);
    Ok(())
}

async fn edit(
    client: &ConfigClient,
    scope: &Scope,
    data_id: &str,
    config_type: Option<&str>,
) -> Result<()> {
    let id = scope.config_id(data_id);
    let detail = client
        .get(&id)
        .await
        .with_context(|| format!("Failed to get config '{}'", data_id))?;

    let stored_type = detail
        .content_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(FALLBACK_TYPE);

    let edited = Editor::new()
        .extension(&format!(".{}", stored_type))
        .trim_newlines(false)
        .edit(&detail.content)
        .context("Failed to launch editor")?;

    let edited = match edited {
        Some(edited) if detail.is_modified(&edited) => edited,
        _ => {
            println!("Config unchanged");
            return Ok(());
        }
    };

    let upload_type = config_type.filter(|t| !t.is_empty()).unwrap_or(stored_type);
    client
        .edit(&id, &edited, upload_type)
        .await
        .with_context(|| format!("Failed to update config '{}'", data_id))?;

    println!("Config '{}' updated", data_id);
    Ok(())
}

/// Guess the config type from a file extension
pub fn detect_config_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => "yaml",
        "properties" => "properties",
        "json" => "json",
        "xml" => "xml",
        "html" | "htm" => "html",
        "toml" => "toml",
        _ => FALLBACK_TYPE,
    }
}

/// Render listing rows as an aligned table
pub fn render_table(items: &[ConfigListItem]) -> String {
    let header = ["DataID", "GROUP", "NAMESPACE"];
    let rows: Vec<[&str; 3]> = items
        .iter()
        .map(|item| {
            [
                item.data_id.as_str(),
                item.group.as_str(),
                tenant_display(&item.tenant),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = format!(
            "{:<w0$}  {:<w1$}  {}",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1]
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_config_type() {
        assert_eq!(detect_config_type(Path::new("app.yaml")), "yaml");
        assert_eq!(detect_config_type(Path::new("app.YML")), "yaml");
        assert_eq!(detect_config_type(Path::new("db.properties")), "properties");
        assert_eq!(detect_config_type(Path::new("/etc/x/settings.json")), "json");
        assert_eq!(detect_config_type(Path::new("page.htm")), "html");
        assert_eq!(detect_config_type(Path::new("Cargo.toml")), "toml");
        assert_eq!(detect_config_type(Path::new("app.conf")), "text");
        assert_eq!(detect_config_type(Path::new("README")), "text");
    }

    #[test]
    fn test_scope_group_default() {
        let scope = Scope {
            namespace: "public".to_string(),
            group: None,
        };
        let id = scope.config_id("app.yaml");
        assert_eq!(id.group, DEFAULT_GROUP);
        assert_eq!(id.namespace, "public");
    }

    #[test]
    fn test_render_table() {
        let items = vec![
            ConfigListItem {
                data_id: "app.yaml".to_string(),
                group: "DEFAULT_GROUP".to_string(),
                tenant: String::new(),
            },
            ConfigListItem {
                data_id: "database-settings.properties".to_string(),
                group: "PROD".to_string(),
                tenant: "dev".to_string(),
            },
        ];

        let table = render_table(&items);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("DataID"));
        assert!(lines[1].ends_with("public"));
        assert!(lines[2].ends_with("dev"));

        // Columns line up
        let group_col = lines[0].find("GROUP").unwrap();
        assert_eq!(lines[1].find("DEFAULT_GROUP").unwrap(), group_col);
        assert_eq!(lines[2].find("PROD").unwrap(), group_col);
    }

    #[test]
    fn test_write_completion_bash() {
        let mut out = Vec::new();
        write_completion(Shell::Bash, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("nacosctl"));
        assert!(script.contains("apply"));
    }

    #[test]
    fn test_render_empty_table() {
        assert_eq!(render_table(&[]), "DataID  GROUP  NAMESPACE\n");
    }
}
