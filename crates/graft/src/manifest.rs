//! The `graft.json` manifest.
//!
//! The manifest is the only input the generator reads: which modules exist,
//! their fields, access rules, test actors and custom actions, plus where the
//! hand-written runtime modules live. It is deserialized into closed structs
//! and validated once, here; builders trust what they receive.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builders::{AccessLevel, EntityNames, ModuleAccess, Operation, PermissionMap};
use crate::diagnostic::GraftError;
use crate::reconcile::SweepPolicy;

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "graft.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Directory generated files are written under, relative to the project root.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default)]
    pub sweep: SweepPolicy,

    /// External formatter; output is written unformatted when absent.
    #[serde(default)]
    pub formatter: Option<FormatterSpec>,

    #[serde(default)]
    pub runtime: RuntimePaths,

    pub modules: Vec<ModuleSpec>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("src")
}

/// External formatter command. `{path}` in an argument is replaced with the
/// file being formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Module specifiers of the hand-written runtime, relative to `outDir` and
/// without extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimePaths {
    /// Exports `db`.
    pub db: String,
    /// Exports the `ApiClient` base class.
    pub api_client: String,
    /// Exports `getSession`, `hasRole`, `signIn` and `lookupSession`.
    pub auth: String,
    /// Exports `json`, `unauthorized`, `forbidden` and `notFound`.
    pub http: String,
    /// Exports `TestClient`.
    pub testing: String,
}

impl Default for RuntimePaths {
    fn default() -> Self {
        Self {
            db: "lib/db".to_string(),
            api_client: "lib/api-client".to_string(),
            auth: "lib/auth".to_string(),
            http: "lib/http".to_string(),
            testing: "lib/testing".to_string(),
        }
    }
}

/// One generated module (an entity and everything built around it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub access: ModuleAccess,
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    /// Custom service actions, generated as stubs.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Whether to generate the list page.
    #[serde(default)]
    pub ui: bool,
}

impl ModuleSpec {
    pub fn names(&self) -> EntityNames {
        EntityNames::new(&self.name)
    }

    pub fn permissions(&self) -> PermissionMap {
        PermissionMap::resolve(&self.access)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Json,
}

impl FieldType {
    pub fn ts_type(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "Date",
            FieldType::Json => "unknown",
        }
    }
}

/// A test actor; the strategy decides how the fixture authenticates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSpec {
    pub name: String,
    #[serde(flatten)]
    pub strategy: AuthStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum AuthStrategy {
    /// Signs in with an email and password.
    Credentials { email: String, password: String },
    /// Uses a token read from an environment variable.
    #[serde(rename_all = "camelCase")]
    BearerToken { env_var: String },
    /// Looks an existing session up by key.
    KeyedLookup { key: String },
}

impl Manifest {
    /// Reads, parses and validates a manifest file.
    pub fn load(path: &Path) -> Result<Self, GraftError> {
        let text = std::fs::read_to_string(path).map_err(|e| GraftError::io(path, e.to_string()))?;
        Self::parse(&text, path)
    }

    /// Parses and validates manifest text. `path` is used for diagnostics.
    pub fn parse(text: &str, path: &Path) -> Result<Self, GraftError> {
        let manifest: Manifest = serde_json::from_str(text).map_err(|e| GraftError::ManifestInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        manifest.validate().map_err(|message| GraftError::ManifestInvalid {
            path: path.to_path_buf(),
            message,
        })?;

        tracing::debug!(path = %path.display(), modules = manifest.modules.len(), "loaded manifest");
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), String> {
        if self.out_dir.is_absolute() {
            return Err("outDir must be relative to the project root".into());
        }
        if let Some(formatter) = &self.formatter {
            if formatter.command.trim().is_empty() {
                return Err("formatter.command is empty".into());
            }
        }

        let mut modules = BTreeSet::new();
        for module in &self.modules {
            if !is_identifier(&module.name) {
                return Err(format!("'{}' is not a valid module name", module.name));
            }
            if !modules.insert(module.names().snake) {
                return Err(format!("module '{}' is declared more than once", module.name));
            }
            validate_module(module).map_err(|e| format!("module '{}': {}", module.name, e))?;
        }
        Ok(())
    }
}

/// Service method names taken by CRUD operations.
const RESERVED_ACTIONS: &[&str] = &["list", "get", "create", "update", "remove"];

fn validate_module(module: &ModuleSpec) -> Result<(), String> {
    let mut fields = BTreeSet::new();
    for field in &module.fields {
        if !is_identifier(&field.name) {
            return Err(format!("'{}' is not a valid field name", field.name));
        }
        if field.name == "id" {
            return Err("'id' is generated and cannot be declared".into());
        }
        if !fields.insert(field.name.as_str()) {
            return Err(format!("field '{}' is declared more than once", field.name));
        }
    }

    let permissions = module.permissions();
    for op in Operation::ALL {
        let rule = permissions.rule(op);
        if rule.level == AccessLevel::Roles && rule.roles.is_empty() {
            return Err(format!("'{}' requires roles but none are listed", op.as_str()));
        }
    }

    let mut actions = BTreeSet::new();
    for action in &module.actions {
        if !is_identifier(action) {
            return Err(format!("'{}' is not a valid action name", action));
        }
        if RESERVED_ACTIONS.contains(&action.as_str()) {
            return Err(format!("action '{}' clashes with a generated operation", action));
        }
        if !actions.insert(action.as_str()) {
            return Err(format!("action '{}' is declared more than once", action));
        }
    }

    let mut actors = BTreeSet::new();
    for actor in &module.actors {
        if !is_identifier(&actor.name) {
            return Err(format!("'{}' is not a valid actor name", actor.name));
        }
        if !actors.insert(actor.name.as_str()) {
            return Err(format!("actor '{}' is declared more than once", actor.name));
        }
        let empty = match &actor.strategy {
            AuthStrategy::Credentials { email, password } => email.is_empty() || password.is_empty(),
            AuthStrategy::BearerToken { env_var } => env_var.is_empty(),
            AuthStrategy::KeyedLookup { key } => key.is_empty(),
        };
        if empty {
            return Err(format!("actor '{}' has an incomplete strategy", actor.name));
        }
    }

    Ok(())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "formatter": { "command": "prettier", "args": ["--stdin-filepath", "{path}"] },
        "modules": [{
            "name": "user",
            "fields": [{ "name": "email", "type": "string" }, { "name": "age", "type": "number", "optional": true }],
            "access": { "default": { "level": "authenticated" }, "operations": { "delete": { "level": "roles", "roles": ["admin"] } } },
            "actors": [
                { "name": "admin", "strategy": "credentials", "email": "admin@example.com", "password": "secret" },
                { "name": "service", "strategy": "bearerToken", "envVar": "SERVICE_TOKEN" }
            ],
            "actions": ["resetPassword"],
            "ui": true
        }]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(MANIFEST, Path::new("graft.json")).unwrap();
        assert_eq!(manifest.out_dir, PathBuf::from("src"));
        assert_eq!(manifest.sweep, SweepPolicy::KeepEmptyShells);

        let module = &manifest.modules[0];
        assert_eq!(module.fields[1].field_type, FieldType::Number);
        assert_eq!(
            module.actors[1].strategy,
            AuthStrategy::BearerToken {
                env_var: "SERVICE_TOKEN".into()
            }
        );
        assert_eq!(module.permissions().rule(Operation::Delete).roles, vec!["admin"]);
    }

    #[test]
    fn test_roles_without_roles_rejected() {
        let text = r#"{ "modules": [{ "name": "user", "access": { "default": { "level": "roles" } } }] }"#;
        let err = Manifest::parse(text, Path::new("graft.json")).unwrap_err();
        assert!(matches!(err, GraftError::ManifestInvalid { .. }));
    }

    #[test]
    fn test_reserved_action_rejected() {
        let text = r#"{ "modules": [{ "name": "user", "actions": ["list"] }] }"#;
        assert!(Manifest::parse(text, Path::new("graft.json")).is_err());
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let text = r#"{ "modules": [{ "name": "blog_post" }, { "name": "BlogPost" }] }"#;
        assert!(Manifest::parse(text, Path::new("graft.json")).is_err());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let text = r#"{ "modules": [{ "name": "user", "actors": [{ "name": "x", "strategy": "magic" }] }] }"#;
        assert!(Manifest::parse(text, Path::new("graft.json")).is_err());
    }
}
