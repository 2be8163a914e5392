//! Builders: decide what each generated file should contain.
//!
//! A builder turns one module of the manifest into a [`FileDefinition`] for one
//! target file. Builders read the existing tree (to carry hand-written bodies
//! forward) but never mutate it; reconciling is the caller's job.
//!
//! | Builder                  | Target                               | Artifact            |
//! |--------------------------|--------------------------------------|---------------------|
//! | `EntityTypesBuilder`     | `types/{name}.types.ts`              | `types:{name}`      |
//! | `PermissionTableBuilder` | `permissions/{name}.permissions.ts`  | `permissions:{name}`|
//! | `ServiceBuilder`         | `services/{name}.service.ts`         | `service:{name}`    |
//! | `RouteBuilder`           | `routes/{name}.route.ts`             | `route:{name}`      |
//! | `ClientBuilder`          | `client/{name}.client.ts`            | `client:{name}`     |
//! | `ActorBuilder`           | `fixtures/{name}.actors.ts`          | `actors:{name}`     |
//! | `ListPageBuilder`        | `ui/{name}-list.tsx`                 | `ui:{name}`         |

mod access;
mod actor;
mod client;
mod naming;
mod permissions;
mod route;
mod service;
mod types;
mod ui;

pub use access::{AccessLevel, AccessRule, ModuleAccess, Operation, PermissionMap};
pub use actor::ActorBuilder;
pub use client::ClientBuilder;
pub use naming::{to_camel_case, to_pascal_case, to_snake_case, EntityNames};
pub use permissions::PermissionTableBuilder;
pub use route::RouteBuilder;
pub use service::ServiceBuilder;
pub use types::EntityTypesBuilder;
pub use ui::ListPageBuilder;

use std::path::{Path, PathBuf};

use crate::diagnostic::GraftError;
use crate::manifest::{ModuleSpec, RuntimePaths};
use crate::schema::{FileDefinition, MethodBody, StatementSpec};
use crate::tree::SourceFile;

/// Produces the definition of one generated file.
pub trait Builder {
    /// Builder name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Marker id for everything this builder generates.
    fn artifact(&self) -> String;

    /// Target file, relative to the output directory.
    fn target(&self) -> PathBuf;

    /// Describes what the target file must contain. `existing` is the current
    /// tree of the target, if the file exists.
    fn schema(&self, existing: Option<&SourceFile>) -> Result<FileDefinition, GraftError>;
}

/// Everything the builders of one module share.
#[derive(Debug, Clone)]
pub struct ModulePlan<'m> {
    pub module: &'m ModuleSpec,
    pub runtime: &'m RuntimePaths,
    pub names: EntityNames,
    pub permissions: PermissionMap,
}

impl<'m> ModulePlan<'m> {
    pub fn new(module: &'m ModuleSpec, runtime: &'m RuntimePaths) -> Self {
        Self {
            module,
            runtime,
            names: module.names(),
            permissions: module.permissions(),
        }
    }

    /// The builders for this module, in run order.
    pub fn builders(&self) -> Vec<Box<dyn Builder + '_>> {
        let mut builders: Vec<Box<dyn Builder + '_>> = vec![
            Box::new(EntityTypesBuilder::new(self)),
            Box::new(PermissionTableBuilder::new(self)),
            Box::new(ServiceBuilder::new(self)),
            Box::new(RouteBuilder::new(self)),
            Box::new(ClientBuilder::new(self)),
        ];
        if !self.module.actors.is_empty() {
            builders.push(Box::new(ActorBuilder::new(self)));
        }
        if self.module.ui && self.permissions.allows(Operation::List) {
            builders.push(Box::new(ListPageBuilder::new(self)));
        }
        builders
    }

    // =========================================================================
    // Target files, shared so builders can import each other's output
    // =========================================================================

    pub fn types_file(&self) -> PathBuf {
        PathBuf::from(format!("types/{}.types.ts", self.names.snake))
    }

    pub fn permissions_file(&self) -> PathBuf {
        PathBuf::from(format!("permissions/{}.permissions.ts", self.names.snake))
    }

    pub fn service_file(&self) -> PathBuf {
        PathBuf::from(format!("services/{}.service.ts", self.names.snake))
    }

    pub fn route_file(&self) -> PathBuf {
        PathBuf::from(format!("routes/{}.route.ts", self.names.snake))
    }

    pub fn client_file(&self) -> PathBuf {
        PathBuf::from(format!("client/{}.client.ts", self.names.snake))
    }

    pub fn actors_file(&self) -> PathBuf {
        PathBuf::from(format!("fixtures/{}.actors.ts", self.names.snake))
    }

    pub fn list_page_file(&self) -> PathBuf {
        PathBuf::from(format!("ui/{}-list.tsx", self.names.kebab))
    }

    /// Type names used in signatures: entity, creation input and patch.
    pub fn entity_type(&self) -> String {
        self.names.pascal.clone()
    }

    pub fn input_type(&self) -> String {
        format!("New{}", self.names.pascal)
    }

    pub fn patch_type(&self) -> String {
        format!("{}Patch", self.names.pascal)
    }
}

/// Module specifier for importing `to` (relative to the output directory,
/// with or without extension) from the file `from`.
pub fn relative_import(from: &Path, to: &Path) -> String {
    let to = strip_ts_extension(to);
    let from_dir = from.parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(&to, from_dir).unwrap_or(to);
    let text = relative.to_string_lossy().replace('\\', "/");
    if text.starts_with("../") || text.starts_with("./") {
        text
    } else {
        format!("./{}", text)
    }
}

fn strip_ts_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts") | Some("tsx") => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}

/// The existing body of `class.method`, as statements that reproduce it.
///
/// Builders use this to keep hand-written logic in members they would
/// otherwise regenerate.
pub fn carried_body(existing: Option<&SourceFile>, class: &str, method: &str, is_static: bool) -> Option<MethodBody> {
    let body = &existing?.class(class)?.method(method, is_static)?.body;
    if body.is_empty() {
        return None;
    }
    Some(MethodBody::Statements(vec![StatementSpec::raw(
        body.dedented_lines().join("\n"),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SourceParser;

    #[test]
    fn test_relative_import() {
        assert_eq!(
            relative_import(Path::new("services/user.service.ts"), Path::new("lib/db")),
            "../lib/db"
        );
        assert_eq!(
            relative_import(Path::new("services/user.service.ts"), Path::new("services/base.ts")),
            "./base"
        );
        assert_eq!(relative_import(Path::new("index.ts"), Path::new("lib/db")), "./lib/db");
    }

    #[test]
    fn test_carried_body() {
        let mut parser = SourceParser::new().unwrap();
        let file = parser
            .parse(
                "export class UserService {\n  static async list() {\n    const rows = await db.user.findMany();\n    return rows;\n  }\n}\n",
                Path::new("user.service.ts"),
            )
            .unwrap();

        let body = carried_body(Some(&file), "UserService", "list", true).unwrap();
        assert_eq!(
            body,
            MethodBody::Statements(vec![StatementSpec::raw(
                "const rows = await db.user.findMany();\nreturn rows;"
            )])
        );
        assert!(carried_body(Some(&file), "UserService", "get", true).is_none());
        assert!(carried_body(None, "UserService", "list", true).is_none());
    }
}
