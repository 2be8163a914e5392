use std::path::Path;

use graft::project::inventory;
use graft::{FileStatus, Generator, GeneratorConfig, Manifest, Project};

const MANIFEST: &str = r#"{
    "outDir": "src",
    "modules": [{
        "name": "user",
        "fields": [
            { "name": "email", "type": "string" },
            { "name": "nickname", "type": "string", "optional": true }
        ],
        "access": {
            "default": { "level": "authenticated" },
            "operations": {
                "list": { "level": "public" },
                "delete": { "level": "roles", "roles": ["admin"] }
            }
        },
        "actors": [
            { "name": "admin", "strategy": "credentials", "email": "admin@example.com", "password": "secret" }
        ],
        "actions": ["resetPassword"],
        "ui": true
    }]
}"#;

fn run(root: &Path, manifest_text: &str) -> graft::RunReport {
    let manifest = Manifest::parse(manifest_text, &root.join("graft.json")).unwrap();
    let config = GeneratorConfig::from_manifest(root, &manifest);
    let generator = Generator::new(config);
    let mut project = generator.open_project().unwrap();
    generator.generate(&manifest, &mut project).unwrap()
}

fn read(root: &Path, path: &str) -> String {
    std::fs::read_to_string(root.join(path)).unwrap()
}

#[test]
fn generate_writes_every_module_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    let report = run(root, MANIFEST);
    assert!(!report.failed());
    assert_eq!(report.save.count(FileStatus::Created), 7);

    for path in [
        "src/types/user.types.ts",
        "src/permissions/user.permissions.ts",
        "src/services/user.service.ts",
        "src/routes/user.route.ts",
        "src/client/user.client.ts",
        "src/fixtures/user.actors.ts",
        "src/ui/user-list.tsx",
    ] {
        assert!(root.join(path).exists(), "missing {}", path);
    }

    let service = read(root, "src/services/user.service.ts");
    assert!(service.contains("import { db } from \"../lib/db\";"));
    assert!(service.contains("static async list(): Promise<User[]> {"));
    assert!(service.contains("throw new Error(\"UserService.resetPassword is not implemented\");"));

    let route = read(root, "src/routes/user.route.ts");
    assert!(route.contains("export async function GET(request: Request, context: RouteContext): Promise<Response> {"));
    assert!(route.contains("if (!hasRole(session, userPermissions.delete.roles)) {"));
}

#[test]
fn second_run_changes_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    run(root, MANIFEST);
    let before = read(root, "src/routes/user.route.ts");

    let report = run(root, MANIFEST);
    assert_eq!(report.save.count(FileStatus::Unchanged), 7);
    assert_eq!(report.warnings().count(), 0);
    assert_eq!(read(root, "src/routes/user.route.ts"), before);
}

#[test]
fn edits_survive_regeneration() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    run(root, MANIFEST);

    let path = root.join("src/services/user.service.ts");
    let edited = read(root, "src/services/user.service.ts")
        .replace(
            "throw new Error(\"UserService.resetPassword is not implemented\");",
            "await mailer.sendReset(id);",
        )
        .replace("return db.user.findMany();", "return db.user.findMany({ orderBy: { email: \"asc\" } });");
    let edited = format!("// Hand-maintained helpers live below the generated class.\n{}\nexport const PAGE_SIZE = 50;\n", edited);
    std::fs::write(&path, &edited).unwrap();

    let report = run(root, MANIFEST);
    assert!(!report.failed());

    let service = read(root, "src/services/user.service.ts");
    assert!(service.contains("await mailer.sendReset(id);"));
    assert!(service.contains("orderBy: { email: \"asc\" }"));
    assert!(service.contains("export const PAGE_SIZE = 50;"));
    assert!(service.contains("// Hand-maintained helpers live below the generated class."));
}

#[test]
fn revoked_operations_are_swept() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    run(root, MANIFEST);

    let narrowed = MANIFEST
        .replace(r#""delete": { "level": "roles", "roles": ["admin"] }"#, r#""delete": { "level": "none" }"#)
        .replace(r#""actions": ["resetPassword"],"#, r#""actions": [],"#);
    let report = run(root, &narrowed);
    assert!(!report.failed());

    let service = read(root, "src/services/user.service.ts");
    assert!(!service.contains("static async remove("));
    assert!(!service.contains("resetPassword"));

    let route = read(root, "src/routes/user.route.ts");
    assert!(!route.contains("export async function DELETE("));
    assert!(!route.contains("hasRole(session"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    let manifest = Manifest::parse(MANIFEST, &root.join("graft.json")).unwrap();
    let config = GeneratorConfig {
        dry_run: true,
        ..GeneratorConfig::from_manifest(root, &manifest)
    };
    let mut project = Project::on_disk(root).unwrap();
    let report = Generator::new(config).generate(&manifest, &mut project).unwrap();

    assert_eq!(report.save.count(FileStatus::Created), 7);
    assert!(!root.join("src").exists());
}

#[test]
fn inventory_lists_generated_declarations() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    run(root, MANIFEST);

    let files = inventory(&root.join("src")).unwrap();
    assert_eq!(files.len(), 7);

    let service = files
        .iter()
        .find(|f| f.path.ends_with("services/user.service.ts"))
        .unwrap();
    let stub = service
        .declarations
        .iter()
        .find(|d| d.name == "UserService.resetPassword")
        .unwrap();
    assert_eq!(stub.marker.artifact, "service:user");
    assert!(stub.marker.stub.is_some());
}
