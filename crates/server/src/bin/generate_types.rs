use std::{env, fs, path::PathBuf};

use ts_rs::TS;

fn generate_types_content() -> String {
    let header = "// This file was generated by `crates/server/src/bin/generate_types.rs`.\n\n// Do not edit this file manually.";
    let decls: Vec<String> = vec![
        db::models::custom_field::FieldType::decl(),
        db::models::custom_field::EntityType::decl(),
        db::models::custom_field::CustomFieldDefinition::decl(),
        db::models::custom_field::CreateCustomField::decl(),
        db::models::custom_field::UpdateCustomField::decl(),
        db::models::property::PropertyStatus::decl(),
        db::models::property::Property::decl(),
        db::models::property::CreateProperty::decl(),
        db::models::property::UpdateProperty::decl(),
        db::models::tenant::TenantStatus::decl(),
        db::models::tenant::Tenant::decl(),
        db::models::tenant::CreateTenant::decl(),
        db::models::tenant::UpdateTenant::decl(),
        services::services::custom_field_sync::EntitySyncFailure::decl(),
        services::services::custom_field_sync::SyncReport::decl(),
        services::services::custom_field::CreatedCustomField::decl(),
        services::services::custom_field_display::DisplayLocale::decl(),
        services::services::custom_field_display::CustomFieldDisplay::decl(),
        utils::response::ApiResponse::<()>::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|d| {
            let trimmed = d.trim_start();
            if trimmed.starts_with("export") {
                d
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{header}\n\n{body}\n")
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let check_mode = args.iter().any(|arg| arg == "--check");

    let shared_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../shared")
        .join("types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&shared_path).unwrap_or_default();
        if current == generated {
            println!("✅ shared/types.ts is up to date.");
            std::process::exit(0);
        } else {
            eprintln!("❌ shared/types.ts is not up to date. Run 'cargo run --bin generate_types' and commit the changes.");
            std::process::exit(1);
        }
    }

    println!("Generating TypeScript types…");
    if let Some(parent) = shared_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&shared_path, generated)?;
    println!("✅ TypeScript types generated in shared/");
    Ok(())
}
