//! CLI tool to generate API keys.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --name "Acme Ops" --role manager --tenant-id <uuid> --expires-in 365d

use std::env;

use uuid::Uuid;

use repotrack_lib::config::Config;
use repotrack_lib::db::DbPool;
use repotrack_lib::models::ApiKeyRole;
use repotrack_lib::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let mut name: Option<String> = None;
    let mut role = "agent".to_string();
    let mut tenant_id: Option<String> = None;
    let mut expires_in: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--name" | "-n" => {
                i += 1;
                if i < args.len() {
                    name = Some(args[i].clone());
                }
            }
            "--role" | "-r" => {
                i += 1;
                if i < args.len() {
                    role = args[i].clone();
                }
            }
            "--tenant-id" | "-t" => {
                i += 1;
                if i < args.len() {
                    tenant_id = Some(args[i].clone());
                }
            }
            "--expires-in" | "-e" => {
                i += 1;
                if i < args.len() {
                    expires_in = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Validate required arguments
    let name = match name {
        Some(n) => n,
        None => {
            eprintln!("Error: --name is required");
            print_usage();
            std::process::exit(1);
        }
    };

    // Parse role
    let role_enum = match ApiKeyRole::parse(&role) {
        Some(r) => r,
        None => {
            eprintln!("Error: Invalid role '{}'. Must be: admin, manager, agent", role);
            std::process::exit(1);
        }
    };

    // Parse tenant id
    let tenant_uuid = match tenant_id.as_deref() {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                eprintln!("Error: --tenant-id '{}' is not a valid UUID", raw);
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Load config and initialize database
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    // Generate the key
    let (full_key, api_key) = match api_key::create_key(
        &pool,
        &name,
        role_enum,
        tenant_uuid,
        expires_in.as_deref(),
    )
    .await
    {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error generating key: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Generated");
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  ID:      {}", api_key.id);
    println!("  Name:    {}", api_key.name);
    println!("  Role:    {}", api_key.role);
    if let Some(tid) = api_key.tenant_id {
        println!("  Tenant:  {}", tid);
    } else {
        println!("  Tenant:  (platform-wide)");
    }
    println!("  Prefix:  {}", api_key.key_prefix);
    if let Some(expires) = api_key.expires_at {
        println!("  Expires: {}", expires.to_rfc3339());
    } else {
        println!("  Expires: Never");
    }
    println!();
    println!("  Key:     {}", full_key);
    println!();
    println!("  ⚠️  Save this key! It cannot be retrieved later.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!(
        "Usage: generate-api-key --name <name> [--role <role>] [--tenant-id <uuid>] [--expires-in <duration>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --name, -n        Name for the API key (required)");
    eprintln!("  --role, -r        Role: admin, manager, agent (default: agent)");
    eprintln!("  --tenant-id, -t   Tenant the key is bound to (required for manager/agent)");
    eprintln!("  --expires-in, -e  Expiration: 30d, 365d, 1y, etc. (default: never)");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!(
        "  generate-api-key --name \"Acme Ops\" --role manager --tenant-id 0198c2f3-7a1e-7c3d-9f00-3e1b2a4c5d6e"
    );
    eprintln!("  generate-api-key --name \"Platform Admin\" --role admin");
    eprintln!();
}
