use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::Path;

use equipment_checkout::{
    load_tools, seed_sample_data, setup_database, CheckoutActivityReport, CheckoutSystem,
    EmployeeUsageReport, Session, SqliteAuthenticator, ToolCatalog, ToolCondition,
    ToolStatusReport,
};

const DEFAULT_DB: &str = "equipment_checkout.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let db_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_DB);

    if args.len() > 1 && args[1] == "setup" {
        run_setup(db_path)?;
    } else {
        run_demo(db_path)?;
    }

    Ok(())
}

fn run_setup(db_path: &str) -> Result<()> {
    println!("🔧 Setting up equipment checkout database...");

    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    seed_sample_data(&conn)?;

    println!("✓ Database created at {}", db_path);
    println!("✓ Sample employees and tools inserted");
    println!("\nTest accounts:");
    println!("  employee1 / password123 (John Smith - Level 2)");
    println!("  employee2 / password456 (Jane Doe - Level 3)");
    println!("  manager1  / manager123  (Bob Johnson - Manager)");

    Ok(())
}

fn run_demo(db_path: &str) -> Result<()> {
    println!("🔧 Equipment Checkout System v{}", equipment_checkout::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if !Path::new(db_path).exists() {
        eprintln!("❌ Database not found at {}", db_path);
        eprintln!("   Run: cargo run -- setup");
        std::process::exit(1);
    }

    // Load the catalog, then hand the connection to the authenticator
    let conn = Connection::open(db_path)?;
    let tools = load_tools(&conn)?;
    println!("✓ Loaded {} tools from database", tools.len());

    let system = CheckoutSystem::new(ToolCatalog::from_tools(tools));
    let authenticator = SqliteAuthenticator::new(conn);

    // Login
    let mut session = Session::new();
    let employee = session.login(&authenticator, "employee1", "password123")?;
    println!("✓ Login successful for {}", employee.name);
    let employee_id = employee.employee_id.clone();

    // Checkout a tool by barcode
    println!("\n📤 Checking out barcode 123456789...");
    let transaction_id = system.checkout(&session, "123456789")?;
    println!("✓ Checkout successful! Transaction ID: {}", transaction_id);

    println!("\nAvailable tools now:");
    for tool in system.available_tools() {
        println!(
            "  ID: {}, Name: {}, Barcode: {}",
            tool.tool_id, tool.name, tool.barcode
        );
    }

    // Return it damaged
    println!("\n📥 Returning barcode 123456789 (damaged)...");
    system.return_tool(&session, "123456789", ToolCondition::Damaged, "bent claw")?;
    println!("✓ Return successful!");

    // Reports
    println!("\n{}", CheckoutActivityReport::build(system.all_transactions()).render());
    println!("{}", ToolStatusReport::build(system.catalog_snapshot()).render());
    println!(
        "{}",
        EmployeeUsageReport::build(&employee_id, system.history_for(&employee_id)).render()
    );

    session.logout();
    println!("✓ User logged out");

    Ok(())
}
