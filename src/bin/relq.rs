//! relq — compile JSON query documents to SQL, optionally run them.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL for a query document
//! relq compile query.json --schema schema.toml
//!
//! # Run it and print the decoded rows
//! relq exec query.json --database-url sqlite://blog.db
//!
//! # Read the document from stdin
//! echo '{"model": "posts"}' | relq compile -
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use relq::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relq")]
#[command(version)]
#[command(about = "Relational query compiler: JSON query documents in, SQL out", long_about = None)]
#[command(after_help = "EXAMPLES:
    relq compile query.json --schema schema.toml --dialect mysql
    relq exec query.json --database-url sqlite://blog.db --format json
    relq explain query.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Schema file (TOML or JSON) with model sources, keys and field types
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// SQL dialect: ansi, mysql, sqlserver or plain
    #[arg(short, long, global = true)]
    dialect: Option<String>,

    /// Config file (defaults to ./relq.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, env = "RELQ_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL for a query document
    Compile {
        /// Query file, `-` for stdin, or an inline JSON document
        query: String,
    },
    /// Compile a query document and run it against the database
    Exec {
        /// Query file, `-` for stdin, or an inline JSON document
        query: String,
    },
    /// Show how a query document was understood, then its SQL
    Explain {
        /// Query file, `-` for stdin, or an inline JSON document
        query: String,
    },
    /// Show the condition operator reference
    Operators,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "relq=debug" } else { "relq=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Compile { query } => {
            let (_, compiler, query) = prepare(cli, query)?;
            let command = compiler.compile(&query)?;
            println!("{}", command.text);
        }
        Commands::Exec { query } => execute_query(cli, query).await?,
        Commands::Explain { query } => {
            let (_, compiler, query) = prepare(cli, query)?;
            explain_query(&compiler, &query);
        }
        Commands::Operators => show_operators(),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::load()?,
    };
    if let Some(dialect) = &cli.dialect {
        config.dialect = dialect.parse()?;
    }
    if let Some(schema) = &cli.schema {
        config.schema = Some(schema.clone());
    }
    if let Some(url) = &cli.database_url {
        config.database_url = Some(url.clone());
    }
    Ok(config)
}

fn read_document(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else if input.trim_start().starts_with('{') {
        Ok(input.to_string())
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading query file {input}"))
    }
}

/// Build the compiler from config and parse the query document.
fn prepare(cli: &Cli, input: &str) -> Result<(Config, Compiler, Query)> {
    let config = load_config(cli)?;
    let schema = match &config.schema {
        Some(path) => StaticSchema::from_path(path)
            .with_context(|| format!("loading schema {}", path.display()))?,
        None => StaticSchema::new(),
    };

    let mut query = parse_query(&read_document(input)?)?;
    schema.bind_models(&mut query);

    if cli.verbose {
        eprintln!(
            "{} {:?} via {:?}",
            "Dialect:".dimmed(),
            config.dialect,
            config.schema.as_deref().unwrap_or(std::path::Path::new("(no schema)"))
        );
    }
    let compiler = Compiler::from_config(&config, schema);
    Ok((config, compiler, query))
}

async fn execute_query(cli: &Cli, input: &str) -> Result<()> {
    let (config, compiler, query) = prepare(cli, input)?;
    let Some(db_url) = config.database_url else {
        anyhow::bail!("No database URL. Use --database-url or set RELQ_DATABASE_URL");
    };

    let command = compiler.compile(&query)?;
    if cli.verbose {
        eprintln!("{} {}", "SQL:".dimmed(), command.text.yellow());
        eprintln!("{} {}", "Connecting to:".dimmed(), db_url);
    }

    let transport = SqlxTransport::connect(&db_url).await?;
    let source = DataSource::new(compiler, transport);

    match source.run(&query).await? {
        Outcome::Rows(rows) => format_output(&rows, &cli.format),
        Outcome::Affected(n) => println!("{} {} rows affected", "✓".green(), n),
    }
    Ok(())
}

fn format_output(results: &[Record], format: &OutputFormat) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Map<String, serde_json::Value>> = results
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                        .collect()
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        }
        OutputFormat::Table => {
            let columns: Vec<&String> = results[0].keys().collect();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in results {
                for (i, col) in columns.iter().enumerate() {
                    let len = row.get(*col).map(val_to_string).unwrap_or_default().len();
                    widths[i] = widths[i].max(len);
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = *w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in results {
                let cells: Vec<String> = columns
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = *w)
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", results.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &Value) -> String {
    match val {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn explain_query(compiler: &Compiler, query: &Query) {
    println!("{}", "Parsed Structure:".green().bold());
    println!("  {} {}", "Kind:".dimmed(), query.kind.to_string().cyan());
    if let Some(model) = &query.model {
        println!(
            "  {} {} (table {}, key {})",
            "Model:".dimmed(),
            model.name.white(),
            model.source.white(),
            model.key.white()
        );
    }
    if !query.fields.is_empty() {
        println!("  {} {}", "Fields:".dimmed(), query.fields.join(", ").white());
    }
    if let Some(conditions) = &query.conditions {
        println!("  {}", "Conditions:".dimmed());
        print_condition(conditions, 2);
    }
    for join in &query.joins {
        let name = join.model.as_ref().map(|m| m.name.as_str()).unwrap_or("?");
        println!(
            "  {} {} {}",
            "Join:".dimmed(),
            name.white(),
            join.constraint.as_deref().unwrap_or_default().yellow()
        );
    }
    for spec in &query.order {
        println!(
            "  {} {} {}",
            "Order:".dimmed(),
            spec.field.white(),
            spec.direction.as_sql().cyan()
        );
    }

    println!();
    println!("{}", "Generated SQL:".green().bold());
    match compiler.compile(query) {
        Ok(command) => println!("  {}", command.text.white()),
        Err(e) => eprintln!("{} {}", "Compile Error:".red().bold(), e),
    }
}

fn print_condition(expr: &ConditionExpr, indent: usize) {
    let pad = "  ".repeat(indent);
    match expr {
        ConditionExpr::Leaf(leaf) => println!(
            "{pad}{} {} {}",
            leaf.field.white(),
            leaf.op.to_string().cyan(),
            leaf.value.to_string().yellow()
        ),
        ConditionExpr::Group { boolean, children } => {
            let name = match boolean {
                BoolOp::And => "AND",
                BoolOp::Or => "OR",
            };
            println!("{pad}{}", name.cyan().bold());
            for child in children {
                print_condition(child, indent + 1);
            }
        }
        ConditionExpr::Raw(sql) => println!("{pad}{} {}", "raw".dimmed(), sql.yellow()),
    }
}

fn show_operators() {
    println!("{}", "relq Condition Operators".cyan().bold());
    println!();

    let operators = [
        ("value", "Equality", r#"{"id": 1}"#, "id = 1"),
        ("[a, b]", "Membership", r#"{"id": [1, 2]}"#, "id IN (1, 2)"),
        ("=", "Equality", r#"{"id": {"=": 1}}"#, "(id = 1)"),
        ("!= <>", "Inequality", r#"{"id": {"!=": [1, 2]}}"#, "(id NOT IN (1, 2))"),
        ("> >= < <=", "Comparison", r#"{"n": {">": 1, "<": 9}}"#, "(n > 1 AND n < 9)"),
        ("between", "Range", r#"{"n": {"between": [1, 9]}}"#, "(n BETWEEN 1 AND 9)"),
        ("like", "Pattern", r#"{"t": {"like": "%a%"}}"#, "(t like '%a%')"),
        ("not like", "Pattern", r#"{"t": {"not like": "%a%"}}"#, "(t not like '%a%')"),
        ("null", "Null test", r#"{"t": null}"#, "t IS NULL"),
        ("$query", "Sub-query", r#"{"id": {"$query": {...}}}"#, "id IN (SELECT ...)"),
        ("or / and", "Grouping", r#"{"or": {"a": 1, "b": 2}}"#, "(a = 1 OR b = 2)"),
    ];

    println!(
        "{:12} {:12} {:34} {}",
        "Operator".white().bold(),
        "Name".white().bold(),
        "Condition".white().bold(),
        "SQL".white().bold()
    );
    println!("{}", "─".repeat(90).dimmed());

    for (op, name, example, sql) in operators {
        println!(
            "{:12} {:12} {:34} {}",
            op.cyan().bold(),
            name.yellow(),
            example.white(),
            sql.dimmed()
        );
    }
}
