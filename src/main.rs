use flatdb::ast::{ColumnsSelect, Statement};
use flatdb::parser::Parser;
use flatdb::tokenizer::Tokenizer;
use flatdb::{ExecutionEngine, Result, Row, SchemaManager, StorageEngine};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

enum Output {
    Rows(Vec<Row>),
    Message(String),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("fatal: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let data_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("data"), PathBuf::from);

    let storage = StorageEngine::new(&data_dir)?;
    let schema = SchemaManager::new(data_dir.join("master_schema.json"))?;
    let mut engine = ExecutionEngine::new(storage, schema);

    // Indexes live in memory only, so rebuild them for every table before
    // serving point lookups.
    for table in engine.table_names()? {
        if let Err(err) = engine.load_table_index(&table) {
            eprintln!("warning: could not load index for '{table}': {err}");
        }
    }

    println!("flatdb interactive shell (data dir: {})", data_dir.display());
    println!("commands: CREATE TABLE, INSERT, SELECT, UPDATE, DELETE, JOIN, DROP TABLE");
    println!("type 'exit' to quit\n");

    let stdin = io::stdin();
    loop {
        print!("flatdb> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            break;
        }

        match execute(&mut engine, line) {
            Ok(Output::Rows(rows)) => print_rows(&rows),
            Ok(Output::Message(message)) => println!("{message}"),
            Err(err) => println!("error: {err}"),
        }
        println!();
    }

    println!("bye");
    Ok(())
}

fn execute(engine: &mut ExecutionEngine, line: &str) -> Result<Output> {
    let tokens = Tokenizer::new(line).tokenize()?;
    let statement = Parser::new(tokens).parse()?;

    match statement {
        Statement::CreateTable(create) => {
            engine.create_table(&create.table, create.columns, create.primary_key)?;
            Ok(Output::Message(format!("table '{}' created", create.table)))
        }
        Statement::Insert(insert) => {
            // positional values map onto the schema's column order
            let schema = engine.schema_of(&insert.table)?;
            let row: Row = schema
                .columns
                .iter()
                .map(|col| col.name.clone())
                .zip(insert.values)
                .collect();
            engine.insert_row(&insert.table, row)?;
            Ok(Output::Message("1 row inserted".into()))
        }
        Statement::Select(select) => {
            let projection = match select.columns {
                ColumnsSelect::Star => None,
                ColumnsSelect::Names(names) => Some(names),
            };
            let rows =
                engine.select_rows(&select.table, select.filter.as_ref(), projection.as_deref())?;
            Ok(Output::Rows(rows))
        }
        Statement::Update(update) => {
            let updates: Row = update.assignments.into_iter().collect();
            let count = engine.update_rows(&update.table, &update.filter, &updates)?;
            Ok(Output::Message(format!("{count} row(s) updated")))
        }
        Statement::Delete(delete) => {
            let count = engine.delete_rows(&delete.table, &delete.filter)?;
            Ok(Output::Message(format!("{count} row(s) deleted")))
        }
        Statement::Join(join) => {
            let rows = engine.nested_loop_join(&join.left, &join.right, &join.on_column)?;
            Ok(Output::Rows(rows))
        }
        Statement::DropTable(table) => {
            engine.drop_table(&table)?;
            Ok(Output::Message(format!("table '{table}' dropped")))
        }
    }
}

/// Prints rows as an aligned text table, columns taken from the first row.
fn print_rows(rows: &[Row]) {
    let Some(first) = rows.first() else {
        println!("0 rows returned");
        return;
    };

    let columns: Vec<&String> = first.keys().collect();
    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            if let Some(value) = row.get(*col) {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| format!("{col:<w$}"))
        .collect();
    let header = header.join(" | ");
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| {
                let text = row.get(*col).map(ToString::to_string).unwrap_or_default();
                format!("{text:<w$}")
            })
            .collect();
        println!("{}", cells.join(" | "));
    }

    println!("\n{} row(s) returned", rows.len());
}
