use colored::Colorize;
use docket_catalog::{descriptor_key, Catalog, DocumentPage, PageRequest, RegisteredDocument};
use docket_store::FileKvStore;
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(&cli)?;
    let store = FileKvStore::open(&config.store_path)?;
    let catalog = Catalog::with_config(store, config.catalog);
    let output = dispatch(&catalog, cli.command, cli.format)?;
    println!("{output}");
    Ok(())
}

fn dispatch(
    catalog: &Catalog<FileKvStore>,
    command: Command,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match command {
        Command::Init(args) => cmd_init(catalog, args, format),
        Command::Write(args) => cmd_write(catalog, args, format),
        Command::Register(args) => cmd_register(catalog, args, format),
        Command::Read(args) => cmd_read(catalog, args, format),
        Command::List(args) => cmd_list(catalog, args, format),
        Command::Count(_) => cmd_count(catalog, format),
    }
}

fn cmd_init(catalog: &Catalog<FileKvStore>, args: InitArgs, format: OutputFormat) -> anyhow::Result<String> {
    let count = catalog.init_counter(args.count)?;
    Ok(match format {
        OutputFormat::Json => json!({ "count": count }).to_string(),
        OutputFormat::Text => format!("{} Document counter set to {}", "✓".green().bold(), count.to_string().bold()),
    })
}

fn cmd_write(catalog: &Catalog<FileKvStore>, args: WriteArgs, format: OutputFormat) -> anyhow::Result<String> {
    catalog.write_value(&args.key, args.value.as_bytes())?;
    Ok(match format {
        OutputFormat::Json => json!({ "key": args.key }).to_string(),
        OutputFormat::Text => format!("{} Wrote {}", "✓".green().bold(), args.key.yellow()),
    })
}

fn cmd_register(catalog: &Catalog<FileKvStore>, args: RegisterArgs, format: OutputFormat) -> anyhow::Result<String> {
    let doc = catalog.register_document(&args.key, args.value.as_bytes(), args.descriptor.as_bytes())?;
    Ok(render_registered(&doc, format))
}

fn cmd_read(catalog: &Catalog<FileKvStore>, args: ReadArgs, format: OutputFormat) -> anyhow::Result<String> {
    let value = catalog.read_value(&args.key)?;
    let text = String::from_utf8_lossy(&value);
    Ok(match format {
        OutputFormat::Json => json!({ "key": args.key, "value": text }).to_string(),
        OutputFormat::Text => text.into_owned(),
    })
}

fn cmd_list(catalog: &Catalog<FileKvStore>, args: ListArgs, format: OutputFormat) -> anyhow::Result<String> {
    let request = PageRequest::parse(&args.page, &args.size)?;
    let page = catalog.list_documents(request)?;
    Ok(render_page(&page, format))
}

fn cmd_count(catalog: &Catalog<FileKvStore>, format: OutputFormat) -> anyhow::Result<String> {
    let count = catalog.document_count()?;
    Ok(match format {
        OutputFormat::Json => json!({ "count": count }).to_string(),
        OutputFormat::Text => format!("{} documents registered", count.to_string().bold()),
    })
}

fn render_registered(doc: &RegisteredDocument, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json!({
            "key": doc.key,
            "sequence": doc.sequence,
            "descriptor_key": doc.descriptor_key,
            "descriptor": String::from_utf8_lossy(&doc.descriptor),
        })
        .to_string(),
        OutputFormat::Text => format!(
            "{} Registered {} as {}",
            "✓".green().bold(),
            doc.key.yellow(),
            doc.descriptor_key.cyan()
        ),
    }
}

fn render_page(page: &DocumentPage, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let items: Vec<_> = page.items.iter().map(|d| String::from_utf8_lossy(d)).collect();
            json!({
                "items": items,
                "start": page.start,
                "end": page.end,
                "total": page.total,
            })
            .to_string()
        }
        OutputFormat::Text => {
            let mut lines: Vec<String> = page
                .items
                .iter()
                .zip(page.start..)
                .map(|(d, i)| format!("{}  {}", descriptor_key(i).cyan(), String::from_utf8_lossy(d)))
                .collect();
            if page.items.is_empty() {
                lines.push("No documents in range.".dimmed().to_string());
            }
            lines.push(format!(
                "Documents {}-{} of {}",
                page.start, page.end, page.total
            ));
            lines.join("\n")
        }
    }
}
