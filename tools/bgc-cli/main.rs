use bgc::storage::is_valid_file_name;
use bgc::{
    compile_document, compile_project, generate_helper_library, Blueprint, BlueprintDocument, BlueprintType,
    CompileReport, CompilerOptions, DirectoryPersistence, HelperMode, NodeCatalog, Persistence,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindCli {
    Function,
    Component,
}

impl From<KindCli> for BlueprintType {
    fn from(kind: KindCli) -> Self {
        match kind {
            KindCli::Function => BlueprintType::Function,
            KindCli::Component => BlueprintType::Component,
        }
    }
}

/// Blueprint Graph Compiler: turns blueprint node graphs into TypeScript
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project root holding catalog.json, blueprints/ and scripts/
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Path to a JSON file with compiler options
    #[arg(short, long, global = true)]
    options: Option<PathBuf>,

    /// Paste helper bodies into each unit instead of importing them
    #[arg(long, global = true)]
    inline_helpers: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a single .bp document
    Compile {
        /// Path to the blueprint document
        input: PathBuf,
        /// Write the TypeScript here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the analysis and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile every blueprint in the project into scripts/
    Build,
    /// Print the shared helper library
    Helpers {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the node definitions available to the project
    Catalog,
    /// Create a new blueprint document with its entry nodes in place
    New {
        name: String,
        #[arg(short = 't', long = "type", value_enum, default_value = "function")]
        kind: KindCli,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = DirectoryPersistence::new(&cli.project);
    let options = load_options(&cli);

    match cli.command {
        Command::Compile { input, out, json } => run_compile(&storage, &options, &input, out.as_deref(), json),
        Command::Build => run_build(&storage, &options),
        Command::Helpers { out } => write_output(out.as_deref(), &generate_helper_library()),
        Command::Catalog => run_catalog(&storage),
        Command::New { name, kind } => run_new(&storage, &name, kind.into()),
    }
}

fn load_options(cli: &Cli) -> CompilerOptions {
    let options = match &cli.options {
        Some(path) => CompilerOptions::load(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load options '{}': {}", path.display(), e))),
        None => CompilerOptions::default(),
    };
    if cli.inline_helpers {
        options.with_helper_mode(HelperMode::Inline)
    } else {
        options
    }
}

fn load_catalog(storage: &DirectoryPersistence) -> NodeCatalog {
    storage
        .load_catalog()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load node catalog: {}", e)))
}

fn run_compile(storage: &DirectoryPersistence, options: &CompilerOptions, input: &Path, out: Option<&Path>, json: bool) {
    let start = Instant::now();
    let text = fs::read_to_string(input)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read blueprint file '{}': {}", input.display(), e)));
    let document = BlueprintDocument::deserialize(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load blueprint '{}': {}", input.display(), e)));
    let catalog = load_catalog(storage);

    let output = compile_document(&document, &catalog, options);
    write_output(out, &output.source);

    if json {
        let report = CompileReport {
            blueprint: &document.name,
            analysis: &output.analysis,
            diagnostics: &output.diagnostics,
        };
        let rendered = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize report: {}", e)));
        if out.is_some() {
            println!("{}", rendered);
        } else {
            eprintln!("{}", rendered);
        }
    } else {
        for diagnostic in &output.diagnostics {
            eprintln!("warning: {}", diagnostic);
        }
    }
    eprintln!("Compiled '{}' in {:?}", document.name, start.elapsed());
}

fn run_build(storage: &DirectoryPersistence, options: &CompilerOptions) {
    let start = Instant::now();
    let catalog = load_catalog(storage);
    let names = storage
        .list_blueprints()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to list blueprints: {}", e)));
    if names.is_empty() {
        println!("No blueprints found under {}", storage.blueprints_dir().display());
        return;
    }

    let mut documents = Vec::with_capacity(names.len());
    for name in &names {
        let document = storage
            .load_blueprint(name)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load blueprint '{}': {}", name, e)));
        documents.push(document);
    }

    let mut merged = catalog;
    for document in &documents {
        merged.merge(document.node_definitions.iter().cloned());
    }
    let project = compile_project(documents.iter().map(|d| &d.blueprint), &merged, options);

    for unit in &project.units {
        persist(storage, &unit.file_name, &unit.output.source);
        for diagnostic in &unit.output.diagnostics {
            eprintln!("warning: {}: {}", unit.file_name, diagnostic);
        }
    }
    if let Some(library) = &project.helper_library {
        let module = options.helper_module.trim_start_matches("./");
        persist(storage, &format!("{}.ts", module), library);
    }

    println!("Built {} blueprint(s) in {:?}", project.units.len(), start.elapsed());
}

fn run_catalog(storage: &DirectoryPersistence) {
    let catalog = load_catalog(storage);
    for (category, definitions) in catalog.by_category() {
        println!("{}", category);
        for definition in definitions {
            println!("  {:<20} {}", definition.id, definition.name);
        }
    }
}

fn run_new(storage: &DirectoryPersistence, name: &str, kind: BlueprintType) {
    if !is_valid_file_name(name) {
        exit_with_error(&format!("'{}' is not a valid blueprint name", name));
    }
    let catalog = load_catalog(storage);
    let blueprint = Blueprint::scaffold(name, kind, &catalog);
    let document = BlueprintDocument::with_catalog(blueprint, &catalog);
    match storage.save_document(&document) {
        Ok(Some(path)) => println!("Created {} blueprint at {}", kind, path.display()),
        Ok(None) => println!("Cancelled"),
        Err(e) => exit_with_error(&format!("Failed to save blueprint: {}", e)),
    }
}

fn persist(storage: &DirectoryPersistence, name: &str, text: &str) {
    match storage.persist(name, text) {
        Ok(Some(path)) => println!("Wrote {}", path.display()),
        Ok(None) => println!("Skipped {}", name),
        Err(e) => exit_with_error(&format!("Failed to write '{}': {}", name, e)),
    }
}

fn write_output(out: Option<&Path>, text: &str) {
    match out {
        Some(path) => fs::write(path, text)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))),
        None => print!("{}", text),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
