//! # Blueprint Compiler
//!
//! Main entry points for compiling blueprint graphs to TypeScript.

use crate::codegen::{self, Analysis, BlueprintCodeGenerator};
use crate::config::{CompilerOptions, HelperMode};
use crate::diagnostics::Diagnostic;
use crate::document::BlueprintDocument;
use crate::graph::Blueprint;
use crate::metadata::NodeCatalog;
use serde::Serialize;

/// Everything one compilation produces.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The generated TypeScript unit.
    pub source: String,
    pub analysis: Analysis,
    /// Degradations the generator worked around, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

/// One blueprint's output within a project build.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub blueprint_id: String,
    /// Suggested file name, `{unit name}.ts`.
    pub file_name: String,
    pub output: CompileOutput,
}

#[derive(Debug, Clone)]
pub struct ProjectOutput {
    pub units: Vec<CompiledUnit>,
    /// The shared helper module; present only when some unit imports from it.
    pub helper_library: Option<String>,
}

/// Summary of a compile, as the CLI prints it with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport<'a> {
    pub blueprint: &'a str,
    pub analysis: &'a Analysis,
    pub diagnostics: &'a [Diagnostic],
}

/// Compile a blueprint to TypeScript source with default options
///
/// This is the main entry point for the compiler. It never fails: missing
/// definitions, dangling connections and unsupported node kinds degrade to
/// comments in the output. Use [`compile_with_options`] to see what was
/// degraded.
///
/// # Arguments
///
/// * `blueprint` - The blueprint graph to compile
/// * `catalog` - Node definitions the blueprint's instances refer to
///
/// # Examples
///
/// ```rust
/// use bgc::{compile, Blueprint, BlueprintType, NodeCatalog};
///
/// let catalog = NodeCatalog::builtin();
/// let blueprint = Blueprint::scaffold("Greeter", BlueprintType::Function, &catalog);
/// let source = compile(&blueprint, &catalog);
/// assert!(source.contains("export function BP_Greeter(): void {"));
/// ```
pub fn compile(blueprint: &Blueprint, catalog: &NodeCatalog) -> String {
    compile_with_options(blueprint, catalog, &CompilerOptions::default()).source
}

/// Compile a blueprint and return the source together with the analysis
/// record and any diagnostics
///
/// # Arguments
///
/// * `blueprint` - The blueprint graph to compile
/// * `catalog` - Node definitions the blueprint's instances refer to
/// * `options` - Shape of the generated code
pub fn compile_with_options(blueprint: &Blueprint, catalog: &NodeCatalog, options: &CompilerOptions) -> CompileOutput {
    tracing::info!("[BGC] Starting blueprint compilation");
    tracing::info!(
        "[BGC] Blueprint: {} ({}, {} nodes, {} connections)",
        blueprint.name,
        blueprint.kind,
        blueprint.nodes.len(),
        blueprint.connections.len()
    );

    // Phase 1: Index connections and allocate temporaries
    tracing::info!("[BGC] Phase 1: Indexing graph...");
    let generator = BlueprintCodeGenerator::new(blueprint, catalog, options);

    // Phase 2: Walk execution flow and assemble
    tracing::info!("[BGC] Phase 2: Generating TypeScript...");
    let program = generator.generate_program();

    if program.diagnostics.is_empty() {
        tracing::info!("[BGC] Compilation successful!");
    } else {
        tracing::info!(
            "[BGC] Compilation finished with {} diagnostic(s)",
            program.diagnostics.len()
        );
    }

    CompileOutput {
        source: program.source,
        analysis: program.analysis,
        diagnostics: program.diagnostics,
    }
}

/// Compile every blueprint of a project
///
/// Each blueprint is compiled independently. The helper library is produced
/// once, and only if the helpers are imported rather than inlined and at
/// least one unit uses one.
pub fn compile_project<'b>(
    blueprints: impl IntoIterator<Item = &'b Blueprint>,
    catalog: &NodeCatalog,
    options: &CompilerOptions,
) -> ProjectOutput {
    let units: Vec<CompiledUnit> = blueprints
        .into_iter()
        .map(|blueprint| CompiledUnit {
            blueprint_id: blueprint.id.clone(),
            file_name: format!("{}.ts", codegen::unit_name(blueprint, options)),
            output: compile_with_options(blueprint, catalog, options),
        })
        .collect();

    let needs_library = options.helper_mode == HelperMode::Import
        && units.iter().any(|unit| !unit.output.analysis.helpers.is_empty());
    tracing::info!(
        "[BGC] Compiled {} blueprint(s); helper library {}",
        units.len(),
        if needs_library { "emitted" } else { "not needed" }
    );

    ProjectOutput {
        units,
        helper_library: needs_library.then(codegen::generate_helper_library),
    }
}

/// The shared helper module every generated unit imports from
pub fn generate_helper_library() -> String {
    codegen::generate_helper_library()
}

/// Compile a loaded document with its embedded node definitions
///
/// Definitions stored in the document extend `catalog`; ids already in the
/// catalog keep the catalog's version.
pub fn compile_document(document: &BlueprintDocument, catalog: &NodeCatalog, options: &CompilerOptions) -> CompileOutput {
    let mut merged = catalog.clone();
    let added = merged.merge(document.node_definitions.iter().cloned());
    if added > 0 {
        tracing::debug!("[BGC] Document contributed {} node definition(s)", added);
    }
    compile_with_options(&document.blueprint, &merged, options)
}
