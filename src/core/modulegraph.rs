//! Workflow modularisation: collapse every rule of a module into one node.

use crate::core::dot::RuleGraph;
use crate::domain::model::GraphFormat;
use crate::domain::ports::GraphRenderer;
use crate::utils::error::{EcUtilsError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const MODULE_NODE_COLOR: &str = "0 0 0";
const MODULE_NODE_STYLE: &str = "diagonals";

/// Wraps the rules of each module into a single node.
///
/// A rule belongs to a module when its label starts with the module prefix.
/// Edges inside a module are dropped; edges crossing the module boundary are
/// redirected to the module node. Prefixes are applied in order, and module
/// nodes from earlier prefixes are never absorbed by later ones.
pub fn modularise<S: AsRef<str>>(rulegraph: &RuleGraph, module_prefixes: &[S]) -> Result<RuleGraph> {
    let mut modulegraph = rulegraph.clone();
    let mut module_nodes: HashSet<String> = HashSet::new();

    for prefix in module_prefixes {
        let prefix = prefix.as_ref();

        let members: HashSet<String> = modulegraph
            .nodes()
            .iter()
            .filter(|node| !module_nodes.contains(&node.id))
            .filter(|node| {
                modulegraph
                    .label(&node.id)
                    .is_some_and(|label| label.starts_with(prefix))
            })
            .map(|node| node.id.clone())
            .collect();

        if members.is_empty() {
            return Err(EcUtilsError::PrefixNotFound {
                prefix: prefix.to_string(),
            });
        }

        modulegraph.add_node(
            prefix,
            vec![
                ("label".to_string(), prefix.to_string()),
                ("color".to_string(), MODULE_NODE_COLOR.to_string()),
                ("style".to_string(), MODULE_NODE_STYLE.to_string()),
            ],
        );

        let edges: Vec<(String, String)> = modulegraph
            .edges()
            .iter()
            .map(|edge| (edge.from.clone(), edge.to.clone()))
            .collect();

        for (from, to) in edges {
            match (members.contains(&from), members.contains(&to)) {
                // 模組內部的邊
                (true, true) => modulegraph.remove_edge(&from, &to),
                // 模組輸出
                (true, false) => modulegraph.add_edge(prefix, &to, Vec::new()),
                // 模組輸入
                (false, true) => modulegraph.add_edge(&from, prefix, Vec::new()),
                (false, false) => {}
            }
        }

        for member in &members {
            modulegraph.remove_node(member);
        }
        module_nodes.insert(prefix.to_string());

        tracing::debug!("Collapsed {} rules into module '{}'", members.len(), prefix);
    }

    Ok(modulegraph)
}

/// 讀取 snakemake 產生的 .dot 檔
pub fn read_rulegraph(snakemake_dotfile: &Path) -> Result<RuleGraph> {
    if !snakemake_dotfile.to_string_lossy().ends_with(".dot") {
        return Err(EcUtilsError::InvalidGraphFile {
            path: snakemake_dotfile.display().to_string(),
        });
    }

    let source = fs::read_to_string(snakemake_dotfile)?;
    let graph = RuleGraph::parse(&source)?;
    tracing::debug!(
        "Read rule graph with {} rules and {} edges from {}",
        graph.nodes().len(),
        graph.edges().len(),
        snakemake_dotfile.display()
    );
    Ok(graph)
}

/// Writes a simplified DAG with a single node per module.
///
/// `GraphFormat::Dot` writes DOT text directly; other formats go through
/// `renderer`.
pub fn write_snakemake_modulegraph<R: GraphRenderer + ?Sized, S: AsRef<str>>(
    renderer: &R,
    snakemake_dotfile: &Path,
    output_path: &Path,
    prefixes: &[S],
    format: GraphFormat,
) -> Result<()> {
    let rulegraph = read_rulegraph(snakemake_dotfile)?;
    let modulegraph = modularise(&rulegraph, prefixes)?;
    let dot_source = modulegraph.to_dot();

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match format {
        GraphFormat::Dot => fs::write(output_path, dot_source)?,
        GraphFormat::Png => renderer.render(&dot_source, format, output_path)?,
    }

    tracing::info!("Module graph written to {}", output_path.display());
    Ok(())
}

/// Creates a PNG file with a single node per module, rendered with Graphviz.
pub fn write_snakemake_modulegraph_png<S: AsRef<str>>(
    snakemake_dotfile: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    prefixes: &[S],
) -> Result<()> {
    let renderer = crate::adapters::graphviz::GraphvizRenderer::default();
    write_snakemake_modulegraph(
        &renderer,
        snakemake_dotfile.as_ref(),
        output_path.as_ref(),
        prefixes,
        GraphFormat::Png,
    )
}

/// Same as [`write_snakemake_modulegraph_png`], but writes DOT text.
pub fn write_snakemake_modulegraph_dot<S: AsRef<str>>(
    snakemake_dotfile: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    prefixes: &[S],
) -> Result<()> {
    let renderer = crate::adapters::graphviz::GraphvizRenderer::default();
    write_snakemake_modulegraph(
        &renderer,
        snakemake_dotfile.as_ref(),
        output_path.as_ref(),
        prefixes,
        GraphFormat::Dot,
    )
}
