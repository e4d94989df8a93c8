//! querycoord Balancer CLI
//!
//! Loads a topology snapshot and prints the balance plans the coordinator
//! would hand to its executor:
//! - `add-node` - placement of a joining node
//! - `remove-node` - redistribution for a leaving node
//! - `rebalance` - periodic skew correction
//! - `validate` - check a snapshot without planning

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use querycoord_balancer::{
    summarize_plans, BalancePlan, Balancer, BalancerConfig, OutputFormat, ReplicaBalancer,
};
use querycoord_core::NodeId;
use querycoord_metadata::TopologySnapshot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "querycoord-balancer")]
#[command(about = "Replica placement planner for the query coordinator")]
#[command(version)]
struct Cli {
    /// Topology snapshot (.toml or .json); overrides QUERYCOORD_SNAPSHOT
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Plan output format; overrides QUERYCOORD_OUTPUT
    #[arg(long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan placement for a node joining the cluster
    AddNode {
        /// ID of the joining node
        node_id: NodeId,
    },

    /// Plan redistribution for a node leaving the cluster
    RemoveNode {
        /// ID of the departing node
        node_id: NodeId,
    },

    /// Plan skew-reducing moves
    Rebalance,

    /// Load and validate the snapshot
    Validate,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout carries only plans
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn render(plans: &[BalancePlan], format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(plans)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(plans)?,
        OutputFormat::Text if plans.is_empty() => "no plans".to_string(),
        OutputFormat::Text => plans
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BalancerConfig::from_env(cli.output)?;
    if let Some(path) = cli.snapshot {
        config.snapshot_path = Some(path);
    }
    config.log_json |= cli.log_json;

    init_tracing(config.log_json);

    let path = config.snapshot_path()?;
    let snapshot = TopologySnapshot::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;

    if let Commands::Validate = cli.command {
        snapshot.validate().context("snapshot is invalid")?;
        println!("{}", snapshot.summary());
        return Ok(());
    }

    let (meta, cluster) = snapshot.into_views().context("snapshot is invalid")?;
    let balancer = ReplicaBalancer::new(Arc::new(meta), Arc::new(cluster));

    let plans = match cli.command {
        Commands::AddNode { node_id } => balancer.add_node(node_id)?,
        Commands::RemoveNode { node_id } => balancer.remove_node(node_id),
        Commands::Rebalance => balancer.rebalance(),
        Commands::Validate => Vec::new(),
    };

    info!(summary = %summarize_plans(&plans), "Planning complete");
    println!("{}", render(&plans, config.output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use querycoord_core::ReplicaId;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_node() {
        let cli = Cli::parse_from([
            "querycoord-balancer",
            "--snapshot",
            "cluster.toml",
            "add-node",
            "42",
        ]);
        assert!(matches!(cli.command, Commands::AddNode { node_id } if node_id.get() == 42));
        assert_eq!(cli.snapshot, Some(PathBuf::from("cluster.toml")));
    }

    #[test]
    fn test_render_text() {
        let plans = vec![BalancePlan::assign(vec![NodeId::new(4)], ReplicaId::new(2))];
        assert_eq!(
            render(&plans, OutputFormat::Text).unwrap(),
            "assign [4] -> replica 2"
        );
        assert_eq!(render(&[], OutputFormat::Text).unwrap(), "no plans");
        assert_eq!(render(&[], OutputFormat::Json).unwrap(), "[]");
    }
}
