use anyhow::Context;
use clap::Subcommand;
use flowctl_core::{ActionType, FlowIdentity};
use std::path::Path;

use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum ActionsSubcommand {
    /// List pending actions, oldest first
    List,

    /// Remove a pending action once it has been processed
    Delete {
        flow_group: String,
        flow_name: String,
        #[arg(allow_negative_numbers = true)]
        flow_execution_id: i64,
        /// RESUME, KILL or LAUNCH (case-insensitive)
        action_type: String,
    },
}

pub fn run(root: &Path, subcmd: ActionsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ActionsSubcommand::List => list(root, json),
        ActionsSubcommand::Delete {
            flow_group,
            flow_name,
            flow_execution_id,
            action_type,
        } => delete(
            root,
            flow_group,
            flow_name,
            flow_execution_id,
            &action_type,
            json,
        ),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, store) = super::open_store(root)?;
    let actions = store
        .list_dag_actions()
        .context("failed to list dag actions")?;

    if json {
        let items: Vec<serde_json::Value> = actions
            .iter()
            .map(|a| {
                serde_json::json!({
                    "flow_group": a.flow.flow_group(),
                    "flow_name": a.flow.flow_name(),
                    "flow_execution_id": a.flow.flow_execution_id(),
                    "action": a.action_type,
                    "created_at": a.created_at,
                })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if actions.is_empty() {
        println!("No pending actions.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = actions
        .iter()
        .map(|a| {
            vec![
                a.flow.flow_group().to_string(),
                a.flow.flow_name().to_string(),
                a.flow.execution_id_str(),
                a.action_type.to_string(),
                a.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect();
    print_table(&["GROUP", "NAME", "EXECUTION", "ACTION", "CREATED"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

fn delete(
    root: &Path,
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
    action_type: &str,
    json: bool,
) -> anyhow::Result<()> {
    let action_type: ActionType = action_type.parse()?;
    let flow = FlowIdentity::new(flow_group, flow_name, flow_execution_id)?;
    let (_, store) = super::open_store(root)?;
    let deleted = store
        .delete_dag_action(&flow, action_type)
        .context("failed to delete dag action")?;

    if json {
        print_json(&serde_json::json!({
            "flow": flow.to_string(),
            "action": action_type,
            "deleted": deleted,
        }))?;
    } else if deleted {
        println!("Deleted pending {action_type} for {flow}");
    } else {
        println!("No pending {action_type} for {flow}");
    }
    Ok(())
}
