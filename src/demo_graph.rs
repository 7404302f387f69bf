use anyhow::Result;
use graph::{Direction, EngineConfig, MergeOutcome, MergeRequest};
use graph_session::{GraphSession, MutationGate, RefreshEvent};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    println!("Branch Graph Demo");
    println!("=================\n");

    let mut session = GraphSession::new("demo", EngineConfig::default(), MutationGate::new());

    let token = session.begin_fetch(&RefreshEvent::RepositoryChanged("demo".into()));
    let Some(rendered) = session.complete_fetch(token, &sample_payload())? else {
        return Ok(());
    };

    if let Some(graph) = session.graph() {
        let stats = graph.local.stats();
        println!("Local view:");
        println!("  Total commits: {}", stats.total_commits);
        println!("  Merge commits: {}", stats.merge_commits);
        println!("  Branch heads:  {}", stats.branch_heads);
        println!();
    }

    println!("Positions (oldest first):");
    for position in &rendered.local.positions {
        println!(
            "  ({:>4}, {:>4})  {:<8} {:<10} {}",
            position.x, position.y, position.short_hash, position.branch, position.message
        );
    }
    println!();

    println!("Labels:");
    for (branch, label) in &rendered.local.branch_labels {
        println!("  {:<10} {} at {}", branch, label.color, label.point.short_hash);
    }
    println!();

    let push = session.transfer("feature", Direction::Push);
    if let Some(push) = push {
        println!("Push feature: {} commit(s), files {:?}", push.commits.len(), push.files);
    }

    // merge feature into main and refetch
    let permit = session.begin_mutation()?;
    let outcome = MergeOutcome {
        fast_forward: false,
        merge_commit_hash: Some("e5f6a7b8c9d0".into()),
        has_conflict: false,
    };
    session.record_merge(&MergeRequest::new("feature", "main"), &outcome);
    drop(permit);

    let token = session.begin_fetch(&RefreshEvent::MergeApplied);
    if let Some(rendered) = session.complete_fetch(token, &merged_payload())? {
        let recent: Vec<_> = rendered
            .local
            .line_segments
            .values()
            .filter(|edge| edge.recent)
            .map(|edge| edge.key())
            .collect();
        println!("Highlighted edges after merge: {:?}", recent);
    }

    Ok(())
}

fn base_commits() -> Vec<serde_json::Value> {
    vec![
        json!({ "hash": "d4e5f6a7b8c9", "message": "Add feature docs", "author": "Ada",
                "parents": ["b2c3d4e5f6a7"], "branches": ["feature"], "isHead": "feature",
                "files": ["docs/feature.md"] }),
        json!({ "hash": "c3d4e5f6a7b8", "message": "Fix release build", "author": "Grace",
                "parents": ["a1b2c3d4e5f6"], "branches": ["main"], "isHead": "main",
                "files": ["Cargo.toml"] }),
        json!({ "hash": "b2c3d4e5f6a7", "message": "Start feature", "author": "Ada",
                "parents": ["a1b2c3d4e5f6"], "branches": ["feature"],
                "files": ["src/feature.rs"] }),
        json!({ "hash": "a1b2c3d4e5f6", "message": "Initial commit", "author": "Ada",
                "parents": [], "branches": ["main", "feature"] }),
    ]
}

fn sample_payload() -> serde_json::Value {
    json!({
        "currentBranch": "main",
        "commits": base_commits(),
        "branchHeads": { "main": "c3d4e5f", "feature": "d4e5f6a7b8c9" },
        "forkPoints": { "feature": "a1b2c3d4e5f6" },
        "remote": { "branchHeads": { "main": "c3d4e5f6a7b8", "feature": "b2c3d4e" } }
    })
}

fn merged_payload() -> serde_json::Value {
    let mut commits = vec![json!({
        "hash": "e5f6a7b8c9d0", "message": "Merge feature into main", "author": "Grace",
        "parents": ["c3d4e5f6a7b8", "d4e5f6a7b8c9"], "branches": ["main"], "isHead": "main"
    })];
    commits.extend(base_commits().into_iter().map(|mut commit| {
        if let Some(record) = commit.as_object_mut().filter(|c| c.get("isHead") == Some(&json!("main"))) {
            record.remove("isHead");
        }
        commit
    }));
    json!({
        "currentBranch": "main",
        "commits": commits,
        "branchHeads": { "main": "e5f6a7b8c9d0", "feature": "d4e5f6a7b8c9" },
        "forkPoints": { "feature": "a1b2c3d4e5f6" },
        "remote": { "branchHeads": { "main": "c3d4e5f6a7b8", "feature": "b2c3d4e" } }
    })
}
