//! Deploy the built site to a static hosting branch.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

use super::config::ConfigFile;

/// Run the deploy command: build, then force-push the output directory as a
/// single commit on the hosting branch.
pub async fn run(config_path: &Path, remote: Option<String>, branch: Option<String>) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;

    let Some(remote) = remote.or_else(|| file_config.deploy.remote.clone()) else {
        bail!(
            "No deploy remote configured. Pass --remote or set [deploy] remote in {}",
            config_path.display()
        );
    };
    let branch = branch.unwrap_or_else(|| file_config.deploy.branch.clone());

    tracing::info!("Running initial build...");
    let result = super::build::run(config_path, None).await?;
    let output_dir = result.output_dir;

    if !output_dir.is_dir() {
        bail!(
            "The build directory {} does not exist",
            output_dir.display()
        );
    }

    for args in git_steps(&remote, &branch, &file_config.deploy.message) {
        run_git(&output_dir, &args).await?;
    }

    tracing::info!("Deployed {} to {} ({})", output_dir.display(), remote, branch);

    Ok(())
}

/// Git invocations run inside the output directory, in order.
fn git_steps(remote: &str, branch: &str, message: &str) -> Vec<Vec<String>> {
    let steps: [&[&str]; 6] = [
        &["init"],
        &["remote", "add", "origin", remote],
        &["checkout", "-B", branch],
        &["add", "."],
        &["commit", "-m", message],
        &["push", "--force", "--set-upstream", "origin", branch],
    ];

    steps
        .iter()
        .map(|args| args.iter().map(|a| a.to_string()).collect())
        .collect()
}

async fn run_git(dir: &Path, args: &[String]) -> Result<()> {
    tracing::info!("git {}", args.join(" "));

    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .status()
        .await
        .context("Failed to run git")?;

    if !status.success() {
        bail!("git {} failed with {}", args.join(" "), status);
    }

    Ok(())
}
