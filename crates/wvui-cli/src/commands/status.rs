//! `wvui status` and `wvui meta`

use wvui_connection::{MonitorConfig, ProbeOutcome, StatusMonitor};

use crate::App;
use crate::output;

pub async fn run(app: &App, watch: bool) -> anyhow::Result<()> {
    let monitor = StatusMonitor::new(
        app.client.clone(),
        MonitorConfig::new(app.settings.monitor.poll_interval()),
    );

    if !watch {
        return match monitor.probe_now().await {
            ProbeOutcome::Published(status) => {
                println!("{}", output::status_line(&status));
                if status.connected {
                    Ok(())
                } else {
                    anyhow::bail!("backend unreachable")
                }
            }
            outcome => anyhow::bail!("status check did not complete: {outcome:?}"),
        };
    }

    let mut updates = monitor.subscribe();
    monitor.start();
    println!(
        "Watching {} every {}s, Ctrl-C to stop",
        app.client.base_url(),
        app.settings.monitor.poll_interval().as_secs()
    );

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                if let Some(status) = status {
                    println!(
                        "[{}] {}",
                        chrono::Local::now().format("%H:%M:%S"),
                        output::status_line(&status)
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    monitor.stop();
    Ok(())
}

pub async fn meta(app: &App) -> anyhow::Result<()> {
    let meta = app.client.get_meta().await?;
    println!("Host:    {}", meta.hostname);
    println!("Version: {}", meta.version);
    if meta.modules.is_empty() {
        println!("Modules: none");
    } else {
        let mut modules: Vec<_> = meta.modules.keys().map(String::as_str).collect();
        modules.sort_unstable();
        println!("Modules: {}", modules.join(", "));
    }
    Ok(())
}
