use anyhow::{anyhow, Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use targetsync::config::ProxyConfig;
use targetsync::infrastructure::proxy::{log_proxy_event, ProxyLabel, ProxyRegistration};
use targetsync::TcpProxy;

use super::project::Project;

pub(crate) fn cmd_proxy(project: &Project, port: Option<i64>, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run_proxies(project, port, json))
}

async fn run_proxies(project: &Project, only_port: Option<i64>, json: bool) -> Result<()> {
    let config = project.config();
    let registry = project.session.proxies();
    let default_port = i64::from(config.default_proxy_port());
    let workspace = project
        .session
        .workspaces()
        .first()
        .map(|ws| ws.name.clone())
        .unwrap_or_default();

    let mut registrations: Vec<ProxyRegistration> = Vec::new();
    let mut running: Vec<TcpProxy> = Vec::new();

    for settings in &config.proxies {
        let port = settings.port.unwrap_or(default_port);
        if only_port.is_some_and(|only| only != port) {
            continue;
        }
        let proxy = match settings.bind {
            Some(bind) => {
                let port = u16::try_from(port).map_err(|_| anyhow!("invalid proxy port {}", port))?;
                registry.get_tcp_proxy_on(port, bind)
            }
            None => registry.get_tcp_proxy(port)?,
        };
        registrations.extend(register(&proxy, settings, &workspace));
        running.push(proxy);
    }

    if running.is_empty() {
        return Err(match only_port {
            Some(port) => anyhow!("no proxy configured on port {}", port),
            None => anyhow!("no [[proxies]] configured"),
        });
    }

    for proxy in &running {
        let mut events = proxy.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        log_proxy_event(&event);
                        if json {
                            println!("{}", serde_json::json!({
                                "event": event.name(),
                                "details": format!("{:?}", event),
                            }));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "proxy event log fell behind")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        proxy.start().await?;
        let addr = proxy
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        info!(proxy = %proxy.display_name(), %addr, "proxy listening");
        if !json {
            println!("{} listening on {}", proxy.display_name(), addr);
            for destination in proxy.destinations() {
                println!("  -> {}:{}", destination.addr, destination.port);
            }
        }
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    drop(registrations);
    registry.dispose_all().await;
    if !json {
        println!("Stopped");
    }
    Ok(())
}

fn register(proxy: &TcpProxy, settings: &ProxyConfig, workspace: &str) -> Vec<ProxyRegistration> {
    let mut registrations: Vec<ProxyRegistration> = settings
        .destinations
        .iter()
        .map(|d| proxy.add_destination(d.addr.clone(), d.port))
        .collect();

    if !settings.allow.is_empty() {
        let allow = settings.clone();
        registrations.push(proxy.add_filter(move |remote| allow.allows(remote)));
    }

    if let Some(name) = settings.name.clone() {
        let description = settings.description.clone();
        registrations.push(proxy.set_name_resolver(workspace, move || {
            Some(ProxyLabel {
                name: name.clone(),
                description: description.clone(),
            })
        }));
    }
    registrations
}
