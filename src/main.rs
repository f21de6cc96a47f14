// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use actix::Actor;
use clap::Parser;
use log::{error, info};
use mr24hpc1::binding::bind_entities;
use mr24hpc1::configuration::{DEF_CONFIG_FILE, ENV_FRAME_TRACING, get_configuration};
use mr24hpc1::host::{ConsoleSink, HostCommand, execute};
use mr24hpc1::radar::{Radar, Subscribe, WatchConnection};
use mr24hpc1::transport::open_transport;
use mr24hpc1::util::bool_from_env;
use mr24hpc1::{APP_VERSION, built_info};
use std::path::Path;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

#[derive(Parser, Debug)]
#[command(version = APP_VERSION, about = "Seeed MR24HPC1 mmWave radar console", long_about = None, author = "Unfolded Circle ApS")]
struct Opt {
    /// Configuration file (yaml or json).
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

#[actix::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();
    let cfg_file = match opt.config.as_deref() {
        None => {
            if Path::new(DEF_CONFIG_FILE).exists() {
                info!("Loading default configuration file: {DEF_CONFIG_FILE}");
                Some(DEF_CONFIG_FILE)
            } else {
                None
            }
        }
        Some(c) => Some(c),
    };
    let cfg = get_configuration(cfg_file)?;

    info!(
        "{} {APP_VERSION} connecting to radar: {}",
        built_info::PKG_NAME,
        cfg.radar.url
    );
    let transport = open_transport(&cfg.radar.url).await?;
    let radar = Radar::start(
        built_info::PKG_NAME,
        transport,
        &cfg.radar,
        bool_from_env(ENV_FRAME_TRACING),
    );
    let bound = bind_entities(&cfg.entities, &radar).await?;
    if !bound.is_empty() {
        info!("Optional entities: {}", bound.join(", "));
    }

    let (closed_tx, mut closed_rx) = oneshot::channel();
    let console = ConsoleSink::new(closed_tx).start();
    radar.send(Subscribe(console.clone().recipient())).await?;
    radar.send(WatchConnection(console.recipient())).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input, exiting");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let output = match HostCommand::from_str(&line) {
                    Ok(cmd) => execute(cmd, &radar).await,
                    Err(e) => Err(e),
                };
                match output {
                    Ok(output) => output.iter().for_each(|l| println!("{l}")),
                    Err(e) => error!("{e}"),
                }
            }
            _ = &mut closed_rx => {
                info!("Radar connection closed, exiting");
                break;
            }
        }
    }

    Ok(())
}
