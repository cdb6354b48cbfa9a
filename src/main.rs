use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use log::info;

use hospital_records::auth::user_interface::{
    handle_authenticated_session, main_auth_flow, MainAuthResult,
};
use hospital_records::config::ConfigOverrides;
use hospital_records::utils::logging::initialize_logging;
use hospital_records::{AppConfig, CredentialService, RecordStore, SessionController};

fn cli() -> Command {
    Command::new("hospital-records")
        .about("Interactive patient and doctor record keeping")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .env("HOSPITAL_DATA_DIR")
                .help("Directory holding users.json, patients.json and doctors.json")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON config file (defaults to <data-dir>/config.json when present)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Log file (defaults to <data-dir>/application.log)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = AppConfig::resolve(ConfigOverrides {
        data_dir: matches.get_one::<PathBuf>("data-dir").cloned(),
        config_file: matches.get_one::<PathBuf>("config").cloned(),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        verbose: matches.get_flag("verbose"),
    })?;

    initialize_logging(&config.log_path(), config.level_filter()?)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let store = RecordStore::open(&config.data_dir).with_context(|| {
        format!("cannot open data directory {}", config.data_dir.display())
    })?;
    info!("Using data directory {}", store.root().display());

    let credentials = CredentialService::new(&store, config.hasher());
    let mut session = SessionController::new();

    match run(&store, &credentials, &mut session) {
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => info!("Input closed, exiting"),
        other => other.context("interactive session failed")?,
    }

    info!("Session ended");
    Ok(())
}

/// Cycle between the login screen and the main menu until the user exits
fn run(
    store: &RecordStore,
    credentials: &CredentialService<'_>,
    session: &mut SessionController,
) -> io::Result<()> {
    loop {
        match main_auth_flow(credentials, session)? {
            MainAuthResult::LoggedIn => handle_authenticated_session(store, session)?,
            MainAuthResult::Exit => return Ok(()),
        }
    }
}
