mod app_logic;
mod core;

use crate::app_logic::EditorSession;
use crate::app_logic::session::DEFAULT_ARCHIVE_NAME;
use crate::core::{
    ConfigManagerOperations, CoreArchiver, CoreConfigManager, CoreUploadIngester,
    FileSystemNode, GeminiRewriteService, collect_folder_entries,
};
use clap::Parser;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const APP_NAME: &str = "TreeEditorApp";

/*
 * Open a folder as an editable file tree, optionally run one AI rewrite
 * against a file in it, and pack the result into a zip archive.
 */
#[derive(Parser)]
#[command(name = "tree_editor", version, about = "Edit a folder tree and pack it into a zip")]
struct Cli {
    /// Folder to open. Defaults to the last opened folder.
    folder: Option<PathBuf>,

    /// Tree path of the file to rewrite, e.g. "myproj/src/main.rs".
    #[arg(long, requires = "instruction")]
    file: Option<String>,

    /// Natural-language instruction for the AI rewrite.
    #[arg(long, requires = "file")]
    instruction: Option<String>,

    /// Where to write the zip archive.
    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    output: PathBuf,

    /// Only list the tree; do not write an archive.
    #[arg(long)]
    no_archive: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let log_config = ConfigBuilder::new()
        .set_time_format_custom(time::macros::format_description!(
            "[hour]:[minute]:[second]"
        ))
        .build();
    if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Mixed, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn remembered_folder(config_manager: &dyn ConfigManagerOperations) -> Option<PathBuf> {
    match config_manager.load_last_folder_path(APP_NAME) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("Could not load the remembered folder: {e}");
            None
        }
    }
}

fn print_tree(nodes: &[FileSystemNode], depth: usize) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        if node.is_dir() {
            println!("{indent}{}/", node.name());
            print_tree(node.children().unwrap_or(&[]), depth + 1);
        } else {
            println!("{indent}{}", node.name());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_manager = CoreConfigManager::new();
    let Some(folder) = cli
        .folder
        .clone()
        .or_else(|| remembered_folder(&config_manager))
    else {
        log::error!("No folder given and no previously opened folder remembered.");
        return ExitCode::FAILURE;
    };

    let mut session = EditorSession::new(
        Arc::new(CoreUploadIngester::new()),
        Arc::new(GeminiRewriteService::from_env()),
        Arc::new(CoreArchiver::new()),
    );

    let entries = match collect_folder_entries(&folder) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Failed to open folder {folder:?}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if !session.load_entries(&entries) {
        if let Some(msg) = session.last_error() {
            log::error!("{msg}");
        }
        return ExitCode::FAILURE;
    }
    if let Err(e) = config_manager.save_last_folder_path(APP_NAME, Some(&folder)) {
        log::warn!("Could not remember the opened folder: {e}");
    }

    print_tree(session.file_tree(), 0);

    if let (Some(file), Some(instruction)) = (cli.file.as_deref(), cli.instruction.as_deref()) {
        if !session.select_file(file) {
            log::error!("No file at path {file:?} in the loaded tree.");
            return ExitCode::FAILURE;
        }
        if !session.submit_rewrite(instruction) {
            if let Some(msg) = session.last_error() {
                log::error!("{msg}");
            }
            return ExitCode::FAILURE;
        }
        log::info!("Applied the AI rewrite to {file:?}.");
    }

    if !cli.no_archive {
        let Some(bytes) = session.archive_bytes() else {
            if let Some(msg) = session.last_error() {
                log::error!("{msg}");
            }
            return ExitCode::FAILURE;
        };
        if let Err(e) = fs::write(&cli.output, bytes) {
            log::error!("Failed to write archive {:?}: {e}", cli.output);
            return ExitCode::FAILURE;
        }
        log::info!("Wrote archive to {:?}.", cli.output);
    }

    ExitCode::SUCCESS
}
