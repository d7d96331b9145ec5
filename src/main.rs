//! # Memoria CLI
//!
//! Usage:
//!   memoria init
//!   memoria add profile square
//!   memoria move <id> 4 0
//!   memoria resize <id> 2 -1
//!   memoria show
//!
//! Every mutating command loads the page, applies one operation and saves.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use cli::{Cli, Commands};
use memoria::layout::{self, ResizeOutcome, Resolution};
use memoria::logging::{filter_directive, init_tracing};
use memoria::session::PREDEFINED_COLORS;
use memoria::{BlockId, Config, DragOutcome, FileStore, MemoriaError, Session};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, MemoriaError> {
    let mut config = Config::discover(cli.config.as_deref())?;
    init_tracing(&filter_directive(config.log_filter.as_deref(), cli.verbose));

    if cli.user.is_some() {
        config.user_id = cli.user;
    }
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    let mut store = FileStore::new(&config.storage_dir);

    let mut session = match cli.command {
        Commands::Init { force } => return init(&mut store, &config, force),
        _ => Session::open(&store, &config)?,
    };

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Add { kind, template } => {
            let id = session.add_block(kind, &template)?;
            session.apply_settings()?;
            if let Some(block) = session.block(&id) {
                println!(
                    "{id} at row {}, column {} ({}×{})",
                    block.position.row, block.position.column, block.size.width, block.size.height
                );
            }
        }
        Commands::Move { id, row, column } => {
            let id = BlockId::from(id);
            let outcome = session.drag_stop(&id, row, column)?;
            report_drag(&session, &id, outcome);
        }
        Commands::Drag { id, x, y } => {
            let id = BlockId::from(id);
            let outcome = session.drag_stop_pixels(&id, x, y)?;
            report_drag(&session, &id, outcome);
        }
        Commands::Resize {
            id,
            delta_width,
            delta_height,
        } => {
            let id = BlockId::from(id);
            match session.resize_block(&id, delta_width, delta_height)? {
                ResizeOutcome::Resized {
                    size,
                    displaced,
                    unsettled,
                } => {
                    println!("{id} is now {}×{}", size.width, size.height);
                    for other in displaced {
                        println!("  pushed {other}");
                    }
                    for other in unsettled {
                        println!("  {other} still overlaps");
                    }
                }
                ResizeOutcome::Unchanged => println!("{id} unchanged"),
                ResizeOutcome::Blocked { by } => {
                    warn!(block = %id, pinned = %by, "resize blocked");
                    println!("{id} cannot grow over pinned block {by}");
                    return Ok(ExitCode::FAILURE);
                }
                ResizeOutcome::NotFound => {
                    println!("no block with id '{id}'");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Delete { id } => {
            let id = BlockId::from(id);
            session.delete_block(&id)?;
            println!("deleted {id}");
        }
        Commands::Pin { id } => {
            let id = BlockId::from(id);
            let pinned = session.toggle_fixed(&id)?;
            println!("{id} {}", if pinned { "pinned" } else { "unpinned" });
        }
        Commands::Background { color } => {
            let hex = PREDEFINED_COLORS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&color))
                .map_or(color.as_str(), |(_, hex)| *hex);
            session.set_background_color(hex)?;
        }
        Commands::Map { show } => session.set_show_on_map(show)?,
        Commands::Show => {
            print_grid(&session);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Check => {
            let violations = layout::validate(session.blocks());
            if violations.is_empty() {
                println!("✓ {} blocks, no violations", session.blocks().len());
                return Ok(ExitCode::SUCCESS);
            }
            for violation in &violations {
                println!("✗ {violation}");
            }
            return Ok(ExitCode::FAILURE);
        }
        Commands::Export { pretty } => {
            let data = memoria::PageData::from_page(session.page(), session.user_id());
            let json = if pretty {
                serde_json::to_string_pretty(&data)
            } else {
                serde_json::to_string(&data)
            }
            .map_err(memoria::StoreError::Serialize)?;
            println!("{json}");
            return Ok(ExitCode::SUCCESS);
        }
    }

    session.save(&mut store)?;
    Ok(ExitCode::SUCCESS)
}

fn init(store: &mut FileStore, config: &Config, force: bool) -> Result<ExitCode, MemoriaError> {
    let existing = memoria::store::load_page(&*store, config.user_id.as_deref());
    if matches!(existing, Ok(Some(_))) && !force {
        eprintln!("✗ A page is already stored; use --force to replace it");
        return Ok(ExitCode::FAILURE);
    }
    Session::new(config.user_id.clone()).save(store)?;
    eprintln!("✓ Empty page written to {}", store.dir().display());
    Ok(ExitCode::SUCCESS)
}

fn report_drag(session: &Session, id: &BlockId, outcome: DragOutcome) {
    let Some(block) = session.block(id) else {
        return;
    };
    let at = format!("row {}, column {}", block.position.row, block.position.column);
    match outcome {
        DragOutcome::Pinned => println!("{id} is pinned; not moved"),
        DragOutcome::Unchanged => println!("{id} already at {at}"),
        DragOutcome::Moved {
            resolution: Resolution::Relocated { .. },
        } => println!("{id} relocated to {at} to avoid overlap"),
        DragOutcome::Moved {
            resolution: Resolution::Unresolved { iterations },
        } => {
            warn!(block = %id, iterations, "overlap left unresolved");
            println!("{id} moved to {at}; overlap remains");
        }
        DragOutcome::Moved { .. } => println!("{id} moved to {at}"),
    }
}

fn print_grid(session: &Session) {
    let page = session.page();
    println!(
        "background {}  map {}",
        page.background_color,
        if page.show_on_map { "on" } else { "off" }
    );
    print!("{}", layout::render_ascii(&page.blocks));
    for (index, block) in page.blocks.iter().enumerate() {
        println!(
            "  {} {} {}/{} at ({}, {}) {}×{}{}",
            layout::ascii_label(index),
            block.id,
            block.kind,
            block.template,
            block.position.row,
            block.position.column,
            block.size.width,
            block.size.height,
            if block.is_fixed { " pinned" } else { "" }
        );
    }
}
