use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::{Dock, MoveDisposition};
use crate::io::library::{Library, ProfileUpdate};
use crate::io::settings::{Settings, read_settings};
use crate::model::profile::{LaunchMode, Profile};
use crate::ops::launch;
use crate::ops::order;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let library = open_library(cli.library.as_deref())?;

    match cli.command {
        // No subcommand → list
        None => cmd_list(&library, json),
        Some(cmd) => match cmd {
            Commands::List => cmd_list(&library, json),
            Commands::Show(args) => cmd_show(&library, args, json),
            Commands::Add(args) => cmd_add(&library, args),
            Commands::Edit(args) => cmd_edit(&library, args),
            Commands::Pin(args) => cmd_set_pinned(&library, &args.id, true),
            Commands::Unpin(args) => cmd_set_pinned(&library, &args.id, false),
            Commands::Mv(args) => cmd_mv(library, args),
            Commands::Rm(args) => cmd_rm(&library, args),
            Commands::Launch(args) => cmd_launch(&library, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_library(path: Option<&str>) -> Result<Library, Box<dyn std::error::Error>> {
    let library = match path {
        Some(path) => Library::open(path)?,
        None => Library::open_default()?,
    };
    Ok(library)
}

fn library_settings(library: &Library) -> Settings {
    let dir = library
        .path()
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));
    read_settings(dir)
}

/// Resolve a possibly-abbreviated id to a full profile. Accepts the exact
/// id, a unique id prefix, or a case-insensitive name match.
fn resolve_profile(library: &Library, query: &str) -> Result<Profile, Box<dyn std::error::Error>> {
    let profiles = library.profiles()?;

    if let Some(exact) = profiles.iter().find(|p| p.id == query) {
        return Ok(exact.clone());
    }

    let by_prefix: Vec<&Profile> = profiles
        .iter()
        .filter(|p| p.id.starts_with(query))
        .collect();
    match by_prefix.len() {
        1 => return Ok(by_prefix[0].clone()),
        0 => {}
        n => return Err(format!("ambiguous id prefix '{}' ({} matches)", query, n).into()),
    }

    let by_name: Vec<&Profile> = profiles
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(query))
        .collect();
    match by_name.len() {
        0 => Err(format!("no profile matches '{}'", query).into()),
        1 => Ok(by_name[0].clone()),
        n => Err(format!(
            "ambiguous: {} profiles named \"{}\". Specify by id instead.",
            n, query
        )
        .into()),
    }
}

fn resolve_directory(directory: &str) -> Result<String, Box<dyn std::error::Error>> {
    let abs = std::fs::canonicalize(directory)
        .map_err(|e| format!("cannot resolve directory '{}': {}", directory, e))?;
    Ok(abs.to_string_lossy().to_string())
}

fn display_position(profiles: &[Profile], id: &str) -> usize {
    profiles.iter().position(|p| p.id == id).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(library: &Library, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut profiles = library.profiles()?;
    order::sort_display(&mut profiles);

    if json {
        let records: Vec<ProfileJson> = profiles
            .iter()
            .enumerate()
            .map(|(position, p)| profile_to_json(p, position))
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for line in format_profile_listing(&profiles) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(library: &Library, args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(library, &args.id)?;
    let mut profiles = library.profiles()?;
    order::sort_display(&mut profiles);
    let position = display_position(&profiles, &profile.id);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&profile_to_json(&profile, position))?
        );
    } else {
        for line in format_profile_detail(&profile, position) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(library: &Library, args: AddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = library_settings(library).defaults;
    if args.custom {
        config.mode = LaunchMode::Custom;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = args.token {
        config.token = token;
    }
    if let Some(proxy) = args.proxy {
        config.proxy = proxy;
    }
    if args.dangerous {
        config.skip_permissions = true;
    }
    if args.safe {
        config.skip_permissions = false;
    }

    let directory = resolve_directory(&args.directory)?;
    let profile = library.create_profile(&args.name, &directory, config)?;
    println!("{}", profile.id);
    Ok(())
}

fn cmd_edit(library: &Library, args: EditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(library, &args.id)?;

    let working_directory = match args.directory {
        Some(ref dir) => Some(resolve_directory(dir)?),
        None => None,
    };
    let mode = if args.standard {
        Some(LaunchMode::Standard)
    } else if args.custom {
        Some(LaunchMode::Custom)
    } else {
        None
    };
    let skip_permissions = if args.dangerous {
        Some(true)
    } else if args.safe {
        Some(false)
    } else {
        None
    };

    let update = ProfileUpdate {
        name: args.name,
        working_directory,
        mode,
        proxy: args.proxy,
        model: args.model,
        base_url: args.base_url,
        token: args.token,
        skip_permissions,
    };
    let updated = library.update_profile(&profile.id, update)?;
    println!("updated \"{}\"", updated.name);
    Ok(())
}

fn cmd_set_pinned(
    library: &Library,
    id: &str,
    pinned: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(library, id)?;
    let updated = library.set_pinned(&profile.id, pinned)?;
    let verb = if pinned { "pinned" } else { "unpinned" };
    println!("{} \"{}\"", verb, updated.name);
    Ok(())
}

fn cmd_mv(library: Library, args: MvArgs) -> Result<(), Box<dyn std::error::Error>> {
    let origin = resolve_profile(&library, &args.id)?;
    let target = resolve_profile(&library, &args.target)?;

    let mut dock = Dock::open(library)?;
    if !dock.drag_start(&origin.id) {
        return Err(format!("no profile matches '{}'", args.id).into());
    }
    match dock.drag_end(&origin.id, Some(&target.id))? {
        MoveDisposition::Saved => {
            let position = display_position(&dock.current_order(), &origin.id);
            println!("moved \"{}\" → position {}", origin.name, position);
            Ok(())
        }
        MoveDisposition::Cancelled(reason) => {
            Err(format!("move cancelled: {}", reason).into())
        }
        MoveDisposition::Reverted => {
            Err("order save failed; canonical order restored".into())
        }
    }
}

fn cmd_rm(library: &Library, args: RmArgs) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(library, &args.id)?;
    let removed = library.remove_profile(&profile.id)?;
    println!("removed \"{}\"", removed.name);
    Ok(())
}

fn cmd_launch(library: &Library, args: LaunchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let profile = resolve_profile(library, &args.id)?;
    let agent = match args.agent {
        Some(agent) => agent,
        None => library_settings(library).agent,
    };

    library.touch_launched(&profile.id)?;
    let status = launch::launch(&profile, &agent)?;
    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
