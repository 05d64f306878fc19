use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use std::path::PathBuf;
use tagwm::spawn::ProcessSpawner;
use tagwm::window_manager::WindowManager;
use tagwm::x11::X11Backend;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut custom_config_path: Option<PathBuf> = None;

    match args.get(1).map(|s| s.as_str()) {
        Some("--version") => {
            println!("tagwm {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") => {
            print_help();
            return Ok(());
        }
        Some("--init") => {
            init_config()?;
            return Ok(());
        }
        Some("--config") => match args.get(2) {
            Some(path) => custom_config_path = Some(PathBuf::from(path)),
            None => bail!("--config requires a path argument"),
        },
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            print_help();
            std::process::exit(1);
        }
        None => {}
    }

    let config = load_config(custom_config_path)?;

    let backend = X11Backend::connect(&config).context("Failed to set up the X11 connection")?;
    let mut wm = WindowManager::new(backend, ProcessSpawner::new(), config)?;
    let should_restart = wm.run()?;

    drop(wm);

    if should_restart {
        use std::os::unix::process::CommandExt;
        info!("restarting {}", args[0]);
        let err = std::process::Command::new(&args[0]).args(&args[1..]).exec();
        error!("failed to restart: {}", err);
    }

    Ok(())
}

fn load_config(custom_path: Option<PathBuf>) -> Result<tagwm::Config> {
    let config_path = match custom_path {
        Some(path) => path,
        None => {
            let path = get_config_path()?.join("config.ron");
            if !path.exists() {
                warn!("no config at {:?}, using built-in defaults", path);
                return Ok(tagwm::Config::default());
            }
            path
        }
    };

    let config_str = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {:?}", config_path))?;

    tagwm::config::parse_config(&config_str)
        .with_context(|| format!("Failed to parse RON config {:?}", config_path))
}

fn init_config() -> Result<()> {
    let config_dir = get_config_path()?;
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {:?}", config_dir))?;

    let config_path = config_dir.join("config.ron");
    std::fs::write(&config_path, tagwm::config::TEMPLATE)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!("✓ Config created at {:?}", config_path);
    println!("  Edit the file and reload with Mod+Shift+R");

    Ok(())
}

fn get_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("tagwm"))
        .context("Could not find config directory")
}

fn print_help() {
    println!("tagwm - a tag based tiling window manager for X11\n");
    println!("USAGE:");
    println!("    tagwm [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --init              Create default config in ~/.config/tagwm/config.ron");
    println!("    --config <PATH>     Use custom config file");
    println!("    --version           Print version information");
    println!("    --help              Print this help message\n");
    println!("CONFIG:");
    println!("    Location: ~/.config/tagwm/config.ron");
    println!("    Without a config file the built-in defaults are used.");
    println!("    Lines like `#DEFINE $term = \"st\"` declare variables for the rest of the file.\n");
    println!("LOGGING:");
    println!("    Set RUST_LOG (e.g. RUST_LOG=debug) to change verbosity.\n");
}
