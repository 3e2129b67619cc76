use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use viam_chatgpt::config::{ComponentConfig, RobotConfig, load_robot_config};
use viam_chatgpt::resource::{Api, Dependencies, Registry, ResourceHandle, Sensor, ValueMap};
use viam_chatgpt::utils::ModuleError;
use viam_chatgpt::{chat, default_registry};

/// Typing this at the chat prompt ends the session
const QUIT_WORD: &str = "Quit";

const RULE: &str = "-------------------------------------------------------------";

#[derive(Parser)]
#[command(name = "viam-chatgpt")]
#[command(about = "viam-chatgpt - run Viam ChatGPT and wifi components locally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a robot config file (defaults to ~/.viam-chatgpt/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// List the models this module registers
    Models,

    /// Validate every component in the config file
    Validate,

    /// Chat interactively with a generic component
    Chat {
        /// Component name (defaults to the first generic component)
        #[arg(long)]
        component: Option<String>,
    },

    /// Send one JSON command to a component and print the reply
    Command {
        /// Component name
        #[arg(long)]
        component: String,

        /// Command as a JSON object, e.g. '{"request": "hello"}'
        payload: String,
    },

    /// Print the readings of a sensor component
    Readings {
        /// Component name (defaults to the first sensor component)
        #[arg(long)]
        component: Option<String>,
    },
}

/// Runs the parsed command and returns the process exit code
pub fn run(cli: Cli) -> i32 {
    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            let module_error = e.downcast_ref::<ModuleError>();
            if let Some(m) = module_error {
                m.log("Command failed");
            }
            eprintln!("Error: {:#}", e);
            if let Some(hint) = module_error.and_then(|m| m.suggestion()) {
                eprintln!("Suggestion: {}", hint);
            }
            1
        }
    }
}

fn dispatch(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Version => {
            print_version();
            Ok(0)
        }
        Commands::Models => {
            let registry = default_registry()?;
            print_models(&registry);
            Ok(0)
        }
        Commands::Validate => {
            let config = load_robot_config(cli.config)?;
            let registry = default_registry()?;
            Ok(validate_all(&registry, &config))
        }
        Commands::Chat { component } => {
            let config = load_robot_config(cli.config)?;
            let component = pick_component(&config, component.as_deref(), &Api::generic())?;
            run_chat(component)?;
            Ok(0)
        }
        Commands::Command { component, payload } => {
            let config = load_robot_config(cli.config)?;
            let component = pick_component(&config, Some(component.as_str()), &Api::generic())?;
            let command = parse_payload(&payload)?;
            run_command(component, command)?;
            Ok(0)
        }
        Commands::Readings { component } => {
            let config = load_robot_config(cli.config)?;
            let component = pick_component(&config, component.as_deref(), &Api::sensor())?;
            run_readings(component)?;
            Ok(0)
        }
    }
}

fn print_version() {
    println!("viam-chatgpt {}", env!("CARGO_PKG_VERSION"));
}

fn print_models(registry: &Registry) {
    for (api, model) in registry.models() {
        println!("{}  {}", model, api);
    }
}

fn validate_all(registry: &Registry, config: &RobotConfig) -> i32 {
    if config.components.is_empty() {
        println!("No components configured");
        return 0;
    }

    let mut failures = 0;
    for component in &config.components {
        match registry.validate(component) {
            Ok(_) => println!("ok    {} ({})", component.name, component.model),
            Err(e) => {
                failures += 1;
                println!("FAIL  {} ({}): {}", component.name, component.model, e);
            }
        }
    }

    if failures > 0 { 1 } else { 0 }
}

fn pick_component<'a>(
    config: &'a RobotConfig,
    name: Option<&str>,
    api: &Api,
) -> Result<&'a ComponentConfig> {
    match name {
        Some(name) => config
            .component(name)
            .ok_or_else(|| anyhow!("No component named '{}' in config", name)),
        None => config
            .components
            .iter()
            .find(|c| &c.api() == api)
            .ok_or_else(|| anyhow!("No {} component in config", api)),
    }
}

fn parse_payload(payload: &str) -> Result<ValueMap> {
    let value: serde_json::Value =
        serde_json::from_str(payload).context("Command must be valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("Command must be a JSON object"),
    }
}

fn create(rt: &Runtime, component: &ComponentConfig) -> Result<ResourceHandle> {
    let registry = default_registry()?;
    let handle = rt.block_on(registry.create(component, &Dependencies::new()))?;
    Ok(handle)
}

/// Key the interactive loop sends prompts under
fn request_key(component: &ComponentConfig) -> String {
    if component.model == chat::echo::model() {
        return chat::echo::INPUT_KEY.to_string();
    }
    component
        .attributes
        .get_string("request_key")
        .ok()
        .flatten()
        .unwrap_or(chat::chatgpt::DEFAULT_REQUEST_KEY)
        .to_string()
}

fn run_chat(component: &ComponentConfig) -> Result<()> {
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let handle = create(&rt, component)?;
    let key = request_key(component);

    let mut i = 0;
    loop {
        let prompt = format!("Enter new do command to run ({}):", i);
        let input = match inquire::Text::new(&prompt).prompt() {
            Ok(input) => input,
            Err(
                inquire::InquireError::OperationCanceled
                | inquire::InquireError::OperationInterrupted,
            ) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        if input == QUIT_WORD {
            break;
        }

        let mut command = ValueMap::new();
        command.insert(key.clone(), serde_json::Value::String(input));

        match rt.block_on(handle.do_command(command)) {
            Ok(resp) => print_reply(&resp),
            Err(e) if e.is_recoverable() => {
                e.log("Request failed");
                eprintln!("Error: {}", e);
            }
            Err(e) => {
                e.log("Request failed");
                return Err(e.into());
            }
        }
        i += 1;
    }

    rt.block_on(handle.close())?;
    Ok(())
}

fn print_reply(resp: &ValueMap) {
    let field = |key: &str| match resp.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    println!("{}", RULE);
    println!("RESPONSE : {}", field(chat::chatgpt::RESPONSE_KEY));
    if resp.contains_key(chat::chatgpt::TIMESTAMP_KEY) {
        println!("TIMESTAMP {}", field(chat::chatgpt::TIMESTAMP_KEY));
    }
    println!("{}", RULE);
}

fn run_command(component: &ComponentConfig, command: ValueMap) -> Result<()> {
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let handle = create(&rt, component)?;

    let resp = rt.block_on(handle.do_command(command))?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}

fn run_readings(component: &ComponentConfig) -> Result<()> {
    let rt = Runtime::new().context("Failed to start async runtime")?;
    let ResourceHandle::Sensor(sensor) = create(&rt, component)? else {
        bail!("Component '{}' is not a sensor", component.name);
    };

    let readings = rt.block_on(sensor.get_readings(None))?;
    println!("{}", serde_json::to_string_pretty(&readings)?);
    Ok(())
}
