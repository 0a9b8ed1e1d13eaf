//! Build script for blockbus-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates block.toml and turns it into constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Extension slots and addresses per slot the core can hold
const MAX_EXTENSIONS: usize = 8;
const MAX_EXTENSION_ADDRESSES: usize = 8;

/// Known block classes and their type ids
const BLOCK_TYPES: &[(&str, u8)] = &[
    ("power", 0x08),
    ("rgb", 0x09),
    ("motor", 0x0A),
    ("display", 0x0B),
    ("sound", 0x0C),
    ("button", 0x0D),
    ("position", 0x0E),
    ("ambient", 0x0F),
];

/// Validated contents of block.toml
struct Block {
    type_id: u8,
    pcb_version: u8,
    adjustment_version: u8,
    extensions: &'static str,
    power_rail: bool,
    rail_inverted: bool,
    auto_deep_sleep: bool,
    extension_lists: Vec<Vec<u8>>,
}

fn main() {
    setup_linker();
    let block = validate_config();
    generate_constants(&block);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate block.toml at compile time
fn validate_config() -> Block {
    println!("cargo:rerun-if-changed=block.toml");

    let config_path = Path::new("block.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: block.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a block.toml description file.            ║\n\
            ║  Please create one in the blockbus-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read block.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in block.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let block = parse_block(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid block description in block.toml                  ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=block.toml validated successfully");
    block
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_block(config: &toml::Value, errors: &mut Vec<String>) -> Block {
    let block = config.get("block");
    let capabilities = config.get("capabilities");

    if block.is_none() {
        errors.push("Missing [block] section".to_string());
    }
    if capabilities.is_none() {
        errors.push("Missing [capabilities] section".to_string());
    }

    let type_id = match block.and_then(|b| b.get("type")) {
        Some(toml::Value::String(name)) => match BLOCK_TYPES.iter().find(|(n, _)| n == name) {
            Some((_, id)) => *id,
            None => {
                errors.push(format!("block.type: unknown block class '{}'", name));
                0
            }
        },
        Some(toml::Value::Integer(id)) if (1..=0x7F).contains(id) => *id as u8,
        Some(_) => {
            errors.push("block.type: must be a class name or a type id 1..=0x7F".to_string());
            0
        }
        None => {
            errors.push("block.type: missing".to_string());
            0
        }
    };

    let pcb_version = get_u8(block, "block.pcb_version", "pcb_version", errors);
    let adjustment_version = get_u8(block, "block.adjustment_version", "adjustment_version", errors);

    let extensions = match capabilities
        .and_then(|c| c.get("extensions"))
        .and_then(|v| v.as_str())
    {
        Some("none") | None => "None",
        Some("single") => "Single",
        Some("multiple") => "Multiple",
        Some(other) => {
            errors.push(format!(
                "capabilities.extensions: '{}' is not none, single or multiple",
                other
            ));
            "None"
        }
    };

    let power_rail = get_bool(capabilities, "power_rail", true);
    let rail_inverted = get_bool(capabilities, "rail_inverted", false);
    let auto_deep_sleep = get_bool(capabilities, "auto_deep_sleep", true);

    let extension_lists = parse_extensions(config, errors);

    match (extensions, extension_lists.len()) {
        ("None", 0) => {}
        ("None", _) => errors.push("[[extension]] given but extensions = \"none\"".to_string()),
        ("Single", 1) => {}
        ("Single", _) => errors.push("extensions = \"single\" needs exactly one [[extension]]".to_string()),
        (_, 0) => errors.push("extensions = \"multiple\" needs at least one [[extension]]".to_string()),
        _ => {}
    }

    Block {
        type_id,
        pcb_version,
        adjustment_version,
        extensions,
        power_rail,
        rail_inverted,
        auto_deep_sleep,
        extension_lists,
    }
}

fn parse_extensions(config: &toml::Value, errors: &mut Vec<String>) -> Vec<Vec<u8>> {
    let Some(tables) = config.get("extension").and_then(|e| e.as_array()) else {
        return Vec::new();
    };

    if tables.len() > MAX_EXTENSIONS {
        errors.push(format!("at most {} [[extension]] tables", MAX_EXTENSIONS));
    }

    let mut lists = Vec::new();
    for (i, table) in tables.iter().enumerate() {
        let Some(addresses) = table.get("addresses").and_then(|a| a.as_array()) else {
            errors.push(format!("extension {}: missing addresses", i));
            continue;
        };

        if addresses.is_empty() || addresses.len() > MAX_EXTENSION_ADDRESSES {
            errors.push(format!(
                "extension {}: 1 to {} addresses required",
                i, MAX_EXTENSION_ADDRESSES
            ));
        }

        let mut list = Vec::new();
        for address in addresses {
            match address.as_integer() {
                // 0 terminates an address list on the wire
                Some(a) if (1..=0x7F).contains(&a) => list.push(a as u8),
                _ => errors.push(format!("extension {}: addresses must be 1..=0x7F", i)),
            }
        }
        lists.push(list);
    }
    lists
}

fn get_u8(section: Option<&toml::Value>, name: &str, key: &str, errors: &mut Vec<String>) -> u8 {
    match section.and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) if (0..=255).contains(v) => *v as u8,
        Some(_) => {
            errors.push(format!("{}: must be 0..=255", name));
            0
        }
        None => 0,
    }
}

fn get_bool(section: Option<&toml::Value>, key: &str, default: bool) -> bool {
    section
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

/// Write block.rs into OUT_DIR for `include!`
fn generate_constants(block: &Block) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("block.rs")).unwrap();

    let lists = block
        .extension_lists
        .iter()
        .map(|list| {
            let bytes = list
                .iter()
                .map(|a| format!("{:#04x}", a))
                .collect::<Vec<_>>()
                .join(", ");
            format!("&[{}]", bytes)
        })
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(f, "pub const BLOCK_TYPE_ID: u8 = {:#04x};", block.type_id).unwrap();
    writeln!(f, "pub const PCB_VERSION: u8 = {};", block.pcb_version).unwrap();
    writeln!(f, "pub const ADJUSTMENT_VERSION: u8 = {};", block.adjustment_version).unwrap();
    writeln!(
        f,
        "pub const EXTENSION_SUPPORT: ExtensionSupport = ExtensionSupport::{};",
        block.extensions
    )
    .unwrap();
    writeln!(f, "pub const HAS_POWER_RAIL: bool = {};", block.power_rail).unwrap();
    writeln!(f, "pub const RAIL_INVERTED: bool = {};", block.rail_inverted).unwrap();
    writeln!(f, "pub const AUTO_DEEP_SLEEP: bool = {};", block.auto_deep_sleep).unwrap();
    writeln!(f, "pub const EXTENSIONS: &[&[u8]] = &[{}];", lists).unwrap();
}
