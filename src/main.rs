//! Command‑line interface for stlstage.
//!
//! Meant to run as a build step before Gradle's `merge*NativeLibs` tasks: it
//! copies the NDK's shared C++ runtime into `src/main/jniLibs/<abi>/` so the
//! packaged APK carries it next to the native libraries that need it.

use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use stlstage::arch::{self, ArchMap, Architecture};
use stlstage::log::{self, ConsoleReporter};
use stlstage::ndk::{self, NDK_HOME_VAR};
use stlstage::provision::{
    AbiOutcome, DEFAULT_ARTIFACT, DEFAULT_HOST_TAG, ProvisionConfig, Provisioner,
};
use stlstage::verify::{self, StagedStatus};

/// stlstage top‑level arguments.
#[derive(Parser)]
#[command(
    name = "stlstage",
    version,
    about = "Stage the NDK's shared C++ runtime into jniLibs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which toolchain, project and ABIs to operate on.
#[derive(Args)]
struct Selection {
    /// NDK root. Defaults to ANDROID_NDK_HOME, then the android.ndk.path property.
    #[arg(long)]
    ndk: Option<String>,
    /// Android module directory (containing src/main). Defaults to current directory.
    #[arg(long)]
    project: Option<PathBuf>,
    /// Target ABI (can be used multiple times). Defaults to arm64-v8a and x86_64.
    #[arg(long)]
    abi: Vec<String>,
    /// Extra ABI=ARCH mapping, e.g. x86=i686 (can be used multiple times).
    #[arg(long = "map", value_name = "ABI=ARCH")]
    maps: Vec<Architecture>,
    /// Prebuilt toolchain variant to read from.
    #[arg(long, default_value = DEFAULT_HOST_TAG)]
    host_tag: String,
    /// Runtime library file name.
    #[arg(long, default_value = DEFAULT_ARTIFACT)]
    artifact: String,
}

/// Subcommands supported by the CLI.
#[derive(Subcommand)]
enum Commands {
    /// Copy the runtime library into jniLibs for every target ABI.
    Provision {
        #[command(flatten)]
        selection: Selection,
        /// Print the per-ABI report as JSON.
        #[arg(long)]
        json: bool,
        /// Exit with an error if any ABI was skipped or failed.
        #[arg(long)]
        strict: bool,
        /// Only print warnings.
        #[arg(long, short = 'q')]
        quiet: bool,
    },
    /// Check that staged runtime libraries match the NDK.
    Verify {
        #[command(flatten)]
        selection: Selection,
        /// Print the per-ABI report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Inspect the NDK and report which runtime libraries it provides.
    Doctor {
        #[command(flatten)]
        selection: Selection,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Provision {
            selection,
            json,
            strict,
            quiet,
        } => handle_provision(selection, json, strict, quiet),
        Commands::Verify { selection, json } => handle_verify(selection, json),
        Commands::Doctor { selection } => handle_doctor(selection),
    }
}

/// Resolves the toolchain root and assembles the provisioning config.
///
/// This is the only place the environment is read.
fn build_config(
    selection: Selection,
) -> Result<(ProvisionConfig, ndk::ToolchainRoot), Box<dyn std::error::Error>> {
    let project_dir = match selection.project {
        Some(dir) => ndk::absolute_dir(&dir)?,
        None => env::current_dir()?,
    };
    let root = ndk::resolve_toolchain_root(
        selection.ndk.as_deref(),
        env::var(NDK_HOME_VAR).ok(),
        &project_dir,
    );

    let config = ProvisionConfig {
        toolchain_root: root.path.clone(),
        abis: arch::target_abis(&selection.abi)?,
        arch_map: ArchMap::with_overrides(selection.maps),
        host_tag: selection.host_tag,
        artifact: selection.artifact,
        project_dir,
    };
    Ok((config, root))
}

fn handle_provision(
    selection: Selection,
    json: bool,
    strict: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, root) = build_config(selection)?;
    // The JSON report owns stdout.
    let chatty = !quiet && !json;

    if config.is_disabled() {
        if chatty {
            log::info("No NDK root configured; skipping runtime provisioning.");
        }
    } else if chatty {
        log::step(&format!("NDK: {} (from {})", root.path, root.origin));
    }

    let mut reporter = ConsoleReporter {
        quiet,
        stderr: json,
    };
    let report = Provisioner::new(&config, &mut reporter).run();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if report.is_disabled() {
        return Ok(());
    }

    let copied = report.copied().count();
    if chatty {
        log::info(&format!(
            "Provisioned {} for {} of {} ABIs.",
            config.artifact,
            copied,
            report.outcomes.len()
        ));
    }

    let skipped: Vec<&str> = report.skipped().map(AbiOutcome::abi).collect();
    if strict && !skipped.is_empty() {
        log::error(&format!(
            "Runtime library not provisioned for: {}",
            skipped.join(", ")
        ));
        process::exit(1);
    }
    Ok(())
}

fn handle_verify(selection: Selection, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, _) = build_config(selection)?;
    let report = verify::verify(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.disabled {
        log::info("No NDK root configured; nothing to verify.");
    } else {
        for staged in &report.artifacts {
            let line = format!("{}: {}", staged.abi, staged.destination.display());
            match staged.status {
                StagedStatus::Match => log::success(&format!("  ✓ {line}")),
                StagedStatus::Stale => {
                    log::warning(&format!("  ⚠️  {line} differs from the NDK copy"))
                }
                StagedStatus::Missing => log::warning(&format!("  ⚠️  {line} is missing")),
                StagedStatus::NoSource => {
                    log::info(&format!("  - {}: no source in the NDK", staged.abi))
                }
                StagedStatus::Unmapped => {
                    log::info(&format!("  - {}: no architecture mapping", staged.abi))
                }
            }
        }
    }

    if !report.is_consistent() {
        log::error("Staged runtime libraries are out of date. Run `stlstage provision`.");
        process::exit(1);
    }
    Ok(())
}

/// Checks the NDK and prints a report.
fn handle_doctor(selection: Selection) -> Result<(), Box<dyn std::error::Error>> {
    log::header("\nstlstage doctor\n===============\n");
    let (config, root) = build_config(selection)?;

    println!("Checking NDK root...");
    if config.is_disabled() {
        println!(
            "  ⚠️  No NDK root configured. Set {} or pass --ndk.",
            NDK_HOME_VAR
        );
        match ndk::detect_android_ndk() {
            Some(found) => println!("  Found an NDK at {0}; try --ndk {0}", found.display()),
            None => println!("  No NDK found under the Android SDK either."),
        }
        return Ok(());
    }
    println!("  ✓ {} (from {})", root.path, root.origin);

    let ndk_root = Path::new(&config.toolchain_root);
    match ndk::ndk_revision(ndk_root) {
        Some(revision) => println!("  ✓ NDK revision {}", revision),
        None => println!("  ⚠️  No source.properties; is this an NDK?"),
    }

    println!("\nChecking prebuilt host tags...");
    let tags = ndk::host_tags(ndk_root);
    if tags.is_empty() {
        println!("  ⚠️  No prebuilt toolchains found.");
    }
    for tag in &tags {
        let marker = if *tag == config.host_tag { " (selected)" } else { "" };
        println!("  - {}{}", tag, marker);
    }
    if !tags.contains(&config.host_tag) {
        println!("  ⚠️  Selected host tag {} is not installed.", config.host_tag);
        if let Some(first) = tags.first() {
            println!("     Use --host-tag {}", first);
        }
    }

    println!("\nChecking {} per ABI...", config.artifact);
    for abi in &config.abis {
        match config.arch_map.resolve(abi) {
            Some(arch) => {
                let source = config.source_path(arch);
                if source.is_file() {
                    println!("  ✓ {}: {}", abi, source.display());
                } else {
                    println!("  ⚠️  {}: not found at {}", abi, source.display());
                }
            }
            None => println!(
                "  ⚠️  {}: no architecture mapping; add --map {}=<arch>",
                abi, abi
            ),
        }
    }

    let found = ndk::find_artifacts(ndk_root, &config.artifact);
    if !found.is_empty() {
        println!("\nAll copies of {} in this NDK:", config.artifact);
        for artifact in &found {
            println!("  - {} / {}", artifact.host_tag, artifact.triple);
        }
    }

    println!("\nDoctor check complete. Review the messages above.");
    Ok(())
}
