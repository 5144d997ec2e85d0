use clap::{Parser, ValueEnum};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use windevice::api::DeviceApi;
use windevice::{
    ClassDevsFlags, Device, DeviceClass, DeviceError, Driver, PropertyId, PropertyValue, Query,
    RemovalOutcome, RemovalScope, Selector, StringMatcher,
};

/// List Windows devices, optionally removing the one that matches.
#[derive(Debug, Parser)]
#[command(name = "devlist", version)]
struct Args {
    /// Setup class name, e.g. Net or USB
    #[arg(long)]
    class: Option<String>,

    /// Enumerator, e.g. PCI or USB
    #[arg(long = "enum")]
    enumerator: Option<String>,

    /// Hardware ID, compared case-insensitively
    #[arg(long)]
    id: Option<String>,

    /// Text contained in the description or friendly name
    #[arg(long)]
    name: Option<String>,

    /// Remote computer to query
    #[arg(long)]
    machine: Option<String>,

    /// Only list devices that are present
    #[arg(long)]
    present: bool,

    /// Print every property
    #[arg(long)]
    detail: bool,

    /// Print the installed driver
    #[arg(long)]
    drivers: bool,

    /// Print one JSON object per line
    #[arg(long)]
    json: bool,

    /// Remove the matching device. Refused unless exactly one device matches.
    #[arg(long)]
    remove: bool,

    /// Hardware profiles the removal applies to
    #[arg(long, value_enum, default_value = "global", requires = "remove")]
    scope: Scope,

    /// Hardware profile for a config-specific removal, 0 for the current one
    #[arg(long, default_value_t = 0, requires = "remove")]
    profile: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scope {
    Global,
    Config,
}

impl From<Scope> for RemovalScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Global => RemovalScope::Global,
            Scope::Config => RemovalScope::ConfigSpecific,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("refusing to remove: query matches {0} devices, expected exactly one")]
    Ambiguous(usize),
    #[error("refusing to remove: the matching device changed from {expected} to {found}")]
    Changed { expected: String, found: String },
    #[allow(dead_code)]
    #[error("devlist only runs on Windows")]
    Unsupported,
}

#[derive(Debug, Serialize)]
struct DeviceReport {
    instance_id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<&'static str, PropertyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    drivers: Vec<Driver>,
}

#[derive(Debug, Serialize)]
struct RemovalReport {
    instance_id: String,
    #[serde(flatten)]
    outcome: RemovalOutcome,
}

fn build_query(api: &dyn DeviceApi, args: &Args) -> Result<Query, CliError> {
    let mut query = Query::new();
    let mut selectors = vec![];

    if args.present {
        query = query.with_flags(ClassDevsFlags::PRESENT);
    }
    if let Some(enumerator) = &args.enumerator {
        query = query.with_enumerator(enumerator.as_str());
    }
    if let Some(machine) = &args.machine {
        query = query.with_machine(machine.as_str());
    }
    if let Some(name) = &args.class {
        let class = DeviceClass::from_name(api, name, args.machine.as_deref())?;
        match class.unique_guid() {
            Some(guid) => query = query.with_class(guid),
            None => {
                debug!("Class {} matched {} GUIDs, filtering by name", name, class.guids.len());
                selectors.push(Selector::class(StringMatcher::equal_fold(name)));
            }
        }
    }
    if let Some(id) = &args.id {
        selectors.push(Selector::id(StringMatcher::equal_fold(id)));
    }
    if let Some(name) = &args.name {
        selectors.push(Selector::any(vec![
            Selector::description(StringMatcher::contains(name.as_str())),
            Selector::friendly_name(StringMatcher::contains(name.as_str())),
        ]));
    }

    if !selectors.is_empty() {
        query = query.with_selector(Selector::all(selectors));
    }
    Ok(query)
}

fn report(device: Device<'_>, args: &Args) -> Result<DeviceReport, DeviceError> {
    let mut properties = BTreeMap::new();
    let wanted: &[PropertyId] = if args.detail {
        &PropertyId::ALL
    } else {
        &[PropertyId::Description]
    };

    for &property in wanted {
        match device.property(property) {
            Ok(value) => {
                properties.insert(property.label(), value);
            }
            Err(e) if e.is_absent() => {}
            Err(e) => return Err(e),
        }
    }

    let drivers = if args.drivers {
        device.installed_driver().collect()?
    } else {
        vec![]
    };

    Ok(DeviceReport {
        instance_id: device.instance_id()?,
        properties,
        drivers,
    })
}

fn print_report(report: &DeviceReport, args: &Args) -> Result<(), CliError> {
    if args.json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    if args.detail {
        println!("{}", report.instance_id);
        for (label, value) in &report.properties {
            println!("    {:<28} {}", label, value);
        }
    } else {
        let description = report
            .properties
            .get(PropertyId::Description.label())
            .map(|value| value.to_string())
            .unwrap_or_default();
        println!("{:<60} {}", report.instance_id, description);
    }

    for driver in &report.drivers {
        println!(
            "    driver: {} {} ({})",
            driver.description,
            driver.version_string(),
            driver.provider
        );
    }
    Ok(())
}

/// Removes the one device matched by `query`.
///
/// The first pass records the instance ID of the only match. The second pass
/// removes that device only if it is still the first match, so a device that
/// starts matching in between is never removed.
fn remove(api: &dyn DeviceApi, query: &Query, args: &Args) -> Result<RemovalReport, CliError> {
    let mut matched = vec![];
    query.each_with(api, |device| {
        matched.push(device.instance_id()?);
        Ok(())
    })?;
    let expected = match matched.as_slice() {
        [instance_id] => instance_id.clone(),
        _ => return Err(CliError::Ambiguous(matched.len())),
    };

    let mut seen = vec![];
    let mut removed = None;
    query.each_with(api, |device| {
        let instance_id = device.instance_id()?;
        if seen.is_empty() && instance_id == expected {
            let outcome = device.remove(args.scope.into(), args.profile)?;
            removed = Some(RemovalReport {
                instance_id: instance_id.clone(),
                outcome,
            });
        }
        seen.push(instance_id);
        Ok(())
    })?;

    match removed {
        Some(report) => {
            if seen.len() > 1 {
                warn!(
                    "{} more devices matched after {} was removed",
                    seen.len() - 1,
                    report.instance_id
                );
            }
            Ok(report)
        }
        None => match seen.as_slice() {
            [found] => Err(CliError::Changed {
                expected,
                found: found.clone(),
            }),
            _ => Err(CliError::Ambiguous(seen.len())),
        },
    }
}

fn print_removal(report: &RemovalReport, args: &Args) -> Result<(), CliError> {
    if args.json {
        println!("{}", serde_json::to_string(report)?);
    } else if report.outcome.need_reboot {
        println!("removed {}, reboot required", report.instance_id);
    } else {
        println!("removed {}", report.instance_id);
    }
    Ok(())
}

fn run(api: &dyn DeviceApi, args: &Args) -> Result<(), CliError> {
    let query = build_query(api, args)?;
    debug!("Running {:?}", query);

    if args.remove {
        let report = remove(api, &query, args)?;
        return print_removal(&report, args);
    }

    let mut reports = vec![];
    query.each_with(api, |device| {
        reports.push(report(device, args)?);
        Ok(())
    })?;

    for report in &reports {
        print_report(report, args)?;
    }
    Ok(())
}

#[cfg(windows)]
fn backend() -> Result<&'static dyn DeviceApi, CliError> {
    Ok(windevice::setupapi::SetupApi::load()? as &dyn DeviceApi)
}

#[cfg(not(windows))]
fn backend() -> Result<&'static dyn DeviceApi, CliError> {
    Err(CliError::Unsupported)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = backend().and_then(|api| run(api, &args)) {
        eprintln!("devlist: {}", e);
        std::process::exit(1);
    }
}
