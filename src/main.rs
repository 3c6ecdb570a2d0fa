use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use provider_store::config::{
	PROVIDER_DIR_NAME, SearchPaths, Settings, app_config_dir, load_settings, settings_path,
	system_provider_candidates,
};
use provider_store::interceptor::compile_pattern;
use provider_store::profile::BrowserProfile;
use provider_store::provider::directive::{parse_bool, simplify};
use provider_store::provider::{
	Color, Icon, InjectionPoint, InterceptorLink, ProviderId, ProviderRecord, Script,
};
use provider_store::{ParseOutcome, ProviderContext};

/// Window title used when no provider is selected.
const APP_TITLE: &str = "Stream Viewer";

#[derive(Parser)]
#[command(name = "provider-store")]
#[command(
	author,
	version,
	about = "Inspect and edit stream viewer provider definitions"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	/// Configuration root holding settings.toml and the writable providers directory
	#[arg(long, value_name = "DIR", global = true)]
	config_dir: Option<PathBuf>,

	/// Read-only provider directory, lowest priority first (replaces the platform defaults)
	#[arg(long = "system-dir", value_name = "DIR", global = true)]
	system_dirs: Vec<PathBuf>,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, action = ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// List the provider search directories, lowest priority first
	Paths,
	/// List all providers
	List,
	/// Show every field of one provider
	Show { id: String },
	/// Parse every definition file and report its status
	Validate,
	/// Print where a request to URL would be redirected by a provider
	Intercept { id: String, url: String },
	/// Print the browser profile for a provider (or the configured startup provider)
	Launch { id: Option<String> },
	/// Create a new provider definition
	New {
		#[arg(long)]
		name: String,
		#[arg(long)]
		url: String,
		/// Identifier and file name; a random one is generated when omitted
		#[arg(long)]
		id: Option<String>,
	},
	/// Change one field of a provider
	Set {
		id: String,
		field: Field,
		value: String,
	},
	/// Append a URL interceptor rule
	AddInterceptor {
		id: String,
		pattern: String,
		target: String,
	},
	/// Append a user script
	AddScript {
		id: String,
		file: String,
		/// Injection point: auto, defer, ready or create
		#[arg(long, default_value = "auto")]
		mode: String,
	},
	/// Remove a user script by file name
	RemoveScript { id: String, file: String },
	/// Give a provider a new identifier
	Rename { id: String, new_id: String },
	/// Delete a user provider definition
	Remove { id: String },
}

/// Single-valued provider fields editable with `set`.
#[derive(Clone, Copy, ValueEnum)]
enum Field {
	Name,
	Icon,
	Url,
	UrlInterceptor,
	UserAgent,
	Titlebar,
	TitlebarText,
	TitlebarColor,
	TitlebarTextColor,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	let config_root = match cli.config_dir {
		Some(ref dir) => dir.clone(),
		None => app_config_dir().context("Failed to locate the configuration directory")?,
	};
	let settings = load_settings(&settings_path(&config_root)).context("Failed to load settings")?;
	init_logging(cli.verbose, &settings);

	let system_dirs = if cli.system_dirs.is_empty() {
		system_provider_candidates()
	} else {
		cli.system_dirs.clone()
	};
	let paths = SearchPaths::new(config_root.join(PROVIDER_DIR_NAME), &system_dirs)
		.context("Failed to prepare provider directories")?;
	let mut context = ProviderContext::new(paths);
	let report = context.discover();

	match cli.command {
		Commands::Paths => handle_paths(&context),
		Commands::List => handle_list(&context),
		Commands::Show { id } => handle_show(&context, &id),
		Commands::Validate => handle_validate(&report),
		Commands::Intercept { id, url } => handle_intercept(&context, &id, &url),
		Commands::Launch { id } => handle_launch(&context, &settings, id.as_deref()),
		Commands::New { name, url, id } => handle_new(&mut context, &name, &url, id.as_deref()),
		Commands::Set { id, field, value } => handle_set(&mut context, &id, field, &value),
		Commands::AddInterceptor { id, pattern, target } => {
			handle_add_interceptor(&mut context, &id, &pattern, &target)
		}
		Commands::AddScript { id, file, mode } => handle_add_script(&mut context, &id, &file, &mode),
		Commands::RemoveScript { id, file } => handle_remove_script(&mut context, &id, &file),
		Commands::Rename { id, new_id } => handle_rename(&mut context, &id, &new_id),
		Commands::Remove { id } => handle_remove(&mut context, &id),
	}
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `-v`, which wins over the settings file.
fn init_logging(verbose: u8, settings: &Settings) {
	use tracing_subscriber::{EnvFilter, fmt, prelude::*};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = match verbose {
			0 => settings.log_level.as_deref().unwrap_or("warn"),
			1 => "info",
			2 => "debug",
			_ => "trace",
		};
		EnvFilter::new(level)
	});

	tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(filter)
		.init();
}

fn parse_id(id: &str) -> Result<ProviderId> {
	id.parse::<ProviderId>()
		.with_context(|| format!("Invalid provider id: {id}"))
}

fn lookup<'a>(context: &'a ProviderContext, id: &ProviderId) -> Result<&'a ProviderRecord> {
	context
		.get(id)
		.ok_or_else(|| anyhow::anyhow!("Provider not found: {id}"))
}

fn handle_paths(context: &ProviderContext) -> Result<ExitCode> {
	println!("Provider search directories (lowest priority first):\n");
	for dir in context.paths().system_dirs() {
		println!("  {}", dir.display());
	}
	println!("  {} (writable)", context.paths().user_dir().display());
	Ok(ExitCode::SUCCESS)
}

fn handle_list(context: &ProviderContext) -> Result<ExitCode> {
	if context.catalog().is_empty() {
		println!("No providers found.");
		return Ok(ExitCode::SUCCESS);
	}

	for provider in context.catalog() {
		let marker = if provider.is_system_provided {
			" [system]"
		} else {
			""
		};
		println!("{}\t{}{}", provider.id, provider.display_name, marker);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_show(context: &ProviderContext, id: &str) -> Result<ExitCode> {
	let provider = lookup(context, &parse_id(id)?)?;
	let title_bar = &provider.title_bar;

	println!("id: {}", provider.id);
	println!("name: {}", provider.display_name);
	println!(
		"source: {}{}",
		provider.definition_path().display(),
		if provider.is_system_provided {
			" (system)"
		} else {
			""
		}
	);
	println!("url: {}", provider.url);
	if !provider.icon.raw.is_empty() {
		match provider.icon.resolved {
			Some(ref path) => println!("icon: {}", path.display()),
			None => println!("icon: {} (not found)", provider.icon.raw),
		}
	}
	if !provider.user_agent.is_empty() {
		println!("user-agent: {}", provider.user_agent);
	}
	println!("titlebar: {}", title_bar.visible);
	if let Some(ref title) = title_bar.permanent_title {
		println!("titlebar-text: {}", title);
	}
	println!("titlebar-color: {}", title_bar.background);
	println!("titlebar-text-color: {}", title_bar.text);
	println!("urlInterceptor: {}", provider.url_interceptor_enabled);
	for link in &provider.interceptor_links {
		println!("  {} -> {}", link.pattern, link.target);
	}
	for script in &provider.scripts {
		println!("script: {} ({})", script.filename, script.injection_point);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(report: &[(PathBuf, provider_store::Result<ParseOutcome>)]) -> Result<ExitCode> {
	if report.is_empty() {
		println!("No provider definitions found.");
		return Ok(ExitCode::SUCCESS);
	}

	let mut failed = 0;
	for (path, outcome) in report {
		match outcome {
			Ok(ParseOutcome::Added(_)) => println!("{:<15} {}", "OK", path.display()),
			Ok(ParseOutcome::AlreadyInList) => {
				println!("{:<15} {}", "ALREADY_IN_LIST", path.display())
			}
			Err(e) => {
				failed += 1;
				println!("{:<15} {}: {}", e.status().as_str(), path.display(), e);
			}
		}
	}

	if failed > 0 {
		eprintln!("{failed} of {} provider definitions failed", report.len());
		return Ok(ExitCode::FAILURE);
	}
	println!("\nAll {} provider definitions are valid.", report.len());
	Ok(ExitCode::SUCCESS)
}

fn handle_intercept(context: &ProviderContext, id: &str, url: &str) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let profile = context
		.load_profile(&id)
		.with_context(|| format!("Failed to load provider {id}"))?;

	match profile.interceptor.intercept(url) {
		Some(target) => println!("{target}"),
		None => println!("no match"),
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_launch(context: &ProviderContext, settings: &Settings, id: Option<&str>) -> Result<ExitCode> {
	let profile = match id.or(settings.startup_provider.as_deref()) {
		Some(id) => {
			let id = parse_id(id)?;
			context
				.load_profile(&id)
				.with_context(|| format!("Failed to load provider {id}"))?
		}
		None => BrowserProfile::fallback(APP_TITLE),
	};

	print_profile(&profile, settings.fullscreen);
	Ok(ExitCode::SUCCESS)
}

fn print_profile(profile: &BrowserProfile, fullscreen: bool) {
	println!("profile: {}", profile.profile_id);
	println!("url: {}", profile.url);
	println!(
		"title: {}{}",
		profile.title,
		if profile.permanent_title {
			" (permanent)"
		} else {
			""
		}
	);
	println!("fullscreen: {fullscreen}");
	if profile.title_bar.visible {
		println!(
			"titlebar: {} on {}",
			profile.title_bar.text, profile.title_bar.background
		);
	}
	if let Some(ref icon) = profile.icon {
		println!("icon: {}", icon.display());
	}
	if let Some(ref agent) = profile.user_agent {
		println!("user-agent: {agent}");
	}
	for script in &profile.scripts {
		println!("script: {} ({})", script.path.display(), script.injection_point);
	}
	if profile.interceptor.is_enabled() {
		println!("interceptor rules: {}", profile.interceptor.links().len());
	} else {
		println!("interceptor: disabled");
	}
}

fn handle_new(
	context: &mut ProviderContext,
	name: &str,
	url: &str,
	id: Option<&str>,
) -> Result<ExitCode> {
	let mut record = context.new_provider(&simplify(name), &simplify(url));
	if let Some(id) = id {
		record.id = parse_id(id)?;
	}
	let id = record.id.clone();

	context
		.create(record)
		.with_context(|| format!("Failed to save provider {id}"))?;
	println!("Created provider {id}");
	Ok(ExitCode::SUCCESS)
}

fn handle_set(context: &mut ProviderContext, id: &str, field: Field, value: &str) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let mut record = lookup(context, &id)?.clone();
	apply_field(&mut record, field, value)?;

	context
		.save(&id, record)
		.with_context(|| format!("Failed to save provider {id}"))?;
	println!("Updated provider {id}");
	Ok(ExitCode::SUCCESS)
}

fn apply_field(record: &mut ProviderRecord, field: Field, value: &str) -> Result<()> {
	// store what a reload of the written line yields
	let value = simplify(value);
	match field {
		Field::Name => record.display_name = value,
		Field::Icon => record.icon = Icon::resolve(&value, &record.source_dir),
		Field::Url => record.url = value,
		Field::UrlInterceptor => record.url_interceptor_enabled = parse_bool(&value),
		Field::UserAgent => record.user_agent = value,
		Field::Titlebar => record.title_bar.visible = parse_bool(&value),
		Field::TitlebarText => record.title_bar.permanent_title = (!value.is_empty()).then_some(value),
		Field::TitlebarColor => record.title_bar.background = parse_color(&value)?,
		Field::TitlebarTextColor => record.title_bar.text = parse_color(&value)?,
	}
	Ok(())
}

fn parse_color(value: &str) -> Result<Color> {
	value
		.parse()
		.with_context(|| format!("Invalid color: {value}"))
}

fn handle_add_interceptor(
	context: &mut ProviderContext,
	id: &str,
	pattern: &str,
	target: &str,
) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let link = InterceptorLink::new(simplify(pattern), simplify(target));
	compile_pattern(&link.pattern)
		.with_context(|| format!("Invalid interceptor pattern: {pattern}"))?;

	context
		.update(&id, |record| record.interceptor_links.push(link))
		.with_context(|| format!("Failed to save provider {id}"))?;
	println!("Added interceptor to {id}");
	Ok(ExitCode::SUCCESS)
}

fn handle_add_script(
	context: &mut ProviderContext,
	id: &str,
	file: &str,
	mode: &str,
) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let injection_point = InjectionPoint::from_alias(mode)
		.ok_or_else(|| anyhow::anyhow!("Unknown injection mode: {mode}"))?;

	let mut record = lookup(context, &id)?.clone();
	if !record.add_script(Script::new(file, injection_point)) {
		anyhow::bail!("Script {file} is already used by provider {id}");
	}

	context
		.save(&id, record)
		.with_context(|| format!("Failed to save provider {id}"))?;
	println!("Added script {file} to {id}");
	Ok(ExitCode::SUCCESS)
}

fn handle_remove_script(context: &mut ProviderContext, id: &str, file: &str) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let mut record = lookup(context, &id)?.clone();
	let before = record.scripts.len();
	record.scripts.retain(|script| script.filename != file);
	if record.scripts.len() == before {
		anyhow::bail!("Provider {id} has no script {file}");
	}

	context
		.save(&id, record)
		.with_context(|| format!("Failed to save provider {id}"))?;
	println!("Removed script {file} from {id}");
	Ok(ExitCode::SUCCESS)
}

fn handle_rename(context: &mut ProviderContext, id: &str, new_id: &str) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let new_id = parse_id(new_id)?;

	context
		.rename(&id, new_id.clone())
		.with_context(|| format!("Failed to rename provider {id} to {new_id}"))?;
	println!("Renamed provider {id} to {new_id}");
	Ok(ExitCode::SUCCESS)
}

fn handle_remove(context: &mut ProviderContext, id: &str) -> Result<ExitCode> {
	let id = parse_id(id)?;
	let removed = context
		.remove(&id)
		.with_context(|| format!("Failed to remove provider {id}"))?;

	println!("Removed provider {id} ({})", removed.definition_path().display());
	if let Some(restored) = context.get(&id) {
		println!(
			"System provider {id} is active again ({})",
			restored.source_dir.display()
		);
	}
	Ok(ExitCode::SUCCESS)
}
