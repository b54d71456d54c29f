//! Terminal front ends — the interactive wizard, the admin configuration
//! editor, and the read-only reporting view.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use crate::admin::{ConfigEditor, ConfigPage};
use crate::api::{HttpApi, RemoteApi};
use crate::config::AppConfig;
use crate::error::{ConfigError, Error};
use crate::onboarding::{FormState, Orchestrator, WizardStep};
use crate::registry::{self, ComponentId, InputKind};
use crate::store::{FallbackStore, JsonFileStore};

type InputLines = Lines<BufReader<Stdin>>;

fn input_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print a prompt and read one trimmed line. `None` on EOF.
async fn read_line(lines: &mut InputLines, prompt: &str) -> std::io::Result<Option<String>> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

fn step_title(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Step1 => "Create Your Account",
        WizardStep::Step2 => "Additional Information",
        WizardStep::Step3 => "Complete Your Profile",
        WizardStep::Complete => "All Done",
    }
}

/// Run the interactive onboarding wizard.
pub async fn run_wizard(config: &AppConfig) -> anyhow::Result<()> {
    let api: Arc<dyn RemoteApi> = Arc::new(HttpApi::new(&config.api_base_url));
    let fallback: Arc<dyn FallbackStore> = Arc::new(JsonFileStore::new(&config.fallback_path));
    let mut flow = Orchestrator::start(api, fallback).await;
    let mut lines = input_lines();

    println!("User Onboarding");
    loop {
        let step = flow.step();
        if step.is_terminal() {
            println!("\n🎉 You're all set!");
            if let Some(user) = flow.user() {
                println!("   Account: {}", user.email);
                if let Some(ref about_me) = user.about_me {
                    println!("   About: {about_me}");
                }
            }
            match read_line(&mut lines, "Start over? [y/N] ").await? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => {
                    flow.reset();
                    continue;
                }
                _ => break,
            }
        }

        println!("\n{} — step {} of 3", step_title(step), step.number());
        if step.is_profile_step() {
            println!("(type /back to return to the previous step)");
        }

        let active = flow.active_components();
        let mut form = match flow.user() {
            Some(user) => FormState::prefill(user),
            None => FormState::new(),
        };

        let mut went_back = false;
        'fields: for component in &active {
            if registry::owned_fields(*component).len() > 1 {
                println!("{}:", component.label());
            }
            for field in registry::owned_fields(*component) {
                let current = form.get(*field).to_string();
                let prompt = if current.is_empty() {
                    match field.placeholder() {
                        Some(hint) => format!("{} ({hint}): ", field.label()),
                        None => format!("{}: ", field.label()),
                    }
                } else if field.kind() == InputKind::Secret {
                    // Never echo a previously entered credential
                    format!("{} [hidden]: ", field.label())
                } else {
                    // Enter keeps the previously entered value
                    format!("{} [{current}]: ", field.label())
                };
                match read_line(&mut lines, &prompt).await? {
                    None => return Ok(()),
                    Some(input) if input == "/back" && step.is_profile_step() => {
                        flow.previous()?;
                        went_back = true;
                        break 'fields;
                    }
                    Some(input) if !input.is_empty() => form.set(*field, input),
                    Some(_) => {}
                }
            }
        }
        if went_back {
            continue;
        }

        match form.submit(step.number(), &active) {
            Err(errors) => {
                println!("Please fix the following:");
                for (field, message) in errors.iter() {
                    println!("  - {}: {message}", field.label());
                }
            }
            Ok(payload) => {
                if step == WizardStep::Step1 {
                    let credentials = payload
                        .credentials()
                        .expect("step 1 payload carries credentials");
                    flow.submit_step1(credentials).await?;
                } else {
                    flow.submit_step(payload.profile_update()).await?;
                }
            }
        }
    }
    Ok(())
}

/// Run the admin configuration editor.
pub async fn run_admin(config: &AppConfig) -> anyhow::Result<()> {
    let api = HttpApi::new(&config.api_base_url);
    let mut editor = match ConfigEditor::load(&api).await {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Ok(());
        }
    };
    let mut lines = input_lines();

    println!("Admin Panel — configure which components appear on each page.");
    println!("Commands: <page> <component> to toggle, save, quit.");
    println!(
        "Components: {}",
        ComponentId::toggleable()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    loop {
        let current = editor.configuration();
        println!("\nPage 2: {}", current.page2_components.join(", "));
        println!("Page 3: {}", current.page3_components.join(", "));

        let line = match read_line(&mut lines, "> ").await? {
            Some(line) if !line.is_empty() => line,
            Some(_) => continue,
            None => break,
        };

        match line.as_str() {
            "quit" | "q" => break,
            "save" => match editor.save(&api).await {
                Ok(()) => println!("Configuration saved successfully!"),
                Err(Error::Config(ConfigError::EmptyPage { page })) => {
                    println!("Page {page} must have at least one component");
                }
                Err(e) => {
                    warn!(error = %e, "Configuration save failed");
                    println!("Failed to save configuration");
                }
            },
            other => {
                let mut parts = other.split_whitespace();
                let page = parts
                    .next()
                    .and_then(|p| p.parse::<u8>().ok())
                    .and_then(ConfigPage::from_number);
                let component = parts.next().and_then(ComponentId::parse).filter(|c| {
                    ComponentId::toggleable().contains(c)
                });
                match (page, component) {
                    (Some(page), Some(component)) => editor.toggle(page, component),
                    _ => println!("Usage: <2|3> <about_me|address|birthdate>, save, quit"),
                }
            }
        }
    }
    Ok(())
}

fn step_text(step: u8) -> String {
    match step {
        1 => "Account Creation".to_string(),
        2 => "Additional Information".to_string(),
        3 => "Profile Completion".to_string(),
        n => format!("Step {n}"),
    }
}

/// Print the user data table, falling back to the local record set when the
/// API is unreachable.
pub async fn run_report(config: &AppConfig) -> anyhow::Result<()> {
    let api = HttpApi::new(&config.api_base_url);
    let users = match api.list_users().await {
        Ok(users) => users,
        Err(e) => {
            warn!(error = %e, "Backend not available, loading local records");
            println!("Backend not available - showing local data");
            JsonFileStore::new(&config.fallback_path).list().await?
        }
    };

    if users.is_empty() {
        println!("No user data available. Start the onboarding process to see data here.");
        return Ok(());
    }

    println!(
        "{:<28} {:<24} {:<20} {:<12} {:<10}",
        "Email", "Current Step", "City", "ZIP", "Birthdate"
    );
    for user in &users {
        println!(
            "{:<28} {:<24} {:<20} {:<12} {:<10}",
            user.email,
            step_text(user.current_step),
            user.city.as_deref().unwrap_or("N/A"),
            user.zip.as_deref().unwrap_or("N/A"),
            user.birthdate
                .map(|d| d.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );
    }

    println!("\nTotal users: {}", users.len());
    for step in 1..=3u8 {
        let count = users.iter().filter(|u| u.current_step == step).count();
        println!("  {}: {count}", step_text(step));
    }
    let completed = users.iter().filter(|u| u.is_complete()).count();
    println!("  Completed: {completed}");
    Ok(())
}
